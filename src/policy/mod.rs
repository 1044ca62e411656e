/// `ALTER TABLE` rule bundle, one check per alteration.
pub mod alter;
/// General column rules and the exact shape of the three system columns.
pub mod column;
/// Named constants of the table convention policy.
pub mod config;
/// Primary key, unique key, index and foreign key rules.
pub mod constraint;
/// `CREATE TABLE` rule bundle.
pub mod create;
/// Statement routing and batch review entry point.
pub mod dispatcher;
/// Finding kinds, severities and the static severity table.
pub mod finding;
/// Table and column naming rules.
pub mod naming;
/// Table option rules (charset, collation, engine).
pub mod option;
/// Partitioning clause rules and partition maintenance checks.
pub mod partition;
/// MySQL reserved words.
pub mod reserved;
/// Per-statement result accumulator and its serializable review.
pub mod result;

pub use config::PolicyConfig;
pub use dispatcher::review_sql;
pub use result::{Review, StatementResult};
