/// Scan-clause synthesis and row counts for `DELETE`, `UPDATE` and `INSERT`.
pub mod analyzer;

pub use analyzer::{analyze, DmlKind, DmlReport};
