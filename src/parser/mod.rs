/// Expression walkers: referenced column names and `CURRENT_TIMESTAMP` recognition.
pub mod expr;
/// MySQL front end: batch splitting and parsing of the governed schema statements.
pub mod mysql;
/// Identifier and table-name normalization helpers (qualified names, quoted identifiers).
pub mod names;
/// Statement model consumed by the rule engine, with clause restoration.
pub mod statement;
