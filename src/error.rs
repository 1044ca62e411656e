use std::path::PathBuf;

use thiserror::Error;

/// Result alias for process-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures outside of rule evaluation: reading inputs, loading policy, writing output.
///
/// Rule violations and SQL syntax errors are never reported through this type; they become
/// findings on the statement result instead.
#[derive(Debug, Error)]
pub enum Error {
    /// An input or policy file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed to open or read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Standard input could not be read.
    #[error("cannot read standard input: {0}")]
    Stdin(#[source] std::io::Error),

    /// The policy document is not valid JSON for [`crate::policy::config::PolicyConfig`].
    #[error("invalid policy JSON: {0}")]
    InvalidPolicy(#[source] serde_json::Error),

    /// Output could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// Destination file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A result could not be serialized.
    #[error("cannot serialize output: {0}")]
    Serialize(#[source] serde_json::Error),
}
