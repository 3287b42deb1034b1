//! Error types for the common crate
//!
//! This module defines the error taxonomy shared by every NNRT crate.
//! Graph contract violations (arity, lifecycle, unsupported representations)
//! are reported through dedicated variants so the embedding layer can decide
//! to abort before any partial inference result becomes observable.

use thiserror::Error;

/// Result type for NNRT operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for NNRT operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A function was bound to the wrong number of inputs or outputs
    #[error("{function}: expected {expected} {port}, got {got}")]
    Arity {
        /// Function name
        function: String,
        /// Either "inputs" or "outputs"
        port: &'static str,
        /// Human readable description of the accepted counts
        expected: String,
        /// Count actually bound
        got: usize,
    },

    /// A function does not accept a tensor stored in this representation
    #[error("{function}: unsupported representation {representation}")]
    UnsupportedRepresentation {
        /// Function name
        function: String,
        /// Offending representation
        representation: String,
    },

    /// Lifecycle operation issued in the wrong state
    #[error("{function}: cannot {operation} while {state}")]
    Lifecycle {
        /// Function name
        function: String,
        /// Operation attempted (allocate, execute)
        operation: &'static str,
        /// State the function was in
        state: String,
    },

    /// Shape error
    #[error("Shape error: {0}")]
    Shape(String),

    /// Variables bound in a way the function cannot execute (e.g. aliased output)
    #[error("Binding error: {0}")]
    Binding(String),

    /// Catalog entry without a kernel
    #[error("Unimplemented function: {0}")]
    Unimplemented(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if the error is an arity violation
    pub fn is_arity(&self) -> bool {
        matches!(self, Error::Arity { .. })
    }

    /// Returns true if the error is a lifecycle violation
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Error::Lifecycle { .. })
    }

    /// Returns true if the error is an unimplemented-function error
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Error::Unimplemented(_))
    }

    /// Returns true if the error breaks the compiled-graph contract.
    ///
    /// These are build-time invariants; a runtime that sees one must not
    /// continue executing the graph.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::Arity { .. }
                | Error::UnsupportedRepresentation { .. }
                | Error::Lifecycle { .. }
                | Error::Shape(_)
                | Error::Binding(_)
                | Error::Unimplemented(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message() {
        let err = Error::Arity {
            function: "Affine".to_string(),
            port: "inputs",
            expected: "2 or 3".to_string(),
            got: 4,
        };
        assert_eq!(err.to_string(), "Affine: expected 2 or 3 inputs, got 4");
        assert!(err.is_arity());
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_config_is_not_contract_violation() {
        let err = Error::Config("bad level".to_string());
        assert!(!err.is_contract_violation());
        assert!(!err.is_lifecycle());
    }
}
