//! Unified error type for the snapshot and CLI layers.
//!
//! The resolution core itself never fails: every degradation there is logged
//! and recovered locally. Only reading, writing and validating snapshots can error.

use thiserror::Error;

/// All errors that can occur outside the resolution core.
#[derive(Error, Debug)]
pub enum ForkGraphError {
    /// I/O error (snapshot read/write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON or a document that does not match the snapshot schema
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot parsed but its content is unusable
    #[error("Invalid input in '{path}': {message}")]
    InvalidInput { path: String, message: String },

    /// Conflicting or otherwise invalid command-line arguments
    #[error("{0}")]
    InvalidArgs(String),

    /// A resolved commit list breaks the structural output guarantees
    #[error("{count} invariant violation(s) found in '{path}'")]
    InvariantViolation { path: String, count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = ForkGraphError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(err.to_string().contains("I/O error"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ForkGraphError = json_err.into();
        assert!(matches!(err, ForkGraphError::Json(_)));
        assert!(err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_invalid_input_display() {
        let err = ForkGraphError::InvalidInput {
            path: "snapshot.json".to_string(),
            message: "main_repo is empty".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("snapshot.json"));
        assert!(msg.contains("main_repo is empty"));
    }

    #[test]
    fn test_invalid_args_display() {
        let err = ForkGraphError::InvalidArgs("--output must differ from --input".to_string());
        assert_eq!(err.to_string(), "--output must differ from --input");
    }

    #[test]
    fn test_invariant_violation_display() {
        let err = ForkGraphError::InvariantViolation {
            path: "out.json".to_string(),
            count: 3,
        };
        assert_eq!(err.to_string(), "3 invariant violation(s) found in 'out.json'");
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: ForkGraphError = io_err.into();
        assert!(matches!(err, ForkGraphError::Io(_)));
    }
}
