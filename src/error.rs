//! Error types for the intake bot.

use std::path::PathBuf;

/// User input that failed a shape check. Recovered by re-prompting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Malformed email address: {0:?}")]
    MalformedEmail(String),
}

/// Failures of the record sink. A submission hitting one of these is abandoned.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Record file {} does not exist; it was never initialized", .0.display())]
    NotInitialized(PathBuf),

    #[error("IO error on record file: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error on record file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Record file {} has an unexpected header: {found:?}", .path.display())]
    CorruptedHeader { path: PathBuf, found: Vec<String> },

    #[error("Storage task did not complete: {0}")]
    Task(String),
}

/// Configuration-related errors. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_formatting() {
        let err = ValidationError::MalformedEmail("a@b".to_string());
        assert_eq!(err.to_string(), "Malformed email address: \"a@b\"");

        let err = ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: TELEGRAM_BOT_TOKEN"
        );

        let err = StorageError::CorruptedHeader {
            path: PathBuf::from("data.csv"),
            found: vec!["foo".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Record file data.csv has an unexpected header: [\"foo\"]"
        );
    }
}
