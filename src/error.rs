// error types - none fatal, all end up as turn text

use std::time::Duration;
use thiserror::Error;

/// Why a filesystem operation on the virtual vault failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    #[error("No such file or directory")]
    NotFound,
    #[error("Not a directory")]
    NotADirectory,
    #[error("Is a directory")]
    IsADirectory,
    #[error("File exists")]
    AlreadyExists,
    #[error("Directory not empty")]
    NotEmpty,
    #[error("Device or resource busy")]
    Busy,
    #[error("Invalid argument")]
    InvalidPath,
}

/// Errors produced by command simulators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// Missing or malformed arguments; the payload is the full usage text.
    #[error("{0}")]
    Usage(String),

    /// A filesystem failure, prefixed with the command's own context
    /// (e.g. `cd: docs` or `cp: cannot stat 'a.txt'`).
    #[error("{context}: {reason}")]
    Fs {
        context: String,
        #[source]
        reason: FsError,
    },

    /// The command name has no simulator.
    #[error("Simulated execution of '{raw}'. Unrecognized command.")]
    Unrecognized { raw: String },
}

impl ShellError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn fs(context: impl Into<String>, reason: FsError) -> Self {
        Self::Fs {
            context: context.into(),
            reason,
        }
    }

    /// True when the operation target was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Fs {
                reason: FsError::NotFound,
                ..
            }
        )
    }
}

/// Failures of the hosted language-model collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("language model unavailable: {0}")]
    Unavailable(String),

    #[error("language model did not answer within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("malformed language model reply: {0}")]
    Malformed(String),
}

/// Router configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid router configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid epoch '{value}': {source}")]
    Epoch {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_error_display() {
        let err = ShellError::fs("cd: docs", FsError::NotFound);
        assert_eq!(err.to_string(), "cd: docs: No such file or directory");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unrecognized_display() {
        let err = ShellError::Unrecognized {
            raw: "frobnicate now".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Simulated execution of 'frobnicate now'. Unrecognized command."
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_timeout_display() {
        let err = ModelError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "language model did not answer within 1500ms");
    }
}
