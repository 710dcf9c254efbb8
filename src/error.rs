//! Error type shared by every stage of a calibrator run.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, CalibratorError>;

/// Everything that can abort a run. None of these are retried.
#[derive(Debug, Error)]
pub enum CalibratorError {
    /// An external command exited unsuccessfully.
    #[error("command `{command}` failed ({})", describe_exit(.code))]
    ProcessFailure {
        /// Exit code, or `None` if the child was killed by a signal.
        code: Option<i32>,
        command: String,
        /// Captured stdout followed by stderr.
        output: String,
    },

    /// An external command could not be launched at all.
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The checker report used a discriminator we do not know about.
    #[error("unknown check_library category: {0:?}")]
    UnknownCategory(String),

    /// An action row is missing the columns its category needs.
    #[error("malformed {category:?} row: expected at least {expected} fields, found {found}")]
    MalformedRow {
        category: String,
        expected: usize,
        found: usize,
    },

    /// A raw title does not end in a parenthesized book id.
    #[error("no trailing \"(<digits>)\" book id in raw title {0:?}")]
    MalformedRawTitle(String),

    /// A path lacks the component the naming convention relies on.
    #[error("cannot derive {expected} from path {}", .path.display())]
    MalformedPath {
        path: PathBuf,
        expected: &'static str,
    },

    /// Moving an item into its staging directory failed.
    #[error("failed to stage {} into {}: {source}", .from.display(), .to.display())]
    Staging {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read check_library report: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failure_message_includes_exit_code() {
        let err = CalibratorError::ProcessFailure {
            code: Some(2),
            command: "calibredb check_library".to_string(),
            output: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command `calibredb check_library` failed (exit code 2)"
        );
    }

    #[test]
    fn test_process_failure_without_code() {
        let err = CalibratorError::ProcessFailure {
            code: None,
            command: "calibredb add".to_string(),
            output: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_unknown_category_names_discriminator() {
        let err = CalibratorError::UnknownCategory("Unknown".to_string());
        assert!(err.to_string().contains("\"Unknown\""));
    }
}
