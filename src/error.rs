//! Error types and logging helpers.
//!
//! The editor core is total and never raises user-visible errors; these
//! types cover the fallible edges only (storage, config IO).

use thiserror::Error;
use tracing::{error, warn};

/// Domain-specific errors for notekit's fallible edges. Storage reports
/// through `anyhow` with call-site context instead of a variant here.
#[derive(Error, Debug)]
pub enum NotekitError {
    #[error("config error for '{path}': {message}")]
    Config { path: String, message: String },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NotekitError>;

/// Extension trait for silent error logging with caller location.
/// Use when the operation is recoverable and the user doesn't need to know.
pub trait ResultExt<T> {
    /// Log as error and return None. For recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning and return None. For expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = NotekitError::Config {
            path: "/tmp/config.json".into(),
            message: "permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "config error for '/tmp/config.json': permission denied"
        );
    }

    #[test]
    fn test_log_err_returns_option() {
        let ok: std::result::Result<i32, String> = Ok(1);
        assert_eq!(ok.log_err(), Some(1));
        let err: std::result::Result<i32, String> = Err("boom".into());
        assert_eq!(err.log_err(), None);
    }
}
