/// Core error types for policyreel.
use std::path::PathBuf;

/// A specialized Result type for policyreel operations.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error type shared by the library crates.
#[derive(Debug, thiserror::Error)]
pub enum ReelError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("storyboard validation error: {0}")]
    Storyboard(String),

    #[error("segment {index} invalid: {message}")]
    Segment { index: usize, message: String },

    #[error("timeline error: {0}")]
    Timeline(String),

    #[error("config file error: {message} ({path:?})")]
    ConfigFile { message: String, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReelError {
    /// Create a segment error pointing at the offending position.
    pub fn segment(index: usize, message: impl Into<String>) -> Self {
        ReelError::Segment {
            index,
            message: message.into(),
        }
    }

    /// Create a config file error.
    pub fn config_file(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ReelError::ConfigFile {
            message: message.into(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_error_display() {
        let err = ReelError::segment(3, "duration must be positive");
        assert_eq!(
            err.to_string(),
            "segment 3 invalid: duration must be positive"
        );
    }

    #[test]
    fn test_config_file_error_display() {
        let err = ReelError::config_file("expected a table", "/tmp/policyreel.toml");
        assert!(err.to_string().contains("expected a table"));
        assert!(err.to_string().contains("policyreel.toml"));
    }
}
