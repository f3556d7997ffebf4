use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ScivisError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("dataset not found in catalog: {0}")]
    #[diagnostic(help("run with --list to see available dataset names"))]
    DatasetNotFound(String),

    #[error("unknown element type: {0}")]
    UnknownType(String),

    #[error("invalid dataset url: {0}")]
    InvalidUrl(String),

    #[error("dataset name cannot be used as a file name: {0}")]
    InvalidName(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl ScivisError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ScivisError::Transport(_) | ScivisError::Status { .. })
    }

    /// Process exit status: 2 for lookup failures, 3 for network failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            ScivisError::DatasetNotFound(_) => 2,
            ScivisError::Transport(_) | ScivisError::Status { .. } => 3,
            ScivisError::Decode(_)
            | ScivisError::UnknownType(_)
            | ScivisError::InvalidUrl(_)
            | ScivisError::InvalidName(_)
            | ScivisError::ConfigRead(_)
            | ScivisError::ConfigParse(_)
            | ScivisError::Filesystem(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let cases = [
            (ScivisError::DatasetNotFound("skull".to_string()), 2),
            (ScivisError::Transport("dns error".to_string()), 3),
            (
                ScivisError::Status {
                    status: 503,
                    message: "unavailable".to_string(),
                },
                3,
            ),
            (ScivisError::Decode("eof".to_string()), 1),
            (ScivisError::UnknownType("int64".to_string()), 1),
            (ScivisError::InvalidUrl("x".to_string()), 1),
            (ScivisError::InvalidName("a/b".to_string()), 1),
            (ScivisError::ConfigRead(PathBuf::from("scivis-fetch.json")), 1),
            (ScivisError::ConfigParse("eof".to_string()), 1),
            (ScivisError::Filesystem("denied".to_string()), 1),
        ];
        for (error, code) in cases {
            assert_eq!(error.exit_code(), code, "{error}");
            assert_eq!(error.is_transport(), code == 3, "{error}");
        }
    }
}
