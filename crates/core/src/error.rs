use thiserror::Error;

/// Errors that can propagate out of the ccbench core and its collaborators.
///
/// Transaction-level outcomes (conflicts, body rejections) are never
/// represented here — they are infallible `bool`/struct return values so the
/// transaction manager can recover from them locally without unwinding
/// through `?`. This enum only covers configuration, parsing, and I/O
/// failures that are genuinely exceptional.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Whether this error originates from malformed user-supplied text
    /// (input/workload files) as opposed to the filesystem or flags.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
