use std::fmt;

/// Errors that can occur during object storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The store could not be constructed from its configuration.
    Config(String),
    /// The object key is malformed (empty, traversal, control bytes).
    InvalidKey(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The backend rejected or failed the request.
    Backend(String),
    /// The backend answered with an unexpected HTTP status.
    UnexpectedStatus { status: u16 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "storage configuration error: {msg}"),
            Self::InvalidKey(key) => write!(f, "invalid object key: {key}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
            Self::UnexpectedStatus { status } => {
                write!(f, "storage backend returned status {status}")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
