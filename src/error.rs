use thiserror::Error;

/// Main error type for notegraph
#[derive(Error, Debug)]
pub enum NotegraphError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal errors (unreadable directory, broken symlink loop)
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A discovered file that is not valid UTF-8 text
    #[error("Decode error: {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Corpus serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using NotegraphError
pub type Result<T> = std::result::Result<T, NotegraphError>;
