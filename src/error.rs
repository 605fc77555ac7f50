use thiserror::Error;

/// Failures outside the parse itself. Syntax errors never surface here; they
/// are recorded on the extraction result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Config { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
