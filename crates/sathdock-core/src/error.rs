use thiserror::Error;

#[derive(Debug, Error)]
pub enum SathdockError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("grid parameter generator failed: {0}")]
    Generator(String),

    #[error("error parsing gpf: {0}")]
    GpfParse(String),

    #[error("unknown docking program: {0}")]
    UnknownProgram(String),

    /// Non-zero exit from the docking binary. The message is the full
    /// captured stderr of the subprocess, nothing else.
    #[error("{0}")]
    DockingFailed(String),
}

pub type Result<T> = std::result::Result<T, SathdockError>;
