#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Source not available: {0}")]
    SourceUnavailable(String),

    #[error("Source read failed: {0}")]
    SourceFailed(String),

    #[error("Source call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown sensor model: {0}")]
    UnknownModel(String),

    #[error("Worker is already running")]
    AlreadyRunning,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task error: {0}")]
    Task(String),
}

impl Error {
    pub(crate) fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Error::InvalidConfig(msg.into())
    }

    pub(crate) fn source_unavailable<S: Into<String>>(msg: S) -> Self {
        Error::SourceUnavailable(msg.into())
    }

    pub(crate) fn source_failed<S: Into<String>>(msg: S) -> Self {
        Error::SourceFailed(msg.into())
    }

    pub(crate) fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }

    pub(crate) fn task<S: Into<String>>(msg: S) -> Self {
        Error::Task(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
