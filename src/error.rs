use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("An execution is already in progress")]
    AlreadyRunning,

    #[error("Execution client error: {0}")]
    Client(#[from] piston_client::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid language registry: {0}")]
    Registry(#[from] toml::de::Error),
}
