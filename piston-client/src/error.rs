use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("API request failed with status {status_code}: {message}")]
    Api { status_code: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
