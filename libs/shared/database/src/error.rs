use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid record key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Remote store error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
