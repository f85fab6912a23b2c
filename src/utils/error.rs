use thiserror::Error;

#[derive(Error, Debug)]
pub enum StandingsError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Store request to {path} failed with status {status}")]
    StoreError { path: String, status: u16 },

    #[error("Unexpected store payload at {path}: {reason}")]
    PayloadError { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, StandingsError>;
