use thiserror::Error;

pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("base64 decode error {0}")]
    Base64Error(#[from] base64::DecodeError),
    #[error("utf8 decode error {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    #[error("json decode error {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Failures that end an invocation before any external call is made.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    DecodeError(#[from] DecodeError),
    #[error("validation error {0}")]
    ValidationError(String),
    #[error("config error {0}")]
    ConfigError(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("push error {0}")]
    PushError(String),
    #[error("push timed out after {0}s")]
    TimeoutError(u64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("insert record error {0}")]
    InsertError(String),
    #[error("insert record timed out after {0}s")]
    TimeoutError(u64),
}
