use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid data type: {0:?}")]
    InvalidDataType(String),
    #[error("invalid placeholder token: {0:?}")]
    InvalidPlaceholder(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
