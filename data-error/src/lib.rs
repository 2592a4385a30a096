use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unsupported entity type: {0}")]
    UnsupportedType(&'static str),
    #[error("Data format error: {0}")]
    Format(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e.to_string())
    }
}
