//! Error taxonomy for the conversion service

use thiserror::Error;

use crate::converters::ConvertError;
use crate::state::StoreError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Uploaded file's extension is not one the tool accepts
    #[error("This tool accepts: {accepted}")]
    UnsupportedExtension { accepted: String },

    #[error("{0}")]
    ConversionFailure(String),

    #[error("{0}")]
    NotImplemented(String),

    /// The job exists but is not in a state that allows the request
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InternalError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<ConvertError> for ServiceError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::NotImplemented(message) => ServiceError::NotImplemented(message),
            other => ServiceError::ConversionFailure(other.to_string()),
        }
    }
}

impl ServiceError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidRequest(_) | ServiceError::UnsupportedExtension { .. } => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::NotImplemented(_) => 501,
            ServiceError::ConversionFailure(_)
            | ServiceError::InternalError(_)
            | ServiceError::Io(_)
            | ServiceError::Storage(_) => 500,
        }
    }
}
