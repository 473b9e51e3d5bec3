use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    #[error("Resource not found")]
    NotFound,
    #[error("Operation not authorized")]
    Unauthorized,
    #[error("Upstream service failed")]
    Upstream,
    #[error("Internal system error")]
    SystemError,
    #[error("Validation failed")]
    ValidationFailed,
}

/// JSON body returned for every failed API call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}
