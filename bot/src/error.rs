use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{ErrorCode, ValidationError};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
    #[error("Invalid time: {0}")]
    InvalidTime(#[from] time::error::ComponentRange),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Transport call timed out: {0}")]
    Timeout(String),
    #[error("Poll option not registered: {0}")]
    UnknownOption(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found")]
    NotFound,
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BotError::Timeout(e.to_string())
        } else {
            BotError::Transport(e.to_string())
        }
    }
}

impl BotError {
    fn status(&self) -> (Status, ErrorCode) {
        match self {
            BotError::Unauthorized => (Status::Unauthorized, ErrorCode::Unauthorized),
            BotError::NotFound => (Status::NotFound, ErrorCode::NotFound),
            BotError::InvalidConfig(_) => (Status::BadRequest, ErrorCode::ValidationFailed),
            BotError::Transport(_) | BotError::Timeout(_) => (Status::BadGateway, ErrorCode::Upstream),
            _ => (Status::InternalServerError, ErrorCode::SystemError),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for BotError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let (status, code) = self.status();
        if status.code >= 500 {
            error!("{} {} failed: {}", req.method(), req.uri(), self);
        }

        let body = shared::Error::new(code, self.to_string());
        rocket::Response::build_from(Json(body).respond_to(req)?)
            .status(status)
            .ok()
    }
}
