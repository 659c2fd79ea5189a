//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::Envelope;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Token requerido")]
    AuthMissing,
    #[error("Token inválido")]
    AuthInvalid,
    #[error("{0}")]
    Validation(String),
    #[error("Estado no válido")]
    InvalidState,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// Store fault with the fixed per-operation message; the underlying
    /// driver error is logged where the fault is caught, never surfaced.
    #[error("{0}")]
    Store(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    /// HTTP status for this error. The envelope contract pins Conflict to
    /// 400, not 409.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthMissing => StatusCode::UNAUTHORIZED,
            AppError::AuthInvalid => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::InvalidState | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Config(_) | AppError::Db(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Config(e) => {
                tracing::error!(error = %e, "configuration failure");
                "Error interno del servidor".to_string()
            }
            AppError::Db(e) => {
                tracing::error!(error = %e, "database failure");
                "Error en la base de datos".to_string()
            }
            other => other.to_string(),
        };
        Envelope::error(status, message).into_response()
    }
}
