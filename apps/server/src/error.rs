use std::io::Error as IoError;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use netpinger_service::config;
use thiserror::Error;

/// Fatal startup and serving errors, returned from `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Environment file error: {0}")]
    DotEnv(#[from] dotenvy::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] config::Error),
    #[error("Startup failed: {0:#}")]
    Startup(#[from] anyhow::Error),
}

/// Errors raised while answering a request.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("store query failed: {0:#}")]
    Store(#[from] anyhow::Error),
    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),
    #[error("serialization failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ResponseError for RouteError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        tracing::error!(error = %self, "Request failed");
        HttpResponse::InternalServerError().finish()
    }
}
