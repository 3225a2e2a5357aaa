//! Application error types.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use solace_core::entries::StoreError;
use thiserror::Error;
use tracing::error;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Failures that reach the user as a 500 page.
///
/// Upstream completion failures never appear here; the completion client
/// absorbs them.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Template error: {0}")]
    Render(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<!doctype html><title>Internal Server Error</title><h1>Internal Server Error</h1>"),
        )
            .into_response()
    }
}
