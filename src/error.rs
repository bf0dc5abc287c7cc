use crate::server::pages::ErrorPage;
use crate::server::session::{Flash, FlashKind};
use askama::Template;
use axum::http::{StatusCode, header};
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// One or more form fields failed validation.
    #[error("Validation failed: {}", .0.join(" "))]
    Validation(Vec<String>),

    /// Stored credential could not be used for verification.
    #[error("This user is corrupt. Please contact the administrator.")]
    CorruptAccount,

    /// Resource not found error.
    #[error("{0} not found")]
    NotFound(String),

    /// No valid session for a protected page.
    #[error("You must be logged in to view this page.")]
    Unauthorized,

    /// Authenticated user may not perform the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-message validation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    /// Messages to show the user, if this error is one they can act on.
    pub fn user_messages(&self) -> Option<Vec<String>> {
        match self {
            AppError::Validation(messages) => Some(messages.clone()),
            AppError::CorruptAccount => Some(vec![self.to_string()]),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized => {
                let flash = Flash::new(FlashKind::Login, vec![self.to_string()]);
                return (
                    AppendHeaders([(header::SET_COOKIE, flash.cookie())]),
                    Redirect::to("/"),
                )
                    .into_response();
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::CorruptAccount => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request error");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        // Internal details stay in the log.
        let message = if status.is_server_error() {
            "Something went wrong.".to_string()
        } else {
            self.to_string()
        };

        let page = ErrorPage {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error"),
            message: &message,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(_) => (status, message).into_response(),
        }
    }
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
