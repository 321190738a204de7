//! Domain error types for server operations.
//!
//! Handlers that fail for reasons the user cannot act on return
//! [`AppError`]. It always becomes a bare 500; the status-page middleware
//! decides whether the browser sees that or the generic authentication
//! error page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rootcause::Report;
use std::fmt;

/// Errors raised while bringing the server up.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded.
    Configuration { details: String },
    /// The identity provider could not be reached or described itself badly.
    ProviderDiscovery { details: String },
    /// The configured session secret is not usable as a cookie key.
    InvalidSessionSecret { details: String },
    /// The listening socket could not be bound.
    Bind { address: String, details: String },
    /// The server stopped with an I/O error.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { details } => write!(f, "invalid configuration: {details}"),
            Self::ProviderDiscovery { details } => {
                write!(f, "identity provider discovery failed: {details}")
            }
            Self::InvalidSessionSecret { details } => {
                write!(f, "invalid SESSION_SECRET: {details}")
            }
            Self::Bind { address, details } => write!(f, "failed to bind {address}: {details}"),
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// An unexpected failure while handling a request.
#[derive(Debug)]
pub struct AppError {
    details: String,
}

impl AppError {
    /// Returns the internal description. Never shown to the browser.
    #[must_use]
    pub fn details(&self) -> &str {
        &self.details
    }
}

impl<C> From<Report<C>> for AppError
where
    Report<C>: fmt::Display,
{
    fn from(report: Report<C>) -> Self {
        Self {
            details: report.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.details, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}
