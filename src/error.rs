//! Error handling for the storefront client

use std::fmt;
use thiserror::Error;

use storefront_auth::AuthError;
use storefront_categories::CategoryError;
use storefront_dashboard::DashboardError;

/// Unified error type for the storefront client
#[derive(Error, Debug)]
pub enum Error {
    /// Category API and category data errors
    #[error("Category error: {0}")]
    Category(#[from] CategoryError),

    /// Dashboard cache errors
    #[error("Dashboard error: {0}")]
    Dashboard(#[from] DashboardError),

    /// Session and reset token errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// Text suitable for showing to an admin user
    pub fn user_message(&self) -> String {
        match self {
            Error::Category(e) => e.user_message(),
            Error::Auth(AuthError::ResetTokenExpired(_)) => {
                "This reset link has expired. Please request a new one.".to_string()
            }
            Error::Auth(AuthError::ResetTokenNotFound(_)) | Error::Auth(AuthError::InvalidResetToken) => {
                "This reset link is invalid.".to_string()
            }
            other => other.to_string(),
        }
    }
}
