//! Storefront auth context for Rust
//!
//! This crate provides the pieces of authentication the admin client needs:
//! a pluggable session store, a bearer token accessor that reads it, and
//! password-reset tokens with expiry.

mod reset;
mod session;

use thiserror::Error;

pub use reset::*;
pub use session::*;

/// 結果型
pub type Result<T> = std::result::Result<T, AuthError>;

/// エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing session token")]
    MissingToken,

    #[error("No reset token issued for {0}")]
    ResetTokenNotFound(String),

    #[error("Invalid reset token")]
    InvalidResetToken,

    #[error("Reset token expired at {0}")]
    ResetTokenExpired(chrono::DateTime<chrono::Utc>),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}
