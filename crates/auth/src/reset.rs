//! Password reset tokens

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::{AuthError, Result};

/// A pending password reset, keyed by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetToken {
    pub email: String,
    pub user_id: String,
    pub reset_token: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// リセットトークンのオプション
#[derive(Debug, Clone)]
pub struct ResetTokenOptions {
    /// How long an issued token stays valid
    pub lifetime: Duration,
}

impl Default for ResetTokenOptions {
    fn default() -> Self {
        Self {
            lifetime: Duration::hours(1),
        }
    }
}

impl ResetTokenOptions {
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }
}

/// Holds at most one active reset token per email
#[derive(Debug, Default)]
pub struct ResetTokenStore {
    tokens: RwLock<HashMap<String, ResetToken>>,
    options: ResetTokenOptions,
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::InvalidEmail(email)),
    }
}

impl ResetTokenStore {
    pub fn new(options: ResetTokenOptions) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            options,
        }
    }

    /// Issue a fresh token, replacing any previous one for the email
    pub fn issue(&self, email: &str, user_id: &str) -> Result<ResetToken> {
        self.issue_at(email, user_id, Utc::now())
    }

    pub fn issue_at(&self, email: &str, user_id: &str, now: DateTime<Utc>) -> Result<ResetToken> {
        let email = normalize_email(email)?;
        let token = ResetToken {
            email: email.clone(),
            user_id: user_id.to_string(),
            reset_token: Uuid::new_v4().to_string(),
            expires_at: now + self.options.lifetime,
        };

        let mut tokens = self.tokens.write().unwrap_or_else(|p| p.into_inner());
        if tokens.insert(email.clone(), token.clone()).is_some() {
            log::debug!("replaced reset token for {}", email);
        }
        Ok(token)
    }

    /// Check a presented token without consuming it
    pub fn verify(&self, email: &str, token: &str) -> Result<ResetToken> {
        self.verify_at(email, token, Utc::now())
    }

    pub fn verify_at(&self, email: &str, token: &str, now: DateTime<Utc>) -> Result<ResetToken> {
        let email = normalize_email(email)?;
        let tokens = self.tokens.read().unwrap_or_else(|p| p.into_inner());
        let stored = tokens
            .get(&email)
            .ok_or_else(|| AuthError::ResetTokenNotFound(email.clone()))?;

        if stored.reset_token != token {
            log::warn!("reset token mismatch for {}", email);
            return Err(AuthError::InvalidResetToken);
        }
        if stored.is_expired_at(now) {
            return Err(AuthError::ResetTokenExpired(stored.expires_at));
        }
        Ok(stored.clone())
    }

    /// Verify and remove the token so it cannot be used twice
    pub fn consume(&self, email: &str, token: &str) -> Result<ResetToken> {
        self.consume_at(email, token, Utc::now())
    }

    pub fn consume_at(&self, email: &str, token: &str, now: DateTime<Utc>) -> Result<ResetToken> {
        let verified = self.verify_at(email, token, now)?;
        let mut tokens = self.tokens.write().unwrap_or_else(|p| p.into_inner());
        // Another consumer may have replaced it between the read and write locks.
        match tokens.get(&verified.email) {
            Some(current) if current.reset_token == verified.reset_token => {
                tokens.remove(&verified.email);
                Ok(verified)
            }
            _ => Err(AuthError::InvalidResetToken),
        }
    }

    /// Drop every expired token, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut tokens = self.tokens.write().unwrap_or_else(|p| p.into_inner());
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired_at(now));
        before - tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ResetTokenStore {
        ResetTokenStore::new(ResetTokenOptions::default())
    }

    #[test]
    fn test_issue_and_verify() {
        let store = store();
        let now = Utc::now();
        let token = store.issue_at("Shopper@Example.com", "user-1", now).unwrap();

        assert_eq!(token.email, "shopper@example.com");
        assert_eq!(token.expires_at, now + Duration::hours(1));

        let verified = store
            .verify_at("shopper@example.com", &token.reset_token, now)
            .unwrap();
        assert_eq!(verified.user_id, "user-1");
    }

    #[test]
    fn test_one_token_per_email() {
        let store = store();
        let now = Utc::now();
        let first = store.issue_at("a@example.com", "u", now).unwrap();
        let second = store.issue_at("a@example.com", "u", now).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.verify_at("a@example.com", &first.reset_token, now),
            Err(AuthError::InvalidResetToken)
        );
        assert!(store.verify_at("a@example.com", &second.reset_token, now).is_ok());
    }

    #[test]
    fn test_expired_token_rejected() {
        let store = store();
        let now = Utc::now();
        let token = store.issue_at("a@example.com", "u", now).unwrap();

        let later = now + Duration::hours(2);
        match store.verify_at("a@example.com", &token.reset_token, later) {
            Err(AuthError::ResetTokenExpired(at)) => assert_eq!(at, token.expires_at),
            other => panic!("expected expiry, got {:?}", other),
        }
        assert_eq!(store.purge_expired_at(later), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired_keeps_live_tokens() {
        let store = ResetTokenStore::new(ResetTokenOptions::default());
        let long_ago = Utc::now() - Duration::hours(3);
        store.issue_at("old@example.com", "u1", long_ago).unwrap();
        let live = store.issue("new@example.com", "u2").unwrap();

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.verify("new@example.com", &live.reset_token).is_ok());
    }

    #[test]
    fn test_consume_is_single_use() {
        let store = store();
        let now = Utc::now();
        let token = store.issue_at("a@example.com", "u", now).unwrap();

        assert!(store.consume_at("a@example.com", &token.reset_token, now).is_ok());
        assert_eq!(
            store.consume_at("a@example.com", &token.reset_token, now),
            Err(AuthError::ResetTokenNotFound("a@example.com".to_string()))
        );
    }

    #[test]
    fn test_invalid_email() {
        let store = store();
        assert!(matches!(
            store.issue("not-an-email", "u"),
            Err(AuthError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_serializes_camel_case() {
        let token = ResetToken {
            email: "a@example.com".to_string(),
            user_id: "u".to_string(),
            reset_token: "t".to_string(),
            expires_at: Utc::now(),
        };
        let value = serde_json::to_value(&token).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("resetToken").is_some());
        assert!(value.get("expiresAt").is_some());
    }
}
