//! Session storage and bearer token lookup

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{AuthError, Result};

/// Storage key the admin console persists its token under
pub const ADMIN_TOKEN_KEY: &str = "adminToken";

/// Storage key used by the storefront login flow
pub const USER_TOKEN_KEY: &str = "token";

/// Key/value persistence for session data
///
/// Browsers keep this in local storage; here it is injected so callers
/// (and tests) decide where tokens live.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process session store
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds an admin token
    pub fn with_admin_token(token: &str) -> Self {
        let store = Self::new();
        store.set(ADMIN_TOKEN_KEY, token);
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.values.read() {
            Ok(values) => values.get(key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(key).cloned(),
        }
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = match self.values.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let mut values = match self.values.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.remove(key);
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// Supplies the bearer token attached to admin requests
pub trait TokenProvider: Send + Sync {
    /// Current token, or `None` when the user is not signed in
    fn token(&self) -> Option<String>;

    /// Current token, failing with [`AuthError::MissingToken`] when signed out
    fn require_token(&self) -> Result<String> {
        self.token().ok_or(AuthError::MissingToken)
    }
}

/// Reads the token from a [`SessionStore`], preferring the admin key
pub struct StoredToken<S: SessionStore> {
    store: S,
    keys: Vec<String>,
}

impl<S: SessionStore> StoredToken<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            keys: vec![ADMIN_TOKEN_KEY.to_string(), USER_TOKEN_KEY.to_string()],
        }
    }

    /// Override the lookup order
    pub fn with_keys(mut self, keys: &[&str]) -> Self {
        self.keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: SessionStore> TokenProvider for StoredToken<S> {
    fn token(&self) -> Option<String> {
        for key in &self.keys {
            if let Some(value) = self.store.get(key) {
                if !value.trim().is_empty() {
                    return Some(value);
                }
            }
        }
        log::debug!("no session token under {:?}", self.keys);
        None
    }
}

/// A fixed token, or none at all
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl StaticToken {
    pub fn new(token: &str) -> Self {
        Self(Some(token.to_string()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone().filter(|t| !t.trim().is_empty())
    }
}

impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}
