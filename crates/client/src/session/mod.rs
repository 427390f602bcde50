//! Session and token lifecycle.
//!
//! The session manager is the single source of truth for authentication
//! state. Expiry is never stored separately: it is decoded from the access
//! token's `exp` claim on every read, so storage and reality cannot drift.
//! Nothing else in the crate reads the token store directly.
//!
//! # Validity rules
//!
//! - A session is valid iff an access token is present and its `exp` claim
//!   is in the future.
//! - [`SessionManager::check_validity`] synchronizes in-memory state with
//!   storage and clears the whole stored record when the token is stale.
//!   It is idempotent and safe to call repeatedly (app start, before every
//!   command).
//! - The API layer is the only place that performs a refresh exchange; see
//!   [`crate::api`].

mod store;

pub use store::{FileTokenStore, MemoryTokenStore, StoredTokens, TokenStore};

use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use agrilink_core::UserType;

/// Errors from session state and token storage.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Token storage could not be read or written.
    #[error("token storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Stored record could not be (de)serialized.
    #[error("token record error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A lock was poisoned by a panicking thread.
    #[error("session state lock poisoned")]
    Poisoned,

    /// The access token is not a decodable JWT.
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: i64,
}

/// Decode the expiry claim from a JWT access token.
///
/// Only the payload segment is decoded; the signature is the backend's
/// concern. This mirrors what the server will conclude about the token
/// without a round trip.
///
/// # Errors
///
/// Returns an error if the token has no payload segment, the segment is not
/// base64url, or the claims carry no usable `exp`.
pub fn token_expiry(token: &str) -> Result<DateTime<Utc>, SessionError> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|s| !s.is_empty())
        .ok_or(SessionError::MalformedToken("missing payload segment"))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| SessionError::MalformedToken("payload is not base64url"))?;
    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|_| SessionError::MalformedToken("payload is not a JWT claim set"))?;
    DateTime::from_timestamp(claims.exp, 0)
        .ok_or(SessionError::MalformedToken("exp is out of range"))
}

/// Whether a token decodes and has not expired.
#[must_use]
pub fn token_is_current(token: &str) -> bool {
    token_expiry(token).is_ok_and(|exp| exp > Utc::now())
}

#[derive(Debug, Default, Clone)]
struct AuthState {
    authenticated: bool,
    user_type: Option<UserType>,
}

/// Owner of the stored credentials and the in-memory authentication flag.
///
/// Cheap to clone; clones share the same store and state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    store: Box<dyn TokenStore>,
    state: Mutex<AuthState>,
}

impl SessionManager {
    /// Create a session manager over the given token store.
    #[must_use]
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Box::new(store),
                state: Mutex::new(AuthState::default()),
            }),
        }
    }

    /// Store a fresh token pair after login and mark the session
    /// authenticated.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    pub fn log_in(&self, tokens: StoredTokens) -> Result<(), SessionError> {
        let user_type = tokens.user_type;
        self.inner.store.save(&tokens)?;
        self.set_state(true, Some(user_type))?;
        tracing::debug!(%user_type, "session established");
        Ok(())
    }

    /// Clear the stored record and the in-memory flag.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn log_out(&self) -> Result<(), SessionError> {
        self.inner.store.clear()?;
        self.set_state(false, None)?;
        tracing::debug!("session cleared");
        Ok(())
    }

    /// Read-only validity check: token present and unexpired.
    ///
    /// Storage errors and malformed tokens both read as "not valid".
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner
            .store
            .load()
            .ok()
            .flatten()
            .is_some_and(|tokens| token_is_current(&tokens.access_token))
    }

    /// Synchronize in-memory authentication state with storage.
    ///
    /// A stale or unreadable token clears the entire stored record (access
    /// token, refresh token, and user type go together). A record that no
    /// longer parses is treated the same way as an expired one, so the check
    /// stays idempotent on damaged storage. Returns the resulting
    /// authenticated state.
    ///
    /// # Errors
    ///
    /// Returns an error only when storage itself fails; a missing, expired,
    /// or corrupt record is the `Ok(false)` path.
    pub fn check_validity(&self) -> Result<bool, SessionError> {
        let tokens = match self.inner.store.load() {
            Ok(tokens) => tokens,
            Err(SessionError::Serialize(_)) => {
                self.inner.store.clear()?;
                self.set_state(false, None)?;
                tracing::warn!("stored session record was unreadable, cleared");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        let Some(tokens) = tokens else {
            self.set_state(false, None)?;
            return Ok(false);
        };

        if token_is_current(&tokens.access_token) {
            self.set_state(true, Some(tokens.user_type))?;
            Ok(true)
        } else {
            self.inner.store.clear()?;
            self.set_state(false, None)?;
            tracing::debug!("cleared stale session tokens");
            Ok(false)
        }
    }

    /// The in-memory authenticated flag, as last synchronized.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .state
            .lock()
            .map(|s| s.authenticated)
            .unwrap_or(false)
    }

    /// The account type from the last synchronized session, if any.
    #[must_use]
    pub fn user_type(&self) -> Option<UserType> {
        self.inner
            .state
            .lock()
            .ok()
            .and_then(|s| s.user_type)
    }

    /// Load the stored record for the request path.
    pub(crate) fn stored(&self) -> Result<Option<StoredTokens>, SessionError> {
        self.inner.store.load()
    }

    /// Replace the access token after a successful refresh exchange.
    pub(crate) fn update_access_token(&self, access_token: String) -> Result<(), SessionError> {
        let Some(mut tokens) = self.inner.store.load()? else {
            // Session was cleared while the refresh was in flight; nothing
            // to update.
            return Ok(());
        };
        tokens.access_token = access_token;
        self.inner.store.save(&tokens)?;
        self.set_state(true, Some(tokens.user_type))?;
        Ok(())
    }

    fn set_state(
        &self,
        authenticated: bool,
        user_type: Option<UserType>,
    ) -> Result<(), SessionError> {
        let mut state = self.inner.state.lock().map_err(|_| SessionError::Poisoned)?;
        state.authenticated = authenticated;
        state.user_type = user_type;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Build an unsigned JWT with the given expiry timestamp.
    fn token_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
        format!("{header}.{payload}.sig")
    }

    fn tokens(access: String) -> StoredTokens {
        StoredTokens {
            access_token: access,
            refresh_token: "refresh".to_string(),
            user_type: UserType::Buyer,
        }
    }

    fn future_exp() -> i64 {
        (Utc::now() + chrono::Duration::hours(1)).timestamp()
    }

    fn past_exp() -> i64 {
        (Utc::now() - chrono::Duration::hours(1)).timestamp()
    }

    #[test]
    fn test_token_expiry_decodes_exp() {
        let exp = future_exp();
        let decoded = token_expiry(&token_with_exp(exp)).unwrap();
        assert_eq!(decoded.timestamp(), exp);
    }

    #[test]
    fn test_token_expiry_rejects_garbage() {
        assert!(token_expiry("").is_err());
        assert!(token_expiry("not-a-jwt").is_err());
        assert!(token_expiry("a.!!!.c").is_err());
        let no_exp = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"{}"));
        assert!(token_expiry(&no_exp).is_err());
    }

    #[test]
    fn test_is_valid_with_current_token() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        manager.log_in(tokens(token_with_exp(future_exp()))).unwrap();
        assert!(manager.is_valid());
    }

    #[test]
    fn test_is_valid_false_for_expired_or_absent() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        assert!(!manager.is_valid());

        manager.log_in(tokens(token_with_exp(past_exp()))).unwrap();
        assert!(!manager.is_valid());
    }

    #[test]
    fn test_check_validity_clears_expired_record() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        manager.log_in(tokens(token_with_exp(past_exp()))).unwrap();

        assert!(!manager.check_validity().unwrap());
        // Everything went together: no tokens remain at all.
        assert!(manager.stored().unwrap().is_none());
        assert!(!manager.is_authenticated());
        assert!(manager.user_type().is_none());

        // Idempotent.
        assert!(!manager.check_validity().unwrap());
    }

    #[test]
    fn test_check_validity_clears_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        let manager = SessionManager::new(FileTokenStore::new(path.clone()));
        assert!(!manager.check_validity().unwrap());
        assert!(!manager.is_authenticated());
        // The damaged file is gone, so the next check takes the normal
        // missing-record path.
        assert!(!path.exists());
        assert!(!manager.check_validity().unwrap());
    }

    #[test]
    fn test_check_validity_confirms_current_session() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        manager.log_in(tokens(token_with_exp(future_exp()))).unwrap();

        assert!(manager.check_validity().unwrap());
        assert!(manager.is_authenticated());
        assert_eq!(manager.user_type(), Some(UserType::Buyer));
    }

    #[test]
    fn test_update_access_token_keeps_refresh() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        manager.log_in(tokens(token_with_exp(past_exp()))).unwrap();

        let fresh = token_with_exp(future_exp());
        manager.update_access_token(fresh.clone()).unwrap();

        let stored = manager.stored().unwrap().unwrap();
        assert_eq!(stored.access_token, fresh);
        assert_eq!(stored.refresh_token, "refresh");
    }

    #[test]
    fn test_update_access_token_after_clear_is_noop() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        manager
            .update_access_token(token_with_exp(future_exp()))
            .unwrap();
        assert!(manager.stored().unwrap().is_none());
    }

    #[test]
    fn test_log_out_clears_everything() {
        let manager = SessionManager::new(MemoryTokenStore::new());
        manager.log_in(tokens(token_with_exp(future_exp()))).unwrap();
        manager.log_out().unwrap();

        assert!(!manager.is_valid());
        assert!(!manager.is_authenticated());
        assert!(manager.stored().unwrap().is_none());
    }
}
