//! Account endpoints: login, registration, profile.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use agrilink_core::{Email, UserId, UserType};

use super::{ApiClient, Auth, CacheTag};
use crate::error::ApiError;
use crate::session::StoredTokens;

const LOGIN_PATH: &str = "/api/accounts/login/";
const REGISTER_PATH: &str = "/api/accounts/register/";
const PROFILE_PATH: &str = "/api/accounts/profile/";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenPairResponse {
    access: String,
    refresh: String,
    user_type: UserType,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Account email.
    pub email: Email,
    /// Account password (serialized for the wire, redacted in logs upstream).
    #[serde(serialize_with = "serialize_password")]
    pub password: SecretString,
    /// Account type to create.
    pub user_type: UserType,
    /// Display name.
    pub name: String,
}

fn serialize_password<S: serde::Serializer>(
    password: &SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(password.expose_secret())
}

/// The user's profile as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// Backend user ID.
    pub id: UserId,
    /// Account email.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Account type.
    pub user_type: UserType,
    /// Contact phone, when set.
    #[serde(default)]
    pub phone: Option<String>,
}

impl ApiClient {
    /// Log in and establish a session.
    ///
    /// On success the token pair and user type are stored through the
    /// session manager; subsequent authenticated calls use them.
    ///
    /// # Errors
    ///
    /// Returns the server's error payload verbatim on rejection.
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<(), ApiError> {
        let request = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response: TokenPairResponse = self
            .post(LOGIN_PATH, &request, &[], Auth::None)
            .await?;

        self.session().log_in(StoredTokens {
            access_token: response.access,
            refresh_token: response.refresh,
            user_type: response.user_type,
        })?;
        tracing::info!(user_type = %response.user_type, "logged in");
        Ok(())
    }

    /// Register a new account.
    ///
    /// Registration does not log in; call [`ApiClient::login`] afterwards.
    ///
    /// # Errors
    ///
    /// Field-level validation errors (duplicate email, weak password) arrive
    /// in the typed error body.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Profile, ApiError> {
        self.post(REGISTER_PATH, request, &[], Auth::None).await
    }

    /// Fetch the logged-in user's profile (cached).
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when no session is established.
    pub async fn profile(&self) -> Result<Profile, ApiError> {
        self.get_cached(PROFILE_PATH, &[CacheTag::Profile], Auth::Required)
            .await
    }

    /// Log out: clear the session and drop all cached reads.
    ///
    /// # Errors
    ///
    /// Returns an error if token storage cannot be cleared.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session().log_out()?;
        self.cache().clear();
        tracing::info!("logged out");
        Ok(())
    }
}
