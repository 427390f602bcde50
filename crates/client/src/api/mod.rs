//! Typed REST client for the AgriLink backend.
//!
//! # Architecture
//!
//! - One [`ApiClient`] wraps a `reqwest::Client`, the base URL, the session
//!   manager, and the read cache
//! - Endpoint groups live in submodules (`accounts`, `crops`, `marketplace`,
//!   `community`) as `impl ApiClient` blocks with their wire types
//! - Read responses are cached under [`CacheTag`]s; mutations invalidate the
//!   tags they declare
//!
//! # Token refresh
//!
//! There is exactly one refresh strategy, and it lives here: before an
//! authenticated request the client takes a current access token from the
//! session manager, refreshing through `/api/accounts/token/refresh/` if the
//! stored one has expired; if the server still answers 401 the client
//! refreshes once and retries once. A failed refresh clears the session and
//! surfaces [`ApiError::Unauthorized`]. No other call site touches tokens.
//!
//! Requests are plain awaited futures; dropping the caller's future cancels
//! the request with it.

pub mod accounts;
mod cache;
pub mod community;
pub mod crops;
pub mod marketplace;

pub use cache::{CacheTag, ResponseCache};

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::AgriLinkConfig;
use crate::error::{ApiError, ApiErrorBody};
use crate::session::{SessionManager, token_is_current};

const REFRESH_PATH: &str = "/api/accounts/token/refresh/";

/// Whether an endpoint requires a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    None,
    Required,
}

/// Client for the AgriLink REST API.
///
/// Cheap to clone; clones share the HTTP connection pool, session, and
/// cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: SessionManager,
    cache: ResponseCache,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &AgriLinkConfig, session: SessionManager) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("agrilink-client/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.api_url.clone(),
                session,
                cache: ResponseCache::new(Duration::from_secs(config.cache_ttl_secs)),
            }),
        })
    }

    /// The session manager this client authenticates through.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request plumbing
    // ─────────────────────────────────────────────────────────────────────────

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// GET a read endpoint, serving from the tag cache when possible.
    async fn get_cached<T: DeserializeOwned>(
        &self,
        path: &str,
        tags: &[CacheTag],
        auth: Auth,
    ) -> Result<T, ApiError> {
        if let Some(cached) = self.inner.cache.get(path) {
            tracing::trace!(path, "cache hit");
            return Ok(serde_json::from_value(cached)?);
        }

        let value = self.request(Method::GET, path, None, auth).await?;
        self.inner.cache.insert(path, value.clone(), tags);
        Ok(serde_json::from_value(value)?)
    }

    /// POST a mutation, invalidating the declared cache tags on success.
    async fn post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        invalidates: &[CacheTag],
        auth: Auth,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let value = self.request(Method::POST, path, Some(body), auth).await?;
        self.inner.cache.invalidate(invalidates);
        Ok(serde_json::from_value(value)?)
    }

    /// Issue one HTTP request, handling auth and the single 401 retry.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        auth: Auth,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(path)?;

        let token = match auth {
            Auth::None => None,
            Auth::Required => Some(self.current_access_token().await?),
        };

        let response = self.send(&method, &url, body.as_ref(), token.as_deref()).await?;

        // One refresh, one retry. Only meaningful for authenticated calls.
        if response.status() == StatusCode::UNAUTHORIZED && auth == Auth::Required {
            tracing::debug!(path, "401 from server, refreshing token and retrying once");
            let token = self.refresh_access_token().await?;
            let retried = self.send(&method, &url, body.as_ref(), Some(&token)).await?;
            return Self::read_body(retried).await;
        }

        Self::read_body(response).await
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.inner.http.request(method.clone(), url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Read a response into JSON, mapping failures to the typed error body.
    async fn read_body(response: reqwest::Response) -> Result<serde_json::Value, ApiError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                body: ApiErrorBody::from_bytes(&bytes),
            });
        }

        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Token refresh (the only call sites in the crate)
    // ─────────────────────────────────────────────────────────────────────────

    /// A current access token, refreshing first if the stored one expired.
    async fn current_access_token(&self) -> Result<String, ApiError> {
        let Some(tokens) = self.inner.session.stored()? else {
            return Err(ApiError::Unauthorized("not logged in".to_string()));
        };

        if token_is_current(&tokens.access_token) {
            return Ok(tokens.access_token);
        }

        tracing::debug!("stored access token expired, attempting refresh");
        self.exchange_refresh_token(&tokens.refresh_token).await
    }

    /// Unconditionally refresh (the 401-retry path).
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let Some(tokens) = self.inner.session.stored()? else {
            return Err(ApiError::Unauthorized("not logged in".to_string()));
        };
        self.exchange_refresh_token(&tokens.refresh_token).await
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<String, ApiError> {
        let url = self.endpoint(REFRESH_PATH)?;
        let body = serde_json::json!({ "refresh": refresh_token });

        let response = self.send(&Method::POST, &url, Some(&body), None).await?;
        let status = response.status();

        if !status.is_success() {
            // The refresh token is no good either; the session is over.
            self.inner.session.log_out()?;
            self.inner.cache.clear();
            tracing::debug!(status = %status, "refresh exchange rejected, session cleared");
            return Err(ApiError::Unauthorized(
                "session expired, please log in again".to_string(),
            ));
        }

        let refreshed: RefreshResponse = serde_json::from_slice(&response.bytes().await?)?;
        self.inner
            .session
            .update_access_token(refreshed.access.clone())?;
        Ok(refreshed.access)
    }

    pub(crate) fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }
}
