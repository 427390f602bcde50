//! Error types for the AgriLink API client.
//!
//! Server error payloads arrive in several shapes (a `detail` string,
//! per-field validation maps, occasionally a bare string). [`ApiErrorBody`]
//! normalizes all of them into one typed structure so callers never poke at
//! loose JSON.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::session::SessionError;

/// Errors that can occur when calling the AgriLink backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request; the payload is surfaced verbatim.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Parsed server error payload.
        body: ApiErrorBody,
    },

    /// Not authenticated, or the refresh exchange failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Response body did not match the expected schema.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Session/token storage failed.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// A request URL could not be constructed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Typed server error payload.
///
/// The backend returns either `{"detail": "..."}`, a map of field name to
/// error list (`{"email": ["already registered"]}`), or a plain string.
/// All three parse into this struct; unknown shapes fall back to the raw
/// response text in `detail`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Top-level error message, when the server sent one.
    pub detail: Option<String>,
    /// Per-field validation errors.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ApiErrorBody {
    /// Parse a server error body from raw response bytes.
    ///
    /// Never fails: shapes that don't match any known layout are preserved
    /// as the `detail` text so the caller sees the payload verbatim.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else {
            return Self::from_text(text.trim());
        };
        Self::from_value(&value)
    }

    fn from_text(text: &str) -> Self {
        Self {
            detail: (!text.is_empty()).then(|| text.to_owned()),
            fields: BTreeMap::new(),
        }
    }

    fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::from_text(s),
            serde_json::Value::Object(map) => {
                let mut body = Self::default();
                for (key, val) in map {
                    // "detail", "error" and "message" are message keys on
                    // this backend; everything else is a field error.
                    if matches!(key.as_str(), "detail" | "error" | "message") {
                        if let Some(s) = val.as_str() {
                            body.detail = Some(s.to_owned());
                            continue;
                        }
                    }
                    let messages = match val {
                        serde_json::Value::String(s) => vec![s.clone()],
                        serde_json::Value::Array(items) => items
                            .iter()
                            .map(|item| {
                                item.as_str()
                                    .map_or_else(|| item.to_string(), str::to_owned)
                            })
                            .collect(),
                        other => vec![other.to_string()],
                    };
                    body.fields.insert(key.clone(), messages);
                }
                body
            }
            other => Self::from_text(&other.to_string()),
        }
    }

    /// True when the server sent neither a message nor field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detail.is_none() && self.fields.is_empty()
    }
}

impl std::fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(detail) = &self.detail {
            parts.push(detail.clone());
        }
        for (field, messages) in &self.fields {
            parts.push(format!("{field}: {}", messages.join(", ")));
        }
        if parts.is_empty() {
            write!(f, "(no error details provided)")
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}
