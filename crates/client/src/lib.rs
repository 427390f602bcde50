//! AgriLink client library.
//!
//! A typed client for the AgriLink agricultural marketplace backend. The
//! crate owns the pieces of client state that need discipline:
//!
//! - [`session`] - bearer/refresh token lifecycle with expiry derived from
//!   the access token itself
//! - [`api`] - typed REST endpoints with tag-based response caching and a
//!   single token-refresh strategy
//! - [`cart`] - in-memory cart aggregation with derived totals
//! - [`wizard`] - the three-step soil-data collection flow
//! - [`checkout`] - order submission, including the escrow payment detour
//! - [`escrow`] - the wallet/contract boundary and its error classification
//!
//! # Example
//!
//! ```rust,ignore
//! use agrilink_client::{api::ApiClient, config::AgriLinkConfig, session::SessionManager};
//!
//! let config = AgriLinkConfig::from_env()?;
//! let session = SessionManager::new(config.token_store());
//! let client = ApiClient::new(&config, session)?;
//!
//! client.login(&email, &password).await?;
//! let products = client.list_products().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod escrow;
pub mod session;
pub mod wizard;
