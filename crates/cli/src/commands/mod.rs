//! Command implementations.

pub mod community;
pub mod marketplace;
pub mod session;
pub mod soil;

use agrilink_client::api::ApiClient;
use agrilink_client::config::AgriLinkConfig;
use agrilink_client::session::SessionManager;

/// Build the API client from the environment, synchronizing session state
/// with the token file first.
pub fn client() -> Result<(AgriLinkConfig, ApiClient), Box<dyn std::error::Error>> {
    let config = AgriLinkConfig::from_env()?;
    let session = SessionManager::new(config.token_store());
    session.check_validity()?;
    let client = ApiClient::new(&config, session)?;
    Ok((config, client))
}
