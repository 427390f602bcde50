//! Session lifecycle commands.

use secrecy::SecretString;
use tracing::info;

use agrilink_core::Email;

/// Log in with the given email (or `AGRILINK_EMAIL`) and the password from
/// `AGRILINK_PASSWORD`, persisting the token pair to the token file.
///
/// # Errors
///
/// Returns an error if credentials are missing, malformed, or rejected.
pub async fn login(email: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (config, client) = super::client()?;

    let email = email
        .map(str::to_owned)
        .or(config.login_email)
        .ok_or("no email given: pass --email or set AGRILINK_EMAIL")?;
    let email = Email::parse(&email)?;
    let password: SecretString = config
        .login_password
        .ok_or("AGRILINK_PASSWORD not set")?;

    client.login(&email, &password).await?;

    let user_type = client
        .session()
        .user_type()
        .map_or_else(|| "unknown".to_string(), |t| t.to_string());
    info!("Logged in as {email} ({user_type})");
    Ok(())
}

/// Clear the stored session.
///
/// # Errors
///
/// Returns an error if the token file cannot be cleared.
pub async fn logout() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = super::client()?;
    client.logout().await?;
    info!("Logged out");
    Ok(())
}

/// Report whether the stored tokens are present and unexpired.
///
/// An expired record is cleared as a side effect, so running `status` twice
/// on a stale session reports "no session" the second time.
///
/// # Errors
///
/// Returns an error if the token file cannot be read.
pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let config = agrilink_client::config::AgriLinkConfig::from_env()?;
    let session = agrilink_client::session::SessionManager::new(config.token_store());

    if session.check_validity()? {
        let user_type = session
            .user_type()
            .map_or_else(|| "unknown".to_string(), |t| t.to_string());
        info!("Session valid ({user_type})");
    } else {
        info!("No valid session; run `agrilink login`");
    }
    Ok(())
}
