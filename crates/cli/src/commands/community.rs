//! Community feed commands.

use tracing::info;

use agrilink_client::api::community::NewPost;

/// Print the community feed.
///
/// # Errors
///
/// Returns an error if the request fails or the session is invalid.
pub async fn list_posts() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = super::client()?;
    let posts = client.posts().await?;

    info!("{} posts", posts.len());
    for post in &posts {
        info!(
            "  #{} {} by {} ({})",
            post.id,
            post.title,
            post.author,
            post.created_at.format("%Y-%m-%d"),
        );
    }
    Ok(())
}

/// Publish a post to the feed.
///
/// # Errors
///
/// Returns an error if the submission is rejected.
pub async fn create_post(title: String, body: String) -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = super::client()?;
    let post = client.create_post(&NewPost { title, body }).await?;
    info!("Published post #{}", post.id);
    Ok(())
}
