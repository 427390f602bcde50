//! Community endpoints: the connections post feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agrilink_core::PostId;

use super::{ApiClient, Auth, CacheTag};
use crate::error::ApiError;

const POSTS_PATH: &str = "/api/connections/posts/";

/// A post in the community feed.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    /// Post ID.
    pub id: PostId,
    /// Author display name.
    pub author: String,
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a post.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
}

impl ApiClient {
    /// List community posts, newest first (cached).
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when no session is established.
    pub async fn posts(&self) -> Result<Vec<Post>, ApiError> {
        self.get_cached(POSTS_PATH, &[CacheTag::Posts], Auth::Required)
            .await
    }

    /// Publish a post to the feed.
    ///
    /// # Errors
    ///
    /// Surfaces the server's error payload verbatim on rejection.
    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.post(POSTS_PATH, post, &[CacheTag::Posts], Auth::Required)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_post_deserializes() {
        let post: Post = serde_json::from_str(
            r#"{
                "id": 2,
                "author": "Ravi",
                "title": "Drip irrigation results",
                "body": "Yields up 20% this season.",
                "created_at": "2026-02-14T08:30:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(post.id, PostId::new(2));
        assert_eq!(post.author, "Ravi");
    }
}
