pub mod error;
pub mod http_client;
pub mod models;

pub use error::FeedClientError;
pub use http_client::FeedClientHttp;
pub use models::{Comment, Feed, FeedScope, FollowResponse, Group, Page, Post, PostDetail, PostInput, User};

use async_trait::async_trait;

/// Operations exposed by the feed server's HTTP API.
#[async_trait(?Send)]
pub trait FeedApi {
    async fn global_feed(&self, page: u32) -> Result<Feed, FeedClientError>;
    async fn group_feed(&self, slug: &str, page: u32) -> Result<Feed, FeedClientError>;
    async fn profile_feed(&self, username: &str, page: u32) -> Result<Feed, FeedClientError>;
    async fn subscription_feed(&self, page: u32) -> Result<Feed, FeedClientError>;
    async fn follow(&self, username: &str) -> Result<FollowResponse, FeedClientError>;
    async fn unfollow(&self, username: &str) -> Result<FollowResponse, FeedClientError>;
    async fn get_post(&self, id: i64) -> Result<PostDetail, FeedClientError>;
    async fn create_post(&self, input: PostInput) -> Result<Post, FeedClientError>;
    async fn update_post(&self, id: i64, input: PostInput) -> Result<Post, FeedClientError>;
    async fn delete_post(&self, id: i64) -> Result<(), FeedClientError>;
    async fn add_comment(&self, post_id: i64, text: String) -> Result<Comment, FeedClientError>;
}
