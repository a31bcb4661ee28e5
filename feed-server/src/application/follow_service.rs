use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::follow_repository::FollowRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;

/// Subscribe / unsubscribe between users. Both operations are idempotent and
/// report through their boolean result whether anything changed.
#[derive(Clone)]
pub struct FollowService {
    follows: Arc<dyn FollowRepository>,
    users: Arc<dyn UserRepository>,
}

impl FollowService {
    pub fn new(follows: Arc<dyn FollowRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { follows, users }
    }

    #[instrument(skip(self))]
    pub async fn subscribe(&self, follower: Uuid, author: Uuid) -> Result<bool, DomainError> {
        if follower == author {
            return Err(DomainError::SelfFollowRejected);
        }
        if self.users.find_by_id(author).await?.is_none() {
            return Err(DomainError::AuthorNotFound(author.to_string()));
        }
        self.link(follower, author).await
    }

    async fn link(&self, follower: Uuid, author: Uuid) -> Result<bool, DomainError> {
        let inserted = self.follows.insert(follower, author).await?;
        if !inserted {
            info!(follower = %follower, author = %author, "already following");
        }
        Ok(inserted)
    }

    #[instrument(skip(self))]
    pub async fn unsubscribe(&self, follower: Uuid, author: Uuid) -> Result<bool, DomainError> {
        self.follows.delete(follower, author).await
    }

    pub async fn is_following(&self, follower: Uuid, author: Uuid) -> Result<bool, DomainError> {
        self.follows.exists(follower, author).await
    }

    pub async fn follow_username(
        &self,
        follower: Uuid,
        username: &str,
    ) -> Result<bool, DomainError> {
        let author = self.author_id(username).await?;
        if follower == author {
            return Err(DomainError::SelfFollowRejected);
        }
        self.link(follower, author).await
    }

    pub async fn unfollow_username(
        &self,
        follower: Uuid,
        username: &str,
    ) -> Result<bool, DomainError> {
        let author = self.author_id(username).await?;
        self.unsubscribe(follower, author).await
    }

    async fn author_id(&self, username: &str) -> Result<Uuid, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .map(|user| user.id)
            .ok_or_else(|| DomainError::AuthorNotFound(username.to_string()))
    }
}
