use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{NewPost, Post, PostChanges};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub group: Option<Group>,
    pub comments: Vec<Comment>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    comments: Arc<dyn CommentRepository>,
}

fn require_text(text: &str, what: &str) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::InvalidInput(format!("{what} text must not be empty")));
    }
    Ok(())
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            posts,
            groups,
            comments,
        }
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    pub async fn post_detail(&self, id: i64) -> Result<PostDetail, DomainError> {
        let post = self.get_post(id).await?;
        let group = match post.group_id {
            Some(group_id) => self.groups.find_by_id(group_id).await?,
            None => None,
        };
        let comments = self.comments.list_for_post(id).await?;
        Ok(PostDetail {
            post,
            group,
            comments,
        })
    }

    #[instrument(skip(self, post), fields(author_id = %post.author_id))]
    pub async fn create_post(&self, post: NewPost) -> Result<Post, DomainError> {
        require_text(&post.text, "post")?;
        if let Some(group_id) = post.group_id {
            self.ensure_group(group_id).await?;
        }
        self.posts.create(post).await
    }

    #[instrument(skip(self, changes))]
    pub async fn edit_post(
        &self,
        editor: Uuid,
        post_id: i64,
        changes: PostChanges,
    ) -> Result<Post, DomainError> {
        let post = self.get_post(post_id).await?;
        if post.author_id != editor {
            return Err(DomainError::Forbidden);
        }
        if let Some(text) = &changes.text {
            require_text(text, "post")?;
        }
        if let Some(Some(group_id)) = changes.group_id {
            self.ensure_group(group_id).await?;
        }

        self.posts
            .update(post_id, changes)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, actor: Uuid, post_id: i64) -> Result<(), DomainError> {
        let post = self.get_post(post_id).await?;
        if post.author_id != actor {
            return Err(DomainError::Forbidden);
        }
        if !self.posts.delete(post_id).await? {
            return Err(DomainError::PostNotFound(post_id));
        }
        Ok(())
    }

    #[instrument(skip(self, text))]
    pub async fn add_comment(
        &self,
        author: Uuid,
        post_id: i64,
        text: &str,
    ) -> Result<Comment, DomainError> {
        require_text(text, "comment")?;
        self.get_post(post_id).await?;
        self.comments.create(post_id, author, text.trim()).await
    }

    async fn ensure_group(&self, group_id: i64) -> Result<(), DomainError> {
        self.groups
            .find_by_id(group_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::GroupNotFound(group_id.to_string()))
    }
}
