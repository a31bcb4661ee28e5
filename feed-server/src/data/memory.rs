//! In-process store implementing every repository trait.
//!
//! Mirrors the PostgreSQL schema closely enough for the services to be
//! exercised without a database: auto-increment ids, foreign keys to
//! `users` and `posts`, the follow uniqueness constraint, unique usernames
//! and slugs, and `created_at DESC, id ASC` ordering. Timestamps come from the injected [`Clock`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::follow::Follow;
use crate::domain::group::{Group, NewGroup};
use crate::domain::post::{NewPost, Post, PostChanges, PostFilter};
use crate::domain::user::User;
use crate::infrastructure::clock::{Clock, SystemClock};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
    next_group_id: i64,
    next_post_id: i64,
    next_comment_id: i64,
    next_follow_id: i64,
}

impl Tables {
    fn has_user(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
        }
    }

    /// Snapshot of every follow edge, in insertion order.
    pub async fn follows(&self) -> Vec<Follow> {
        self.tables.read().await.follows.clone()
    }
}

fn sorted_matching(posts: &[Post], filter: &PostFilter) -> Vec<Post> {
    let mut selected: Vec<Post> = posts.iter().filter(|p| filter.matches(p)).cloned().collect();
    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    selected
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(post.author_id) {
            return Err(DomainError::UserNotFound(post.author_id));
        }
        let created = Post {
            id: next_id(&mut tables.next_post_id),
            author_id: post.author_id,
            text: post.text,
            group_id: post.group_id,
            image: post.image,
            created_at: self.clock.now(),
        };
        tables.posts.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<Option<Post>, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(post) = tables.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(text) = changes.text {
            post.text = text;
        }
        if let Some(group_id) = changes.group_id {
            post.group_id = group_id;
        }
        if let Some(image) = changes.image {
            post.image = image;
        }
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        let removed = tables.posts.len() != before;
        if removed {
            tables.comments.retain(|c| c.post_id != id);
        }
        Ok(removed)
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, DomainError> {
        let tables = self.tables.read().await;
        Ok(sorted_matching(&tables.posts, filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(DomainError::InvalidInput(format!(
                "username already taken: {}",
                user.username
            )));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, group: NewGroup) -> Result<Group, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(DomainError::InvalidInput(format!(
                "group slug already taken: {}",
                group.slug
            )));
        }
        let created = Group {
            id: next_id(&mut tables.next_group_id),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.push(created.clone());
        Ok(created)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(
        &self,
        post_id: i64,
        author_id: Uuid,
        text: &str,
    ) -> Result<Comment, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == post_id) {
            return Err(DomainError::PostNotFound(post_id));
        }
        if !tables.has_user(author_id) {
            return Err(DomainError::UserNotFound(author_id));
        }
        let comment = Comment {
            id: next_id(&mut tables.next_comment_id),
            post_id,
            author_id,
            text: text.to_string(),
            created_at: self.clock.now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn insert(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(user_id) {
            return Err(DomainError::UserNotFound(user_id));
        }
        if !tables.has_user(author_id) {
            return Err(DomainError::AuthorNotFound(author_id.to_string()));
        }
        if tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }
        let follow = Follow {
            id: next_id(&mut tables.next_follow_id),
            user_id,
            author_id,
        };
        tables.follows.push(follow);
        Ok(true)
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() != before)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn followed_authors(&self, user_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.author_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualClock;
    use chrono::{Duration, Utc};

    async fn store_with_author() -> (MemoryStore, Arc<ManualClock>, User) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = MemoryStore::new(clock.clone());
        let author = UserRepository::create(&store, User::new(Uuid::new_v4(), "author"))
            .await
            .unwrap();
        (store, clock, author)
    }

    #[tokio::test]
    async fn list_orders_newest_first_then_by_id() {
        let (store, clock, author) = store_with_author().await;

        let first = PostRepository::create(&store, NewPost::new(author.id, "first post text"))
            .await
            .unwrap();
        // same instant as `first`
        let second = PostRepository::create(&store, NewPost::new(author.id, "second post text"))
            .await
            .unwrap();
        clock.advance(Duration::seconds(1));
        let third = PostRepository::create(&store, NewPost::new(author.id, "third post text"))
            .await
            .unwrap();

        let ids: Vec<i64> = store
            .list(&PostFilter::All, 10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![third.id, first.id, second.id]);
    }

    #[tokio::test]
    async fn follow_insert_is_unique_per_pair() {
        let (store, _clock, author) = store_with_author().await;
        let reader = UserRepository::create(&store, User::new(Uuid::new_v4(), "reader"))
            .await
            .unwrap()
            .id;

        assert!(store.insert(reader, author.id).await.unwrap());
        assert!(!store.insert(reader, author.id).await.unwrap());
        assert_eq!(store.follows().await.len(), 1);

        assert!(FollowRepository::delete(&store, reader, author.id).await.unwrap());
        assert!(!FollowRepository::delete(&store, reader, author.id).await.unwrap());
        assert!(store.follows().await.is_empty());
    }

    #[tokio::test]
    async fn deleting_a_post_drops_its_comments() {
        let (store, _clock, author) = store_with_author().await;
        let post = PostRepository::create(&store, NewPost::new(author.id, "commented post text"))
            .await
            .unwrap();
        CommentRepository::create(&store, post.id, author.id, "nice")
            .await
            .unwrap();

        assert!(PostRepository::delete(&store, post.id).await.unwrap());
        assert!(store.list_for_post(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn follow_and_comment_rows_need_known_users() {
        let (store, _clock, author) = store_with_author().await;
        let stranger = Uuid::new_v4();

        let err = store.insert(stranger, author.id).await.unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound(id) if id == stranger));
        let err = store.insert(author.id, stranger).await.unwrap_err();
        assert!(matches!(err, DomainError::AuthorNotFound(_)));
        assert!(store.follows().await.is_empty());

        let post = PostRepository::create(&store, NewPost::new(author.id, "commented post text"))
            .await
            .unwrap();
        let err = CommentRepository::create(&store, post.id, stranger, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound(_)));
    }
}
