use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::application::pagination::{Page, PageWindow};
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::group::{Group, is_valid_slug};
use crate::domain::post::{Post, PostFilter};
use crate::domain::user::User;
use crate::infrastructure::cache::{ResponseCache, get_or_compute};
use crate::infrastructure::config::FeedSettings;

/// Cache slot shared by every page of the global feed.
pub const GLOBAL_FEED_CACHE_KEY: &str = "feed:global";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMode {
    Global,
    ByGroup(String),
    ByAuthor(String),
    BySubscriptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedScope {
    Global,
    Group { group: Group },
    Author { author: User, following: bool },
    Subscriptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feed {
    pub scope: FeedScope,
    pub page: Page<Post>,
}

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    cache: Arc<dyn ResponseCache>,
    settings: FeedSettings,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        cache: Arc<dyn ResponseCache>,
        settings: FeedSettings,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            follows,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> FeedSettings {
        self.settings
    }

    /// One page of posts selected by `mode`, newest first.
    ///
    /// `viewer` is the authenticated user, if any. The subscription feed
    /// requires one; the author feed uses it to report whether the viewer
    /// already follows that author.
    #[instrument(skip(self))]
    pub async fn compose_feed(
        &self,
        mode: FeedMode,
        viewer: Option<Uuid>,
        page_number: u32,
    ) -> Result<Feed, DomainError> {
        let (scope, filter) = match mode {
            FeedMode::Global => (FeedScope::Global, PostFilter::All),
            FeedMode::ByGroup(slug) => {
                let group = self.group_by_slug(&slug).await?;
                let filter = PostFilter::Group(group.id);
                (FeedScope::Group { group }, filter)
            }
            FeedMode::ByAuthor(username) => {
                let author = self
                    .users
                    .find_by_username(&username)
                    .await?
                    .ok_or(DomainError::AuthorNotFound(username))?;
                let following = match viewer {
                    Some(viewer) => self.follows.exists(viewer, author.id).await?,
                    None => false,
                };
                let filter = PostFilter::Author(author.id);
                (FeedScope::Author { author, following }, filter)
            }
            FeedMode::BySubscriptions => {
                let viewer = viewer.ok_or(DomainError::Unauthorized)?;
                let authors = self.follows.followed_authors(viewer).await?;
                (FeedScope::Subscriptions, PostFilter::Authors(authors))
            }
        };

        let page = self.page_of(&filter, page_number).await?;
        debug!(
            total = page.meta.total_count,
            returned = page.len(),
            "feed composed"
        );
        Ok(Feed { scope, page })
    }

    /// Rendered global feed, served from the response cache while fresh.
    ///
    /// The cache key ignores `page_number`: within one TTL window every page
    /// request gets whatever rendering filled the slot first.
    pub async fn render_global(&self, page_number: u32) -> Result<String, DomainError> {
        let this = self;
        get_or_compute(
            self.cache.as_ref(),
            GLOBAL_FEED_CACHE_KEY,
            self.settings.cache_ttl(),
            move || async move {
                let feed = this.compose_feed(FeedMode::Global, None, page_number).await?;
                serde_json::to_string(&feed).map_err(|e| DomainError::Internal(e.to_string()))
            },
        )
        .await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    async fn group_by_slug(&self, slug: &str) -> Result<Group, DomainError> {
        if !is_valid_slug(slug) {
            return Err(DomainError::GroupNotFound(slug.to_string()));
        }
        self.groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::GroupNotFound(slug.to_string()))
    }

    async fn page_of(&self, filter: &PostFilter, page_number: u32) -> Result<Page<Post>, DomainError> {
        if matches!(filter, PostFilter::Authors(authors) if authors.is_empty()) {
            let window = PageWindow::new(0, self.settings.page_size, page_number);
            return Ok(Page::new(Vec::new(), window.meta));
        }

        let total = self.posts.count(filter).await?;
        let window = PageWindow::new(total, self.settings.page_size, page_number);
        let items = if window.is_empty() {
            Vec::new()
        } else {
            self.posts.list(filter, window.limit, window.offset).await?
        };
        Ok(Page::new(items, window.meta))
    }
}
