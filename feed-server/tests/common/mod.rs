#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use feed_server::data::group_repository::GroupRepository;
use feed_server::data::memory::MemoryStore;
use feed_server::data::user_repository::UserRepository;
use feed_server::domain::group::{Group, NewGroup};
use feed_server::domain::post::{NewPost, Post};
use feed_server::domain::user::User;
use feed_server::infrastructure::cache::TtlCache;
use feed_server::infrastructure::clock::ManualClock;
use feed_server::infrastructure::config::FeedSettings;
use feed_server::infrastructure::security::JwtKeys;
use feed_server::server::{AppState, Repositories};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<TtlCache>,
    pub keys: JwtKeys,
    pub state: AppState,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_settings(FeedSettings::default())
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self::with_settings(FeedSettings {
            page_size,
            ..FeedSettings::default()
        })
    }

    pub fn with_settings(settings: FeedSettings) -> Self {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let store = Arc::new(MemoryStore::new(clock.clone()));
        let cache = Arc::new(TtlCache::new(clock.clone()));
        let keys = JwtKeys::new(JWT_SECRET.to_string());

        let repos = Repositories {
            posts: store.clone(),
            groups: store.clone(),
            users: store.clone(),
            comments: store.clone(),
            follows: store.clone(),
        };
        let state = AppState::new(repos, cache.clone(), settings, keys.clone());

        Self {
            store,
            clock,
            cache,
            keys,
            state,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        UserRepository::create(self.store.as_ref(), User::new(Uuid::new_v4(), username))
            .await
            .unwrap()
    }

    pub async fn group(&self, slug: &str) -> Group {
        GroupRepository::create(
            self.store.as_ref(),
            NewGroup::new(format!("Group {slug}"), slug, "test group"),
        )
        .await
        .unwrap()
    }

    /// Creates a post and moves the clock one second forward.
    pub async fn post(&self, author: &User, text: &str) -> Post {
        self.create(NewPost::new(author.id, text)).await
    }

    pub async fn group_post(&self, author: &User, group: &Group, text: &str) -> Post {
        self.create(NewPost::new(author.id, text).in_group(group.id))
            .await
    }

    pub async fn posts(&self, author: &User, count: usize) -> Vec<Post> {
        let mut created = Vec::with_capacity(count);
        for i in 0..count {
            created.push(
                self.post(author, &format!("post {i} by {} with enough text", author.username))
                    .await,
            );
        }
        created
    }

    async fn create(&self, post: NewPost) -> Post {
        let created = self.state.posts.create_post(post).await.unwrap();
        self.clock.advance(Duration::seconds(1));
        created
    }

    pub fn token_for(&self, user: &User) -> String {
        self.keys.generate_token(user.id, Duration::hours(1)).unwrap()
    }
}
