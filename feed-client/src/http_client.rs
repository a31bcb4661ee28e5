use crate::FeedApi;
use crate::error::FeedClientError;
use crate::models::{Comment, Feed, FollowResponse, Post, PostDetail, PostInput};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_TOKEN_FILE: &str = ".feed_token";

#[derive(Clone)]
pub struct FeedClientHttp {
    client: Arc<Client>,
    base_url: String,
    token: Option<String>,
    token_file: PathBuf,
}

impl FeedClientHttp {
    pub fn connect(endpoint: &str) -> Result<Self, FeedClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client: Arc::new(Client::builder().build()?),
            base_url,
            token: None,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
        })
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    /// Keeps the token for this client and persists it for later runs.
    pub fn set_token(&mut self, token: String) -> Result<(), FeedClientError> {
        fs::write(&self.token_file, &token)?;
        self.token = Some(token);
        Ok(())
    }

    /// In-memory token first, then the token file. No token means anonymous.
    pub fn token(&self) -> Result<Option<String>, FeedClientError> {
        if let Some(t) = self.token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(Some(t.clone()));
        }
        match fs::read_to_string(&self.token_file) {
            Ok(t) => {
                let t = t.trim().to_string();
                Ok((!t.is_empty()).then_some(t))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, FeedClientError> {
        match self.token()? {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| FeedClientError::Unauthorized)?;
                Ok(req.header(AUTHORIZATION, value))
            }
            None => Ok(req),
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, FeedClientError> {
        let resp = self.authorized(req)?.send().await?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(FeedClientError::from_http_response(resp).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, FeedClientError> {
        Ok(self.send(req).await?.json().await?)
    }

    async fn feed_at(&self, path: &str, page: u32) -> Result<Feed, FeedClientError> {
        let req = self
            .client
            .get(self.url(path))
            .query(&[("page", page)]);
        self.send_json(req).await
    }
}

#[async_trait(?Send)]
impl FeedApi for FeedClientHttp {
    async fn global_feed(&self, page: u32) -> Result<Feed, FeedClientError> {
        self.feed_at("/posts", page).await
    }

    async fn group_feed(&self, slug: &str, page: u32) -> Result<Feed, FeedClientError> {
        self.feed_at(&format!("/groups/{slug}/posts"), page).await
    }

    async fn profile_feed(&self, username: &str, page: u32) -> Result<Feed, FeedClientError> {
        self.feed_at(&format!("/profiles/{username}/posts"), page)
            .await
    }

    async fn subscription_feed(&self, page: u32) -> Result<Feed, FeedClientError> {
        self.feed_at("/follow/posts", page).await
    }

    async fn follow(&self, username: &str) -> Result<FollowResponse, FeedClientError> {
        let req = self
            .client
            .post(self.url(&format!("/profiles/{username}/follow")));
        self.send_json(req).await
    }

    async fn unfollow(&self, username: &str) -> Result<FollowResponse, FeedClientError> {
        let req = self
            .client
            .delete(self.url(&format!("/profiles/{username}/follow")));
        self.send_json(req).await
    }

    async fn get_post(&self, id: i64) -> Result<PostDetail, FeedClientError> {
        let req = self.client.get(self.url(&format!("/posts/{id}")));
        self.send_json(req).await
    }

    async fn create_post(&self, input: PostInput) -> Result<Post, FeedClientError> {
        if input.text.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Err(FeedClientError::InvalidRequest(
                "post text must not be empty".into(),
            ));
        }
        let req = self.client.post(self.url("/posts")).json(&input);
        self.send_json(req).await
    }

    async fn update_post(&self, id: i64, input: PostInput) -> Result<Post, FeedClientError> {
        let req = self
            .client
            .put(self.url(&format!("/posts/{id}")))
            .json(&input);
        self.send_json(req).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), FeedClientError> {
        let req = self.client.delete(self.url(&format!("/posts/{id}")));
        self.send(req).await?;
        Ok(())
    }

    async fn add_comment(&self, post_id: i64, text: String) -> Result<Comment, FeedClientError> {
        let req = self
            .client
            .post(self.url(&format!("/posts/{post_id}/comments")))
            .json(&serde_json::json!({ "text": text }));
        self.send_json(req).await
    }
}
