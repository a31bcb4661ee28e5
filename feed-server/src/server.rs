use std::sync::Arc;

use crate::application::feed_service::FeedService;
use crate::application::follow_service::FollowService;
use crate::application::post_service::PostService;
use crate::data::comment_repository::CommentRepository;
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::cache::ResponseCache;
use crate::infrastructure::config::{AppConfig, FeedSettings};
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers;
use crate::presentation::middleware::{IdentityMiddleware, log_requests, set_request_context};
use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger, from_fn};
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Storage handles the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub users: Arc<dyn UserRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

/// Everything a request handler may reach through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
    pub follows: FollowService,
    pub posts: PostService,
    pub users: Arc<dyn UserRepository>,
    pub keys: JwtKeys,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        cache: Arc<dyn ResponseCache>,
        settings: FeedSettings,
        keys: JwtKeys,
    ) -> Self {
        let feed = FeedService::new(
            Arc::clone(&repos.posts),
            Arc::clone(&repos.groups),
            Arc::clone(&repos.users),
            Arc::clone(&repos.follows),
            cache,
            settings,
        );
        let follows = FollowService::new(Arc::clone(&repos.follows), Arc::clone(&repos.users));
        let posts = PostService::new(
            Arc::clone(&repos.posts),
            Arc::clone(&repos.groups),
            Arc::clone(&repos.comments),
        );

        Self {
            feed,
            follows,
            posts,
            users: repos.users,
            keys,
        }
    }
}

/// Registers app data and the `/api` routes.
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(state.feed))
            .app_data(web::Data::new(state.follows))
            .app_data(web::Data::new(state.posts))
            .app_data(web::Data::from(state.users))
            .service(
                web::scope("/api")
                    .wrap(IdentityMiddleware::new(state.keys))
                    .route("/health", web::get().to(health))
                    .service(handlers::feed::index)
                    .service(handlers::feed::group_posts)
                    .service(handlers::feed::profile)
                    .service(handlers::feed::follow_index)
                    .service(handlers::follow::follow)
                    .service(handlers::follow::unfollow)
                    .service(handlers::post::create_post)
                    .service(handlers::post::get_post)
                    .service(handlers::post::update_post)
                    .service(handlers::post::delete_post)
                    .service(handlers::post::add_comment),
            );
    }
}

pub async fn start_rest_server(config: AppConfig, state: AppState) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    info!(host = %bind_address.0, port = bind_address.1, "HTTP server starting");

    HttpServer::new(move || {
        let cors = build_cors(&config);

        App::new()
            .wrap(Logger::default())
            .wrap(from_fn(log_requests))
            .wrap(from_fn(set_request_context))
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .configure(configure(state.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
