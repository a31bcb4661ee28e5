use std::sync::Arc;

use feed_server::data::comment_repository::PostgresCommentRepository;
use feed_server::data::follow_repository::PostgresFollowRepository;
use feed_server::data::group_repository::PostgresGroupRepository;
use feed_server::data::post_repository::PostgresPostRepository;
use feed_server::data::user_repository::PostgresUserRepository;
use feed_server::infrastructure::cache::TtlCache;
use feed_server::infrastructure::clock::SystemClock;
use feed_server::infrastructure::config::AppConfig;
use feed_server::infrastructure::database::{create_pool, run_migrations};
use feed_server::infrastructure::logging::init_logging;
use feed_server::infrastructure::security::JwtKeys;
use feed_server::server::{AppState, Repositories, start_rest_server};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(config.log_format);

    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;

    let repos = Repositories {
        posts: Arc::new(PostgresPostRepository::new(pool.clone())),
        groups: Arc::new(PostgresGroupRepository::new(pool.clone())),
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
        follows: Arc::new(PostgresFollowRepository::new(pool.clone())),
    };
    let cache = Arc::new(TtlCache::new(Arc::new(SystemClock)));
    let state = AppState::new(
        repos,
        cache,
        config.feed,
        JwtKeys::new(config.jwt_secret.clone()),
    );

    start_rest_server(config, state).await
}
