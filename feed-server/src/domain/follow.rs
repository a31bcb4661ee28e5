use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directed edge: `user_id` receives posts of `author_id` in their subscription feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: Uuid,
    pub author_id: Uuid,
}
