use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("group not found: {0}")]
    GroupNotFound(String),
    #[error("author not found: {0}")]
    AuthorNotFound(String),
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("post not found: {0}")]
    PostNotFound(i64),
    #[error("users cannot follow themselves")]
    SelfFollowRejected,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("forbidden")]
    Forbidden,
    #[error("unauthorized")]
    Unauthorized,
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::GroupNotFound(_)
                | DomainError::AuthorNotFound(_)
                | DomainError::UserNotFound(_)
                | DomainError::PostNotFound(_)
        )
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            DomainError::SelfFollowRejected => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // store errors are logged where they occur, never echoed to clients
        let message = match self {
            DomainError::Store(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        let details = match self {
            DomainError::GroupNotFound(slug) => Some(json!({ "group": slug })),
            DomainError::AuthorNotFound(username) => Some(json!({ "author": username })),
            DomainError::UserNotFound(id) => Some(json!({ "user": id })),
            DomainError::PostNotFound(id) => Some(json!({ "post": id })),
            DomainError::Forbidden => {
                Some(json!({ "message": "only the author may change this post" }))
            }
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_family_maps_to_404() {
        let errors = [
            DomainError::GroupNotFound("missing".into()),
            DomainError::AuthorNotFound("nobody".into()),
            DomainError::PostNotFound(7),
        ];
        for err in errors {
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn relationship_and_auth_errors_have_distinct_statuses() {
        assert_eq!(
            DomainError::SelfFollowRejected.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(DomainError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(DomainError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            DomainError::InvalidInput("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
