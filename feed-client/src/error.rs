use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedClientError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Token file error: {0}")]
    TokenFile(#[from] std::io::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl FeedClientError {
    /// Maps a non-success response to an error, using the server's
    /// `{"error": ...}` body when it has one.
    pub async fn from_http_response(resp: reqwest::Response) -> Self {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Self::from_status(status, message)
    }

    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::InvalidRequest(message)
            }
            other => Self::Server {
                status: other.as_u16(),
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_variants() {
        assert!(matches!(
            FeedClientError::from_status(StatusCode::NOT_FOUND, "group not found: x".into()),
            FeedClientError::NotFound(m) if m == "group not found: x"
        ));
        assert!(matches!(
            FeedClientError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            FeedClientError::Unauthorized
        ));
        assert!(matches!(
            FeedClientError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "self".into()),
            FeedClientError::InvalidRequest(_)
        ));
        assert!(matches!(
            FeedClientError::from_status(StatusCode::BAD_GATEWAY, "down".into()),
            FeedClientError::Server { status: 502, .. }
        ));
    }
}
