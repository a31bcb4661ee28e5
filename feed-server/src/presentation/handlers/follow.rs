use crate::application::follow_service::FollowService;
use crate::domain::error::DomainError;
use crate::presentation::dto::FollowResponse;
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, delete, post, web};
use tracing::info;

#[post("/profiles/{username}/follow")]
pub async fn follow(
    req: HttpRequest,
    user: AuthenticatedUser,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let author = path.into_inner();
    let changed = follows.follow_username(user.id, &author).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        author = %author,
        changed,
        "follow requested"
    );

    Ok(HttpResponse::Ok().json(FollowResponse {
        author,
        following: true,
        changed,
    }))
}

#[delete("/profiles/{username}/follow")]
pub async fn unfollow(
    req: HttpRequest,
    user: AuthenticatedUser,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let author = path.into_inner();
    let changed = follows.unfollow_username(user.id, &author).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        author = %author,
        changed,
        "unfollow requested"
    );

    Ok(HttpResponse::Ok().json(FollowResponse {
        author,
        following: false,
        changed,
    }))
}
