use crate::application::feed_service::{FeedMode, FeedService};
use crate::application::pagination::parse_page_number;
use crate::domain::error::DomainError;
use crate::presentation::dto::PageQuery;
use crate::presentation::utils::{AuthenticatedUser, Viewer, request_id};
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::info;

#[get("/posts")]
pub async fn index(
    req: HttpRequest,
    feed: web::Data<FeedService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = parse_page_number(query.page.as_deref());
    let body = feed.render_global(page).await?;

    info!(request_id = %request_id(&req), page, "global feed served");

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

#[get("/groups/{slug}/posts")]
pub async fn group_posts(
    req: HttpRequest,
    feed: web::Data<FeedService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let slug = path.into_inner();
    let page = parse_page_number(query.page.as_deref());
    let result = feed
        .compose_feed(FeedMode::ByGroup(slug.clone()), None, page)
        .await?;

    info!(request_id = %request_id(&req), slug = %slug, page, "group feed served");

    Ok(HttpResponse::Ok().json(result))
}

#[get("/profiles/{username}/posts")]
pub async fn profile(
    req: HttpRequest,
    viewer: Viewer,
    feed: web::Data<FeedService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let username = path.into_inner();
    let page = parse_page_number(query.page.as_deref());
    let result = feed
        .compose_feed(FeedMode::ByAuthor(username.clone()), viewer.id(), page)
        .await?;

    info!(request_id = %request_id(&req), author = %username, page, "profile feed served");

    Ok(HttpResponse::Ok().json(result))
}

#[get("/follow/posts")]
pub async fn follow_index(
    req: HttpRequest,
    user: AuthenticatedUser,
    feed: web::Data<FeedService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = parse_page_number(query.page.as_deref());
    let result = feed
        .compose_feed(FeedMode::BySubscriptions, Some(user.id), page)
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        page,
        "subscription feed served"
    );

    Ok(HttpResponse::Ok().json(result))
}
