//! Feed and post handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{PageRequest, SearchTerm};
use quill_shared::ApiResponse;
use quill_shared::dto::{FeedQuery, FeedView, PostForm, PostPageView};

use super::see_other;
use super::views::{page_context, post_view};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const POST_NOT_FOUND: &str = "Post not found.";
const POST_NOT_FOUND_OR_UNAUTHORIZED: &str = "Post not found or unauthorized.";

fn parse_post_id(raw: &str, message: &'static str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(message.to_string()))
}

/// GET / - the signed-in user's posts, paginated and optionally searched.
pub async fn feed(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    query: web::Query<FeedQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let request = PageRequest::parse(query.page.as_deref());
    let search = SearchTerm::parse(query.search.as_deref());

    let page = state
        .posts
        .feed(identity.user_id, request, search.clone())
        .await?;

    tracing::debug!(
        user_id = %identity.user_id,
        page = page.current_page,
        total = page.total_items,
        "Feed loaded"
    );

    let page_numbers = page.page_numbers();
    let view = FeedView {
        current_page: page.current_page,
        total_pages: page.total_pages,
        page_numbers,
        posts: page.items.into_iter().map(post_view).collect(),
        search: search.map(|s| s.as_str().to_string()),
        context: page_context(Some(&identity), &req),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(view)))
}

/// GET /compose
pub async fn compose_form(identity: Identity, req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(page_context(Some(&identity), &req)))
}

/// POST /compose
pub async fn compose(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let PostForm { title, body } = form.into_inner();
    state.posts.compose(identity.user_id, title, body).await?;

    Ok(see_other("/").finish())
}

/// GET /posts/{id} - public.
pub async fn show(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    req: HttpRequest,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path, POST_NOT_FOUND)?;
    let post = state
        .posts
        .get(id)
        .await
        .map_err(AppError::post(POST_NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostPageView {
        post: post_view(post),
        context: page_context(identity.0.as_ref(), &req),
    })))
}

/// GET /posts/{id}/edit - author only.
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path, POST_NOT_FOUND_OR_UNAUTHORIZED)?;
    let post = state
        .posts
        .get_authored(id, identity.user_id)
        .await
        .map_err(AppError::post(POST_NOT_FOUND_OR_UNAUTHORIZED))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostPageView {
        post: post_view(post),
        context: page_context(Some(&identity), &req),
    })))
}

/// POST /posts/{id}/edit - author only.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path, POST_NOT_FOUND_OR_UNAUTHORIZED)?;
    let PostForm { title, body } = form.into_inner();

    state
        .posts
        .revise(id, identity.user_id, title, body)
        .await
        .map_err(AppError::post(POST_NOT_FOUND_OR_UNAUTHORIZED))?;

    Ok(see_other(&format!("/posts/{id}")).finish())
}

/// POST /posts/{id}/delete - author only.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path, POST_NOT_FOUND_OR_UNAUTHORIZED)?;

    state
        .posts
        .delete(id, identity.user_id)
        .await
        .map_err(AppError::post(POST_NOT_FOUND_OR_UNAUTHORIZED))?;

    Ok(see_other("/").finish())
}
