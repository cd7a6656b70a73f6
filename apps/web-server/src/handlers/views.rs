//! Domain to view-model conversions shared by the page handlers.

use actix_web::HttpRequest;
use actix_web::http::header;

use quill_core::domain::Post;
use quill_shared::dto::{PageContext, PostView};

use crate::middleware::auth::Identity;

const MOBILE_MARKERS: [&str; 4] = ["Mobi", "Android", "iPhone", "iPod"];

pub fn post_view(post: Post) -> PostView {
    PostView {
        id: post.id.to_string(),
        title: post.title,
        content: post.content,
        author_id: post.author_id.map(|id| id.to_string()),
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
    }
}

pub fn page_context(identity: Option<&Identity>, req: &HttpRequest) -> PageContext {
    PageContext {
        current_user: identity.map(Identity::current_user),
        is_mobile: is_mobile(req),
    }
}

/// User-Agent sniffing, good enough to pick a layout.
pub fn is_mobile(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| MOBILE_MARKERS.iter().any(|m| ua.contains(m)))
        .unwrap_or(false)
}
