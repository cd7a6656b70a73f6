//! Static pages.

use actix_web::{HttpRequest, HttpResponse};

use quill_shared::ApiResponse;
use quill_shared::dto::StaticPageView;

use super::views::page_context;
use crate::middleware::auth::OptionalIdentity;

const ABOUT_CONTENT: &str = "Hac habitasse platea dictumst vestibulum rhoncus est pellentesque. Dictumst vestibulum rhoncus est pellentesque elit ullamcorper. Non diam phasellus vestibulum lorem sed. Platea dictumst quisque sagittis purus sit. Egestas sed sed risus pretium quam vulputate dignissim suspendisse. Mauris in aliquam sem fringilla. Semper risus in hendrerit gravida rutrum quisque non tellus orci. Amet massa vitae tortor condimentum lacinia quis vel eros. Enim ut tellus elementum sagittis vitae. Mauris ultrices eros in cursus turpis massa tincidunt dui.";

const CONTACT_CONTENT: &str = "Scelerisque eleifend donec pretium vulputate sapien. Rhoncus urna neque viverra justo nec ultrices. Arcu dui vivamus arcu felis bibendum. Consectetur adipiscing elit duis tristique. Risus viverra adipiscing at in tellus integer feugiat. Sapien nec sagittis aliquam malesuada bibendum arcu vitae. Consequat interdum varius sit amet mattis. Iaculis nunc sed augue lacus. Interdum posuere lorem ipsum dolor sit amet consectetur adipiscing elit. Pulvinar elementum integer enim neque. Ultrices gravida dictum fusce ut placerat orci nulla. Mauris in aliquam sem fringilla ut morbi tincidunt. Tortor posuere ac ut consequat semper viverra nam libero.";

fn render(title: &str, content: &str, identity: OptionalIdentity, req: &HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(StaticPageView {
        title: title.to_string(),
        content: content.to_string(),
        context: page_context(identity.0.as_ref(), req),
    }))
}

/// GET /about
pub async fn about(identity: OptionalIdentity, req: HttpRequest) -> HttpResponse {
    render("About", ABOUT_CONTENT, identity, &req)
}

/// GET /contact
pub async fn contact(identity: OptionalIdentity, req: HttpRequest) -> HttpResponse {
    render("Contact", CONTACT_CONTENT, identity, &req)
}
