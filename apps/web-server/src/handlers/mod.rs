//! HTTP handlers and route configuration.

mod auth;
mod health;
mod oauth;
mod pages;
mod posts;
mod views;

#[cfg(test)]
mod tests;

use actix_web::http::header;
use actix_web::{HttpResponse, HttpResponseBuilder, web};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/health", web::get().to(health::health_check))
        .route("/about", web::get().to(pages::about))
        .route("/contact", web::get().to(pages::contact))
        // Posts
        .route("/", web::get().to(posts::feed))
        .service(
            web::resource("/compose")
                .route(web::get().to(posts::compose_form))
                .route(web::post().to(posts::compose)),
        )
        .route("/posts/{id}", web::get().to(posts::show))
        .service(
            web::resource("/posts/{id}/edit")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit)),
        )
        .route("/posts/{id}/delete", web::post().to(posts::delete))
        // Accounts
        .service(
            web::resource("/register")
                .route(web::get().to(auth::register_form))
                .route(web::post().to(auth::register)),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_form))
                .route(web::post().to(auth::login)),
        )
        .route("/logout", web::get().to(auth::logout))
        // Google sign-in
        .service(
            web::scope("/auth/google")
                .route("", web::get().to(oauth::google_start))
                .route("/callback", web::get().to(oauth::google_callback)),
        );
}

/// `303 See Other` to `location`; callers may attach cookies before finishing.
fn see_other(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location.to_string()));
    builder
}
