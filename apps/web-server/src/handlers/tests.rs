use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::Value;

use quill_core::ports::{AuthError, AuthorizationRequest, IdentityProvider, OAuthProfile};
use quill_shared::dto::{LoginForm, PostForm, RegisterForm};

use super::configure_routes;
use crate::config::SessionConfig;
use crate::session::{OAUTH_STATE_COOKIE, SESSION_COOKIE};
use crate::state::AppState;

const PASSWORD: &str = "correct horse";

fn state() -> AppState {
    AppState::in_memory(&SessionConfig {
        secret: Some("test-secret-test-secret-test-secret!".to_string()),
        ..SessionConfig::default()
    })
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_routes),
        )
        .await
    };
}

fn location<B>(res: &ServiceResponse<B>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn cookie<B>(res: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

fn register_form(username: &str) -> RegisterForm {
    RegisterForm {
        email: format!("{username}@example.com"),
        username: username.to_string(),
        password: PASSWORD.to_string(),
    }
}

fn post_form(title: &str) -> PostForm {
    PostForm {
        title: title.to_string(),
        body: format!("Body of {title}"),
    }
}

/// Register `username` and return its session cookie.
macro_rules! sign_up {
    ($app:expr, $username:expr) => {{
        let req = test::TestRequest::post()
            .uri("/register")
            .set_form(register_form($username))
            .to_request();
        let res = test::call_service(&$app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/");
        cookie(&res, SESSION_COOKIE).expect("session cookie")
    }};
}

macro_rules! compose {
    ($app:expr, $session:expr, $title:expr) => {{
        let req = test::TestRequest::post()
            .uri("/compose")
            .cookie($session.clone())
            .set_form(post_form($title))
            .to_request();
        let res = test::call_service(&$app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }};
}

macro_rules! get_json {
    ($app:expr, $session:expr, $uri:expr) => {{
        let req = test::TestRequest::get()
            .uri($uri)
            .cookie($session.clone())
            .to_request();
        let res = test::call_service(&$app, req).await;
        assert_eq!(res.status(), StatusCode::OK, "GET {}", $uri);
        let body: Value = test::read_body_json(res).await;
        body["data"].clone()
    }};
}

fn titles(feed: &Value) -> Vec<String> {
    feed["posts"]
        .as_array()
        .map(|posts| {
            posts
                .iter()
                .filter_map(|p| p["title"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[actix_web::test]
async fn test_feed_requires_login() {
    let app = app!(state());

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[actix_web::test]
async fn test_register_then_feed_shows_current_user() {
    let app = app!(state());
    let session = sign_up!(app, "ada");

    let feed = get_json!(app, session, "/");

    assert_eq!(feed["current_user"]["username"], "ada");
    assert_eq!(feed["current_page"], 1);
    assert_eq!(feed["total_pages"], 0);
    assert!(titles(&feed).is_empty());
}

#[actix_web::test]
async fn test_duplicate_registration_redirects_back() {
    let app = app!(state());
    sign_up!(app, "ada");

    let req = test::TestRequest::post()
        .uri("/register")
        .set_form(register_form("ada"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/register");
    assert!(cookie(&res, SESSION_COOKIE).is_none());
}

#[actix_web::test]
async fn test_login_with_wrong_password_redirects_to_login() {
    let app = app!(state());
    sign_up!(app, "ada");

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form(LoginForm {
            username: "ada".to_string(),
            password: "wrong password".to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form(LoginForm {
            username: "ada".to_string(),
            password: PASSWORD.to_string(),
        })
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(location(&res), "/");
    assert!(cookie(&res, SESSION_COOKIE).is_some());
}

#[actix_web::test]
async fn test_feed_paginates_newest_first() {
    let app = app!(state());
    let session = sign_up!(app, "ada");

    for i in 1..=5 {
        compose!(app, session, &format!("Post {i}"));
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let first = get_json!(app, session, "/");
    assert_eq!(titles(&first), vec!["Post 5", "Post 4", "Post 3", "Post 2"]);
    assert_eq!(first["total_pages"], 2);
    assert_eq!(first["page_numbers"], serde_json::json!([1, 2]));

    let second = get_json!(app, session, "/?page=2");
    assert_eq!(titles(&second), vec!["Post 1"]);

    let beyond = get_json!(app, session, "/?page=7");
    assert!(titles(&beyond).is_empty());
    assert_eq!(beyond["current_page"], 7);

    let garbage = get_json!(app, session, "/?page=abc");
    assert_eq!(garbage["current_page"], 1);

    let huge = get_json!(app, session, "/?page=9223372036854775807");
    assert!(titles(&huge).is_empty());
    assert_eq!(huge["current_page"], quill_core::domain::MAX_PAGE);
}

#[actix_web::test]
async fn test_feed_only_lists_own_posts_and_searches_literally() {
    let app = app!(state());
    let ada = sign_up!(app, "ada");
    let bob = sign_up!(app, "bob");

    compose!(app, ada, "Rust tips");
    compose!(app, ada, "100% done");
    compose!(app, ada, "Cooking");
    compose!(app, bob, "Rust for Bob");

    let feed = get_json!(app, ada, "/?search=rust");
    assert_eq!(titles(&feed), vec!["Rust tips"]);
    assert_eq!(feed["search"], "rust");

    let feed = get_json!(app, ada, "/?search=%25");
    assert_eq!(titles(&feed), vec!["100% done"]);

    let feed = get_json!(app, ada, "/?search=.*");
    assert!(titles(&feed).is_empty());

    let feed = get_json!(app, ada, "/?search=%20%20");
    assert_eq!(titles(&feed).len(), 3);
    assert!(feed["search"].is_null());
}

#[actix_web::test]
async fn test_compose_rejects_blank_title() {
    let app = app!(state());
    let session = sign_up!(app, "ada");

    let req = test::TestRequest::post()
        .uri("/compose")
        .cookie(session.clone())
        .set_form(post_form("   "))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_show_post_is_public_and_404s_cleanly() {
    let app = app!(state());
    let session = sign_up!(app, "ada");
    compose!(app, session, "Hello");

    let feed = get_json!(app, session, "/");
    let id = feed["posts"][0]["id"].as_str().unwrap().to_string();

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/posts/{id}")).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["post"]["title"], "Hello");
    assert!(body["data"]["current_user"].is_null());

    for uri in ["/posts/not-a-uuid", "/posts/00000000-0000-0000-0000-000000000000"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["detail"], "Post not found.");
    }
}

#[actix_web::test]
async fn test_only_the_author_can_edit_or_delete() {
    let app = app!(state());
    let ada = sign_up!(app, "ada");
    let bob = sign_up!(app, "bob");
    compose!(app, ada, "Original");

    let feed = get_json!(app, ada, "/");
    let id = feed["posts"][0]["id"].as_str().unwrap().to_string();

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{id}/edit"))
            .cookie(bob.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["detail"], "Post not found or unauthorized.");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{id}/edit"))
            .cookie(bob.clone())
            .set_form(post_form("Hijacked"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{id}/delete"))
            .cookie(bob.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let post = get_json!(app, ada, &format!("/posts/{id}"));
    assert_eq!(post["post"]["title"], "Original");

    // The author can
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{id}/edit"))
            .cookie(ada.clone())
            .set_form(post_form("Revised"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/posts/{id}"));

    let post = get_json!(app, ada, &format!("/posts/{id}"));
    assert_eq!(post["post"]["title"], "Revised");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{id}/delete"))
            .cookie(ada.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/posts/{id}")).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_logout_invalidates_session() {
    let app = app!(state());
    let session = sign_up!(app, "ada");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/logout")
            .cookie(session.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    // Replaying the old cookie no longer authenticates
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(session).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[actix_web::test]
async fn test_static_pages_detect_mobile() {
    let app = app!(state());

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/about")
            .insert_header((header::USER_AGENT, "Mozilla/5.0 (Linux; Android 14) Mobile"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["title"], "About");
    assert_eq!(body["data"]["is_mobile"], true);

    let res = test::call_service(&app, test::TestRequest::get().uri("/contact").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["is_mobile"], false);
    assert!(
        body["data"]["content"]
            .as_str()
            .unwrap()
            .starts_with("Scelerisque")
    );
}

#[actix_web::test]
async fn test_health() {
    let app = app!(state());

    let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "in_memory");
}

struct FakeGoogle;

#[async_trait]
impl IdentityProvider for FakeGoogle {
    fn authorization_request(&self) -> Result<AuthorizationRequest, AuthError> {
        Ok(AuthorizationRequest {
            url: "https://accounts.example.com/auth?state=csrf-1".to_string(),
            state: "csrf-1".to_string(),
            verifier: "verifier-1".to_string(),
        })
    }

    async fn exchange(&self, code: &str, verifier: &str) -> Result<OAuthProfile, AuthError> {
        if code != "good-code" || verifier != "verifier-1" {
            return Err(AuthError::Provider("bad grant".to_string()));
        }
        Ok(OAuthProfile {
            provider_id: "g-1".to_string(),
            email: "grace@example.com".to_string(),
            display_name: "Grace".to_string(),
        })
    }
}

#[actix_web::test]
async fn test_google_sign_in_unavailable_when_unconfigured() {
    let app = app!(state());

    let res = test::call_service(&app, test::TestRequest::get().uri("/auth/google").to_request()).await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_google_sign_in_flow() {
    let app = app!(state().with_identity_provider(Arc::new(FakeGoogle)));

    let res = test::call_service(&app, test::TestRequest::get().uri("/auth/google").to_request()).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(location(&res).starts_with("https://accounts.example.com/"));
    let oauth_cookie = cookie(&res, OAUTH_STATE_COOKIE).expect("oauth state cookie");

    // Another browser cannot complete the flow
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/auth/google/callback?code=good-code&state=csrf-1")
            .to_request(),
    )
    .await;
    assert_eq!(location(&res), "/login");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/auth/google/callback?code=good-code&state=csrf-1")
            .cookie(oauth_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    let session = cookie(&res, SESSION_COOKIE).expect("session cookie");

    let feed = get_json!(app, session, "/");
    assert_eq!(feed["current_user"]["email"], "grace@example.com");
    assert_eq!(feed["current_user"]["username"], "Grace");

    // State is single use
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/auth/google/callback?code=good-code&state=csrf-1")
            .cookie(oauth_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(location(&res), "/login");
}

#[actix_web::test]
async fn test_google_callback_with_provider_error_redirects_to_login() {
    let app = app!(state().with_identity_provider(Arc::new(FakeGoogle)));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/auth/google/callback?error=access_denied")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}
