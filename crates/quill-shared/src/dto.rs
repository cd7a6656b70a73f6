//! Data Transfer Objects - form bodies, query strings and page view models.

use serde::{Deserialize, Serialize};

/// `POST /compose` and `POST /posts/{id}/edit` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(rename = "postTitle")]
    pub title: String,
    #[serde(rename = "postBody", default)]
    pub body: String,
}

/// `POST /register` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// `POST /login` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `GET /` query string. `page` stays raw so malformed values fall back to page 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedQuery {
    pub page: Option<String>,
    pub search: Option<String>,
}

/// Query string Google appends to the callback URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// The signed-in user as exposed to pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields every page receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    pub current_user: Option<CurrentUser>,
    pub is_mobile: bool,
}

/// `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedView {
    pub posts: Vec<PostView>,
    pub current_page: u64,
    pub total_pages: u64,
    pub page_numbers: Vec<u64>,
    pub search: Option<String>,
    #[serde(flatten)]
    pub context: PageContext,
}

/// `GET /posts/{id}` and `GET /posts/{id}/edit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPageView {
    pub post: PostView,
    #[serde(flatten)]
    pub context: PageContext,
}

/// `GET /about` and `GET /contact`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticPageView {
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub context: PageContext,
}
