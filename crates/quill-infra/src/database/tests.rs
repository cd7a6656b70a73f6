use std::collections::BTreeMap;
use std::sync::Arc;

use sea_orm::{DatabaseBackend, EntityTrait, MockDatabase, MockExecResult, QueryFilter, QueryTrait};
use uuid::Uuid;

use quill_core::domain::{Post, PostFilter, SearchTerm, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{
    PostgresPostRepository, PostgresUserRepository, post_condition,
};

fn post_model(author_id: Uuid, title: &str) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id: Uuid::new_v4(),
        author_id: Some(author_id),
        title: title.to_owned(),
        content: "Content".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let model = post_model(Uuid::new_v4(), "Test Post");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
}

#[tokio::test]
async fn test_find_page_maps_rows() {
    let author = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            post_model(author, "newest"),
            post_model(author, "older"),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));
    let posts = repo
        .find_page(&PostFilter::by_author(author), 0, 4)
        .await
        .unwrap();

    let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["newest", "older"]);
    assert!(posts.iter().all(|p| p.author_id == Some(author)));
}

#[tokio::test]
async fn test_count_posts() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![BTreeMap::from([(
            "num_items",
            sea_orm::Value::BigInt(Some(9)),
        )])]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));
    let total = repo
        .count(&PostFilter::by_author(Uuid::new_v4()))
        .await
        .unwrap();

    assert_eq!(total, 9);
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_user_by_username() {
    let now = chrono::Utc::now();
    let model = user::Model {
        id: Uuid::new_v4(),
        email: "ada@example.com".to_owned(),
        username: "ada".to_owned(),
        password_hash: None,
        google_id: Some("g-42".to_owned()),
        created_at: now.into(),
        updated_at: now.into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresUserRepository::new(Arc::new(db));
    let user: User = repo.find_by_username("ada").await.unwrap().unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.google_id.as_deref(), Some("g-42"));
    assert!(user.password_hash.is_none());
}

#[test]
fn test_search_condition_is_escaped_like() {
    let filter = PostFilter::by_author(Uuid::new_v4()).with_search(SearchTerm::parse(Some("50%")));

    let sql = post::Entity::find()
        .filter(post_condition(&filter))
        .build(DatabaseBackend::Postgres)
        .to_string();

    assert!(sql.contains("\"author_id\" ="), "{sql}");
    assert!(sql.contains("LOWER(\"title\") LIKE"), "{sql}");
    assert!(sql.contains("ESCAPE"), "{sql}");
}
