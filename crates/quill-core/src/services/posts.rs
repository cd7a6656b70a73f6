use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Page, PageRequest, Post, PostFilter, SearchTerm};
use crate::error::{DomainError, RepoError};
use crate::ports::PostRepository;

/// Post use cases: the personal feed plus author-guarded mutations.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// One page of `author_id`'s posts, newest first, optionally narrowed by title.
    pub async fn feed(
        &self,
        author_id: Uuid,
        request: PageRequest,
        search: Option<SearchTerm>,
    ) -> Result<Page<Post>, DomainError> {
        let filter = PostFilter::by_author(author_id).with_search(search);

        let items = self
            .posts
            .find_page(&filter, request.offset(), request.limit())
            .await?;
        let total = self.posts.count(&filter).await?;

        Ok(Page::new(items, request, total))
    }

    pub async fn compose(
        &self,
        author_id: Uuid,
        title: String,
        content: String,
    ) -> Result<Post, DomainError> {
        let title = validate_title(title)?;
        let post = self.posts.insert(Post::new(author_id, title, content)).await?;

        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");
        Ok(post)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// The post, but only if `user_id` wrote it. Anything else reads as not found.
    pub async fn get_authored(&self, id: Uuid, user_id: Uuid) -> Result<Post, DomainError> {
        match self.posts.find_by_id(id).await? {
            Some(post) if post.is_authored_by(user_id) => Ok(post),
            Some(_) => {
                tracing::warn!(post_id = %id, user_id = %user_id, "Rejected access by non-author");
                Err(not_found(id))
            }
            None => Err(not_found(id)),
        }
    }

    pub async fn revise(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: String,
        content: String,
    ) -> Result<Post, DomainError> {
        let title = validate_title(title)?;
        let mut post = self.get_authored(id, user_id).await?;
        post.revise(title, content);

        self.posts.update(post).await.map_err(|e| match e {
            RepoError::NotFound => not_found(id),
            other => other.into(),
        })
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        self.get_authored(id, user_id).await?;

        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => not_found(id),
            other => other.into(),
        })?;

        tracing::info!(post_id = %id, "Deleted post");
        Ok(())
    }
}

fn not_found(id: Uuid) -> DomainError {
    DomainError::NotFound {
        entity_type: "Post",
        id,
    }
}

fn validate_title(title: String) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::Validation("Title is required".to_string()));
    }
    Ok(title.to_string())
}
