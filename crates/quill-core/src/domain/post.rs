use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a user-authored entry shown in the feed and on its permalink page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id: Some(author_id),
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` owns this post. Posts without an author belong to nobody.
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == Some(user_id)
    }

    /// Replace title and content. `created_at` never changes.
    pub fn revise(&mut self, title: String, content: String) {
        self.title = title;
        self.content = content;
        self.updated_at = Utc::now();
    }
}
