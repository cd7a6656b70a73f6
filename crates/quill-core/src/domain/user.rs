use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - represents an account that can author posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    /// Argon2 PHC string. `None` for accounts created through an identity provider.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user that signs in with a username and password.
    pub fn new(email: String, username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash: Some(password_hash),
            google_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a user from a Google profile on first sign-in.
    pub fn from_google(email: String, username: String, google_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash: None,
            google_id: Some(google_id),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the provider-owned fields on a repeat Google sign-in.
    pub fn link_google(&mut self, google_id: String, username: String) {
        self.google_id = Some(google_id);
        self.username = username;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new(
            "ada@example.com".to_string(),
            "ada".to_string(),
            "$argon2id$v=19$secret".to_string(),
        );

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "ada");
    }

    #[test]
    fn test_link_google_refreshes_profile_fields() {
        let mut user = User::new(
            "ada@example.com".to_string(),
            "ada".to_string(),
            "hash".to_string(),
        );
        let created = user.created_at;

        user.link_google("g-1".to_string(), "Ada Lovelace".to_string());

        assert_eq!(user.google_id.as_deref(), Some("g-1"));
        assert_eq!(user.username, "Ada Lovelace");
        assert!(user.password_hash.is_some());
        assert_eq!(user.created_at, created);
        assert!(user.updated_at >= created);
    }
}
