use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only projection of the users collection, which is owned by the
/// account-management side of the platform. The quiz engine only ever
/// looks users up; it never writes them.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
impl User {
    pub fn test_user(id: &str, name: &str) -> Self {
        User {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", id),
            created_at: Some(Utc::now()),
        }
    }
}
