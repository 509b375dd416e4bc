use serde::{Deserialize, Serialize};

/// Authenticated user as returned by the auth backend and persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}
