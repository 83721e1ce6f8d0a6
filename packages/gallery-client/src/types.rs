//! Request and response payloads for the gallery API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope returned by `GET /me` and `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub user: ApiUser,
}

/// The user record as the server sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Body for `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Server-assigned notification identifier.
pub type NotificationId = i64;

/// A single entry of `GET /user/notifications`.
///
/// Only `id` and `isRead` are interpreted; every other field is carried
/// through untouched in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(default)]
    pub is_read: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Notification {
    pub fn new(id: NotificationId) -> Self {
        Self {
            id,
            is_read: false,
            fields: Map::new(),
        }
    }

    /// Attach a domain field (title, content, createdAt, ...).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
