use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminates user-facing rows from admin-facing rows in the single
/// notifications table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_scope", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationScope {
    User,
    Admin,
}

impl NotificationScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationScope::User => "user",
            NotificationScope::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub scope: NotificationScope,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub metadata: serde_json::Value,
    pub read_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}
