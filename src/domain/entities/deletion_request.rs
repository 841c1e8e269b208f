use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State machine: pending -> {approved -> completed, denied}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "deletion_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeletionRequestStatus {
    Pending,
    Approved,
    Denied,
    Completed,
}

impl DeletionRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionRequestStatus::Pending => "pending",
            DeletionRequestStatus::Approved => "approved",
            DeletionRequestStatus::Denied => "denied",
            DeletionRequestStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountDeletionRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: DeletionRequestStatus,
    pub reason: Option<String>,
    pub scheduled_deletion_date: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}
