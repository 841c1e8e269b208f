//! Notification emitter over the single scope-tagged table.
//!
//! Emission is best-effort: a failed insert is logged and swallowed so it
//! never rolls back or fails the state transition that triggered it.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::notification::{Notification, NotificationScope},
};

#[derive(Debug, Clone)]
pub struct CreateNotificationInput {
    pub user_id: Uuid,
    pub scope: NotificationScope,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub metadata: serde_json::Value,
}

#[async_trait]
pub trait NotificationRepo: Send + Sync {
    async fn create(&self, input: &CreateNotificationInput) -> AppResult<Notification>;
    async fn list_for_user(
        &self,
        user_id: Uuid,
        scope: Option<NotificationScope>,
    ) -> AppResult<Vec<Notification>>;
    /// Marks the given rows read, scoped to the owning user. Returns the
    /// number of rows actually updated.
    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct NotificationUseCases {
    repo: Arc<dyn NotificationRepo>,
}

impl NotificationUseCases {
    pub fn new(repo: Arc<dyn NotificationRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        self.repo.list_for_user(user_id, None).await
    }

    pub async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        self.repo.mark_read(user_id, ids).await
    }

    /// Best-effort emit; failures are logged, never propagated.
    pub async fn emit(&self, input: CreateNotificationInput) {
        if let Err(err) = self.repo.create(&input).await {
            tracing::warn!(
                user_id = %input.user_id,
                kind = %input.kind,
                error = ?err,
                "Failed to insert notification"
            );
        }
    }

    pub async fn emit_user(&self, user_id: Uuid, kind: &str, title: &str, message: &str) {
        self.emit(CreateNotificationInput {
            user_id,
            scope: NotificationScope::User,
            kind: kind.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            metadata: serde_json::json!({}),
        })
        .await;
    }

    pub async fn emit_admin(&self, user_id: Uuid, kind: &str, title: &str, message: &str) {
        self.emit(CreateNotificationInput {
            user_id,
            scope: NotificationScope::Admin,
            kind: kind.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            metadata: serde_json::json!({}),
        })
        .await;
    }
}
