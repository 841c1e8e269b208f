use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription::EventCountRepo,
};

impl PostgresPersistence {
    async fn count(&self, query: &str, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }
}

/// Usage counts are derived on demand; nothing here is cached or stored.
#[async_trait]
impl EventCountRepo for PostgresPersistence {
    async fn events_created(&self, user_id: Uuid) -> AppResult<i64> {
        self.count(
            r#"
            SELECT COUNT(*) FROM events
            WHERE owner_id = $1 AND archived_at IS NULL AND cancelled_at IS NULL
            "#,
            user_id,
        )
        .await
    }

    async fn events_joined(&self, user_id: Uuid) -> AppResult<i64> {
        self.count(
            "SELECT COUNT(*) FROM event_attendees WHERE user_id = $1",
            user_id,
        )
        .await
    }

    async fn ai_insights_used(&self, user_id: Uuid) -> AppResult<i64> {
        self.count(
            "SELECT COUNT(*) FROM ai_insights WHERE user_id = $1",
            user_id,
        )
        .await
    }

    async fn ai_chat_used(&self, user_id: Uuid) -> AppResult<i64> {
        self.count(
            "SELECT COUNT(*) FROM ai_chat_messages WHERE user_id = $1",
            user_id,
        )
        .await
    }

    async fn invites_sent(&self, user_id: Uuid) -> AppResult<i64> {
        self.count(
            "SELECT COUNT(*) FROM event_invitations WHERE user_id = $1",
            user_id,
        )
        .await
    }
}
