use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::notification::{CreateNotificationInput, NotificationRepo},
    domain::entities::notification::{Notification, NotificationScope},
};

fn row_to_notification(row: sqlx::postgres::PgRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        scope: row.get("scope"),
        kind: row.get("kind"),
        title: row.get("title"),
        message: row.get("message"),
        metadata: row.get("metadata"),
        read_at: row.get("read_at"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, scope, kind, title, message, metadata, read_at, created_at
"#;

#[async_trait]
impl NotificationRepo for PostgresPersistence {
    async fn create(&self, input: &CreateNotificationInput) -> AppResult<Notification> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO notifications (id, user_id, scope, kind, title, message, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(input.scope)
        .bind(&input.kind)
        .bind(&input.title)
        .bind(&input.message)
        .bind(&input.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_notification(row))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        scope: Option<NotificationScope>,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM notifications
            WHERE user_id = $1 AND ($2::notification_scope IS NULL OR scope = $2)
            ORDER BY created_at DESC
            "#,
            SELECT_COLS
        ))
        .bind(user_id)
        .bind(scope)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_notification).collect())
    }

    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET read_at = NOW()
            WHERE user_id = $1 AND id = ANY($2) AND read_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
