use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::account_deletion::DeletionRequestRepo,
    domain::entities::deletion_request::AccountDeletionRequest,
};

fn row_to_request(row: sqlx::postgres::PgRow) -> AccountDeletionRequest {
    AccountDeletionRequest {
        id: row.get("id"),
        user_id: row.get("user_id"),
        status: row.get("status"),
        reason: row.get("reason"),
        scheduled_deletion_date: row.get("scheduled_deletion_date"),
        cancelled_at: row.get("cancelled_at"),
        deleted_at: row.get("deleted_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, status, reason, scheduled_deletion_date,
    cancelled_at, deleted_at, created_at, updated_at
"#;

#[async_trait]
impl DeletionRequestRepo for PostgresPersistence {
    async fn create(
        &self,
        user_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<AccountDeletionRequest> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO account_deletion_requests (id, user_id, status, reason, created_at, updated_at)
            VALUES ($1, $2, 'pending', $3, NOW(), NOW())
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_request(row))
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<AccountDeletionRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM account_deletion_requests WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_request))
    }

    async fn latest_for_user(&self, user_id: Uuid) -> AppResult<Option<AccountDeletionRequest>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {} FROM account_deletion_requests
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_request))
    }

    async fn list_pending(&self) -> AppResult<Vec<AccountDeletionRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM account_deletion_requests WHERE status = 'pending' ORDER BY created_at",
            SELECT_COLS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_request).collect())
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<AccountDeletionRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM account_deletion_requests WHERE id = ANY($1)",
            SELECT_COLS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_request).collect())
    }

    async fn set_approved(&self, id: Uuid, scheduled: NaiveDateTime) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE account_deletion_requests
            SET status = 'approved', scheduled_deletion_date = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(scheduled)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn set_denied(&self, id: Uuid, cancelled_at: NaiveDateTime) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE account_deletion_requests
            SET status = 'denied', cancelled_at = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(cancelled_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn set_completed(&self, id: Uuid, deleted_at: NaiveDateTime) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE account_deletion_requests
            SET status = 'completed', deleted_at = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(deleted_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }
}
