use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription::DeletedAccountHistoryRepo,
};

#[async_trait]
impl DeletedAccountHistoryRepo for PostgresPersistence {
    async fn email_was_deleted(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM deleted_account_history WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(exists)
    }

    async fn record(&self, user_id: Uuid, email: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO deleted_account_history (id, user_id, email, deleted_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }
}
