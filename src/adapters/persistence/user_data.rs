use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::account_deletion::UserDataRepo,
};

#[async_trait]
impl UserDataRepo for PostgresPersistence {
    /// `table` and `column` come from the static cascade list, never from
    /// request input, so interpolating them is safe.
    async fn delete_user_rows(&self, table: &str, column: &str, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE {column} = $1"))
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
