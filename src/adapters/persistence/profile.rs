use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription::ProfileRepo,
    domain::entities::profile::Profile,
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> Profile {
    Profile {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        account_type: row.get("account_type"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, email, display_name, account_type, created_at
"#;

#[async_trait]
impl ProfileRepo for PostgresPersistence {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    /// The `admin_is_admin` SQL function is the authoritative check; if it
    /// is missing or errors, fall back to the `account_type` column.
    async fn is_admin(&self, user_id: Uuid) -> AppResult<bool> {
        match sqlx::query_scalar::<_, bool>("SELECT admin_is_admin($1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
        {
            Ok(is_admin) => Ok(is_admin),
            Err(err) => {
                tracing::warn!(
                    error = ?err,
                    "admin_is_admin unavailable, falling back to account_type column"
                );
                let account_type: Option<String> =
                    sqlx::query_scalar("SELECT account_type FROM profiles WHERE id = $1")
                        .bind(user_id)
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(AppError::from)?;
                Ok(account_type.as_deref() == Some("admin"))
            }
        }
    }
}
