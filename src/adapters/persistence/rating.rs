use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::ratings::RatingRepo,
    domain::entities::rating::UserRating,
};

fn row_to_rating(row: sqlx::postgres::PgRow) -> UserRating {
    UserRating {
        id: row.get("id"),
        user_id: row.get("user_id"),
        stars: row.get("stars"),
        comment: row.get("comment"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, stars, comment, created_at
"#;

#[async_trait]
impl RatingRepo for PostgresPersistence {
    async fn create(
        &self,
        user_id: Uuid,
        stars: i16,
        comment: Option<String>,
    ) -> AppResult<UserRating> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_ratings (id, user_id, stars, comment, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(stars)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_rating(row))
    }

    async fn list_all(&self) -> AppResult<Vec<UserRating>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM user_ratings ORDER BY created_at",
            SELECT_COLS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_rating).collect())
    }
}
