use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::costs::{CostRepo, CreateCostInput},
    domain::entities::cost::AdminCost,
};

fn row_to_cost(row: sqlx::postgres::PgRow) -> AdminCost {
    AdminCost {
        id: row.get("id"),
        label: row.get("label"),
        amount_cents: row.get("amount_cents"),
        incurred_on: row.get("incurred_on"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, label, amount_cents, incurred_on, created_by, created_at
"#;

#[async_trait]
impl CostRepo for PostgresPersistence {
    async fn create(&self, input: &CreateCostInput) -> AppResult<AdminCost> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO admin_costs (id, label, amount_cents, incurred_on, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.label)
        .bind(input.amount_cents)
        .bind(input.incurred_on)
        .bind(input.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_cost(row))
    }

    async fn list(&self) -> AppResult<Vec<AdminCost>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM admin_costs ORDER BY incurred_on DESC, created_at DESC",
            SELECT_COLS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_cost).collect())
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM admin_costs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
