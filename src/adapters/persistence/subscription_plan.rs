use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, parse_json_with_fallback},
    app_error::{AppError, AppResult},
    application::use_cases::subscription::SubscriptionPlanRepo,
    domain::entities::subscription_plan::SubscriptionPlan,
};

fn row_to_plan(row: sqlx::postgres::PgRow) -> SubscriptionPlan {
    let id: Uuid = row.get("id");
    let limits_json: serde_json::Value = row.get("limits");
    let features_json: serde_json::Value = row.get("features");

    SubscriptionPlan {
        id,
        name: row.get("name"),
        price_cents: row.get("price_cents"),
        is_paid_tier: row.get("is_paid_tier"),
        limits: parse_json_with_fallback(
            &limits_json,
            "limits",
            "subscription_plan",
            &id.to_string(),
        ),
        features: parse_json_with_fallback(
            &features_json,
            "features",
            "subscription_plan",
            &id.to_string(),
        ),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, name, price_cents, is_paid_tier, limits, features, created_at, updated_at
"#;

#[async_trait]
impl SubscriptionPlanRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<SubscriptionPlan>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscription_plans WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_plan))
    }

    async fn get_by_name(&self, name: &str) -> AppResult<Option<SubscriptionPlan>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscription_plans WHERE name = $1",
            SELECT_COLS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_plan))
    }

    async fn list(&self) -> AppResult<Vec<SubscriptionPlan>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM subscription_plans ORDER BY price_cents, name",
            SELECT_COLS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_plan).collect())
    }
}
