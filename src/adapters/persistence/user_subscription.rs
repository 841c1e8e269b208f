use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{
        CreateSubscriptionInput, SubscriptionUpdate, UserSubscriptionRepo,
    },
    domain::entities::user_subscription::UserSubscription,
};

fn row_to_subscription(row: sqlx::postgres::PgRow) -> UserSubscription {
    UserSubscription {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id: row.get("plan_id"),
        status: row.get("status"),
        current_period_start: row.get("current_period_start"),
        current_period_end: row.get("current_period_end"),
        cancel_at_period_end: row.get("cancel_at_period_end"),
        cancelled_at: row.get("cancelled_at"),
        is_trial: row.get("is_trial"),
        trial_start: row.get("trial_start"),
        trial_end: row.get("trial_end"),
        gateway_customer_id: row.get("gateway_customer_id"),
        gateway_subscription_id: row.get("gateway_subscription_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, plan_id, status, current_period_start, current_period_end,
    cancel_at_period_end, cancelled_at, is_trial, trial_start, trial_end,
    gateway_customer_id, gateway_subscription_id, created_at, updated_at
"#;

#[async_trait]
impl UserSubscriptionRepo for PostgresPersistence {
    async fn current_for_user(&self, user_id: Uuid) -> AppResult<Option<UserSubscription>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {} FROM user_subscriptions
            WHERE user_id = $1
              AND status IN ('active', 'trialing')
              AND (current_period_end IS NULL OR current_period_end > NOW())
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_subscription))
    }

    async fn has_trial_or_paid_history(&self, user_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_subscriptions us
                JOIN subscription_plans sp ON sp.id = us.plan_id
                WHERE us.user_id = $1 AND (us.is_trial = TRUE OR sp.is_paid_tier = TRUE)
            )
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(exists)
    }

    async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<UserSubscription> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO user_subscriptions (
                id, user_id, plan_id, status, current_period_start, current_period_end,
                cancel_at_period_end, is_trial, trial_start, trial_end,
                gateway_customer_id, gateway_subscription_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $8, $9, $10, $11, NOW(), NOW())
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(input.plan_id)
        .bind(input.status)
        .bind(input.current_period_start)
        .bind(input.current_period_end)
        .bind(input.is_trial)
        .bind(input.trial_start)
        .bind(input.trial_end)
        .bind(&input.gateway_customer_id)
        .bind(&input.gateway_subscription_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_subscription(row))
    }

    async fn update(&self, id: Uuid, update: &SubscriptionUpdate) -> AppResult<UserSubscription> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE user_subscriptions
            SET plan_id = $2,
                status = $3,
                current_period_start = $4,
                current_period_end = $5,
                cancel_at_period_end = $6,
                cancelled_at = $7,
                is_trial = $8,
                trial_start = $9,
                trial_end = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(update.plan_id)
        .bind(update.status)
        .bind(update.current_period_start)
        .bind(update.current_period_end)
        .bind(update.cancel_at_period_end)
        .bind(update.cancelled_at)
        .bind(update.is_trial)
        .bind(update.trial_start)
        .bind(update.trial_end)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_subscription(row))
    }

    async fn list_expired_active(&self, now: NaiveDateTime) -> AppResult<Vec<UserSubscription>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM user_subscriptions
            WHERE status = 'active' AND current_period_end < $1
            ORDER BY current_period_end
            "#,
            SELECT_COLS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_subscription).collect())
    }
}
