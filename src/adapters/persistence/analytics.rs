use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, parse_json_with_fallback},
    app_error::{AppError, AppResult},
    application::use_cases::{analytics::AnalyticsRepo, billing::DateRange},
    domain::entities::{subscription_plan::SubscriptionPlan, user_subscription::UserSubscription},
};

#[async_trait]
impl AnalyticsRepo for PostgresPersistence {
    async fn event_created_dates(&self, range: DateRange) -> AppResult<Vec<NaiveDateTime>> {
        sqlx::query_scalar(
            r#"
            SELECT created_at FROM events
            WHERE created_at IS NOT NULL
              AND ($1::timestamp IS NULL OR created_at >= $1)
              AND ($2::timestamp IS NULL OR created_at <= $2)
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn user_event_dates(&self, user_id: Uuid) -> AppResult<Vec<NaiveDateTime>> {
        sqlx::query_scalar(
            "SELECT created_at FROM events WHERE owner_id = $1 AND created_at IS NOT NULL",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn profile_created_dates(&self) -> AppResult<Vec<NaiveDateTime>> {
        sqlx::query_scalar("SELECT created_at FROM profiles WHERE created_at IS NOT NULL")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn subscriptions_with_plans(
        &self,
    ) -> AppResult<Vec<(UserSubscription, SubscriptionPlan)>> {
        let rows = sqlx::query(
            r#"
            SELECT
                us.id, us.user_id, us.plan_id, us.status,
                us.current_period_start, us.current_period_end,
                us.cancel_at_period_end, us.cancelled_at, us.is_trial,
                us.trial_start, us.trial_end,
                us.gateway_customer_id, us.gateway_subscription_id,
                us.created_at, us.updated_at,
                sp.name AS plan_name, sp.price_cents AS plan_price_cents,
                sp.is_paid_tier AS plan_is_paid_tier,
                sp.limits AS plan_limits, sp.features AS plan_features,
                sp.created_at AS plan_created_at, sp.updated_at AS plan_updated_at
            FROM user_subscriptions us
            JOIN subscription_plans sp ON sp.id = us.plan_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let plan_id: Uuid = row.get("plan_id");
                let limits_json: serde_json::Value = row.get("plan_limits");
                let features_json: serde_json::Value = row.get("plan_features");
                let subscription = UserSubscription {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    plan_id,
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
                };
                let plan = SubscriptionPlan {
                    id: plan_id,
                    name: row.get("plan_name"),
                    price_cents: row.get("plan_price_cents"),
                    is_paid_tier: row.get("plan_is_paid_tier"),
                    limits: parse_json_with_fallback(
                        &limits_json,
                        "limits",
                        "subscription_plan",
                        &plan_id.to_string(),
                    ),
                    features: parse_json_with_fallback(
                        &features_json,
                        "features",
                        "subscription_plan",
                        &plan_id.to_string(),
                    ),
                    created_at: row.get("plan_created_at"),
                    updated_at: row.get("plan_updated_at"),
                };
                (subscription, plan)
            })
            .collect())
    }
}
