use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Numeric limits per plan. A value of zero or below means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub max_events_created: i32,
    pub max_events_joined: i32,
    pub ai_insights_overall: i32,
    pub ai_insights_per_event: i32,
    pub ai_chat: i32,
    pub invite_people: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFeatures {
    pub fast_ai_access: bool,
    pub higher_ai_priority: bool,
}

/// Reference data: seeded by operators, read-only to the application.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i32,
    pub is_paid_tier: bool,
    pub limits: PlanLimits,
    pub features: PlanFeatures,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}
