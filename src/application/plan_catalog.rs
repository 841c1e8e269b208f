//! Canonical plan tiers and the usage gate.
//!
//! The catalog mirrors the operator-seeded `subscription_plans` rows; it is
//! the source of truth for limit values when no database row is available
//! (e.g. a user without any subscription falls back to the Free tier).

use once_cell::sync::Lazy;

use crate::domain::entities::subscription_plan::{PlanFeatures, PlanLimits};

pub const FREE_PLAN: &str = "Free";
pub const TRIAL_PLAN: &str = "Trial";
pub const SMALL_ORG_PLAN: &str = "Small Event Org";
pub const LARGE_ORG_PLAN: &str = "Large Event Org";

/// Days a trial lasts after activation.
pub const TRIAL_DAYS: i64 = 30;

/// Days after `current_period_start` during which cancellation is immediate
/// and penalty-free.
pub const GRACE_PERIOD_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct PlanTier {
    pub name: &'static str,
    pub price_cents: i32,
    pub is_paid_tier: bool,
    pub limits: PlanLimits,
    pub features: PlanFeatures,
}

pub static PLAN_CATALOG: Lazy<Vec<PlanTier>> = Lazy::new(|| {
    vec![
        PlanTier {
            name: FREE_PLAN,
            price_cents: 0,
            is_paid_tier: false,
            limits: PlanLimits {
                max_events_created: 1,
                max_events_joined: 3,
                ai_insights_overall: 2,
                ai_insights_per_event: 1,
                ai_chat: 10,
                invite_people: 5,
            },
            features: PlanFeatures {
                fast_ai_access: false,
                higher_ai_priority: false,
            },
        },
        PlanTier {
            // Trial gets Large-tier limits for its 30 days.
            name: TRIAL_PLAN,
            price_cents: 0,
            is_paid_tier: false,
            limits: PlanLimits {
                max_events_created: 0,
                max_events_joined: 0,
                ai_insights_overall: 0,
                ai_insights_per_event: 0,
                ai_chat: 0,
                invite_people: 0,
            },
            features: PlanFeatures {
                fast_ai_access: true,
                higher_ai_priority: false,
            },
        },
        PlanTier {
            name: SMALL_ORG_PLAN,
            price_cents: 2_900,
            is_paid_tier: true,
            limits: PlanLimits {
                max_events_created: 5,
                max_events_joined: 20,
                ai_insights_overall: 20,
                ai_insights_per_event: 5,
                ai_chat: 100,
                invite_people: 50,
            },
            features: PlanFeatures {
                fast_ai_access: true,
                higher_ai_priority: false,
            },
        },
        PlanTier {
            name: LARGE_ORG_PLAN,
            price_cents: 9_900,
            is_paid_tier: true,
            limits: PlanLimits {
                max_events_created: 0,
                max_events_joined: 0,
                ai_insights_overall: 0,
                ai_insights_per_event: 0,
                ai_chat: 0,
                invite_people: 0,
            },
            features: PlanFeatures {
                fast_ai_access: true,
                higher_ai_priority: true,
            },
        },
    ]
});

pub fn tier_by_name(name: &str) -> Option<&'static PlanTier> {
    PLAN_CATALOG.iter().find(|t| t.name == name)
}

pub fn free_tier() -> &'static PlanTier {
    tier_by_name(FREE_PLAN).expect("free tier missing from catalog")
}

/// The usage gate. A limit of zero or below means unlimited; otherwise the
/// action is permitted while the current count is strictly below the limit.
///
/// Callers must resolve the limit from an authoritative plan; if the plan
/// lookup fails, deny by default instead of treating the user as unlimited.
pub fn can_perform(limit: i32, current_count: i64) -> bool {
    limit <= 0 || current_count < limit as i64
}
