//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible
//! defaults. Use the closure parameter to override specific fields as needed.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::{
    application::plan_catalog::{self, SMALL_ORG_PLAN},
    domain::entities::{
        profile::Profile,
        subscription_plan::SubscriptionPlan,
        transaction::{Transaction, TransactionStatus, TransactionType},
        user_subscription::{SubscriptionStatus, UserSubscription},
    },
};

/// A fixed reference datetime so assertions do not race the clock.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Create a test plan. Names matching the canonical catalog pick up that
/// tier's price, limits and features.
pub fn create_test_plan(
    name: &str,
    overrides: impl FnOnce(&mut SubscriptionPlan),
) -> SubscriptionPlan {
    let tier = plan_catalog::tier_by_name(name);
    let mut plan = SubscriptionPlan {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price_cents: tier.map(|t| t.price_cents).unwrap_or(0),
        is_paid_tier: tier.map(|t| t.is_paid_tier).unwrap_or(false),
        limits: tier.map(|t| t.limits).unwrap_or_default(),
        features: tier.map(|t| t.features).unwrap_or_default(),
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut plan);
    plan
}

/// Create a test subscription with sensible defaults (active, 30-day period
/// starting at the reference datetime).
pub fn create_test_subscription(
    user_id: Uuid,
    plan_id: Uuid,
    overrides: impl FnOnce(&mut UserSubscription),
) -> UserSubscription {
    let now = test_datetime();
    let mut subscription = UserSubscription {
        id: Uuid::new_v4(),
        user_id,
        plan_id,
        status: SubscriptionStatus::Active,
        current_period_start: Some(now),
        current_period_end: Some(now + chrono::Duration::days(30)),
        cancel_at_period_end: false,
        cancelled_at: None,
        is_trial: false,
        trial_start: None,
        trial_end: None,
        gateway_customer_id: None,
        gateway_subscription_id: None,
        created_at: Some(now),
        updated_at: Some(now),
    };
    overrides(&mut subscription);
    subscription
}

/// Create a test ledger row: a paid Small Event Org purchase by default.
pub fn create_test_transaction(
    user_id: Uuid,
    overrides: impl FnOnce(&mut Transaction),
) -> Transaction {
    let mut transaction = Transaction {
        id: Uuid::new_v4(),
        user_id,
        subscription_id: None,
        plan_name: SMALL_ORG_PLAN.to_string(),
        original_amount_cents: 2_900,
        net_amount_cents: 2_900,
        status: TransactionStatus::Paid,
        transaction_type: TransactionType::Purchase,
        gateway_payment_id: None,
        gateway_customer_id: None,
        created_at: Some(test_datetime()),
    };
    overrides(&mut transaction);
    transaction
}

pub fn create_test_profile(email: &str, overrides: impl FnOnce(&mut Profile)) -> Profile {
    let mut profile = Profile {
        id: Uuid::new_v4(),
        email: email.to_string(),
        display_name: None,
        account_type: "user".to_string(),
        created_at: Some(test_datetime()),
    };
    overrides(&mut profile);
    profile
}
