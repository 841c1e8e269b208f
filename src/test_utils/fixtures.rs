//! Pre-wired mock bundle for subscription-domain tests.

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::entities::{
        subscription_plan::SubscriptionPlan, transaction::Transaction,
        user_subscription::UserSubscription,
    },
    test_utils::{
        InMemoryDeletedAccountHistoryRepo, InMemoryEventCountRepo, InMemoryNotificationRepo,
        InMemoryProfileRepo, InMemorySubscriptionPlanRepo, InMemoryTransactionRepo,
        InMemoryUserSubscriptionRepo, create_test_profile, create_test_subscription,
    },
};

/// All the mocks the subscription use cases need, with the plan catalog
/// pre-seeded. Tests clone the Arcs into the use-case constructor and
/// inspect the stores afterwards.
pub struct SubscriptionFixture {
    pub plans: Arc<InMemorySubscriptionPlanRepo>,
    pub subscriptions: Arc<InMemoryUserSubscriptionRepo>,
    pub deleted_history: Arc<InMemoryDeletedAccountHistoryRepo>,
    pub profiles: Arc<InMemoryProfileRepo>,
    pub event_counts: Arc<InMemoryEventCountRepo>,
    pub transactions: Arc<InMemoryTransactionRepo>,
    pub notifications: Arc<InMemoryNotificationRepo>,
}

impl SubscriptionFixture {
    pub fn new() -> Self {
        let plans = Arc::new(InMemorySubscriptionPlanRepo::seeded());
        let subscriptions = Arc::new(InMemoryUserSubscriptionRepo::new(plans.clone()));
        Self {
            plans,
            subscriptions,
            deleted_history: Arc::new(InMemoryDeletedAccountHistoryRepo::default()),
            profiles: Arc::new(InMemoryProfileRepo::default()),
            event_counts: Arc::new(InMemoryEventCountRepo::default()),
            transactions: Arc::new(InMemoryTransactionRepo::default()),
            notifications: Arc::new(InMemoryNotificationRepo::default()),
        }
    }

    pub fn seed_profile(&self, email: &str, account_type: &str) -> Uuid {
        let profile = create_test_profile(email, |p| {
            p.account_type = account_type.to_string();
        });
        let id = profile.id;
        self.profiles.insert(profile);
        id
    }

    pub fn plan_by_name(&self, name: &str) -> SubscriptionPlan {
        self.plans
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("plan {name} not seeded"))
    }

    /// Seeds an active subscription with a currently-running 30-day period;
    /// the closure adjusts fields after the defaults are applied.
    pub fn seed_subscription(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        overrides: impl FnOnce(&mut UserSubscription),
    ) -> UserSubscription {
        let now = Utc::now().naive_utc();
        let mut subscription = create_test_subscription(user_id, plan_id, |s| {
            s.current_period_start = Some(now - Duration::days(1));
            s.current_period_end = Some(now + Duration::days(29));
            s.created_at = Some(now);
        });
        overrides(&mut subscription);
        self.subscriptions
            .rows
            .lock()
            .unwrap()
            .push(subscription.clone());
        subscription
    }

    pub fn seed_deleted_email(&self, email: &str) {
        self.deleted_history
            .emails
            .lock()
            .unwrap()
            .push((Uuid::new_v4(), email.to_string()));
    }

    /// Latest stored row for the user regardless of status, so tests can
    /// observe cancelled/downgraded state.
    pub fn current_subscription(&self, user_id: Uuid) -> UserSubscription {
        self.subscriptions
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.user_id == user_id)
            .cloned()
            .expect("no subscription seeded for user")
    }

    pub fn transactions_for(&self, user_id: Uuid) -> Vec<Transaction> {
        self.transactions
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl Default for SubscriptionFixture {
    fn default() -> Self {
        Self::new()
    }
}
