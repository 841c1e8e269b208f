//! In-memory mock implementations of the repository traits.
//!
//! Fields are public so tests can seed and inspect state directly.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::{
        account_deletion::{DeletionRequestRepo, UserDataRepo},
        analytics::AnalyticsRepo,
        billing::{CreateTransactionInput, DateRange, TransactionRepo},
        costs::{CostRepo, CreateCostInput},
        notification::{CreateNotificationInput, NotificationRepo},
        ratings::RatingRepo,
        subscription::{
            CreateSubscriptionInput, DeletedAccountHistoryRepo, EventCountRepo, ProfileRepo,
            SubscriptionPlanRepo, SubscriptionUpdate, UserSubscriptionRepo,
        },
    },
    domain::entities::{
        cost::AdminCost,
        deletion_request::{AccountDeletionRequest, DeletionRequestStatus},
        notification::{Notification, NotificationScope},
        profile::Profile,
        rating::UserRating,
        subscription_plan::SubscriptionPlan,
        transaction::Transaction,
        user_subscription::{SubscriptionStatus, UserSubscription},
    },
    test_utils::create_test_plan,
};

fn in_range(dt: NaiveDateTime, range: DateRange) -> bool {
    range.start.is_none_or(|s| dt >= s) && range.end.is_none_or(|e| dt <= e)
}

// ============================================================================
// InMemorySubscriptionPlanRepo
// ============================================================================

#[derive(Default)]
pub struct InMemorySubscriptionPlanRepo {
    pub rows: Mutex<Vec<SubscriptionPlan>>,
}

impl InMemorySubscriptionPlanRepo {
    /// A repo seeded with one row per canonical catalog tier.
    pub fn seeded() -> Self {
        let rows = crate::application::plan_catalog::PLAN_CATALOG
            .iter()
            .map(|tier| create_test_plan(tier.name, |_| {}))
            .collect();
        Self {
            rows: Mutex::new(rows),
        }
    }
}

#[async_trait]
impl SubscriptionPlanRepo for InMemorySubscriptionPlanRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<SubscriptionPlan>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn get_by_name(&self, name: &str) -> AppResult<Option<SubscriptionPlan>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<SubscriptionPlan>> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

// ============================================================================
// InMemoryUserSubscriptionRepo
// ============================================================================

pub struct InMemoryUserSubscriptionRepo {
    pub rows: Mutex<Vec<UserSubscription>>,
    plans: Arc<InMemorySubscriptionPlanRepo>,
}

impl InMemoryUserSubscriptionRepo {
    pub fn new(plans: Arc<InMemorySubscriptionPlanRepo>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            plans,
        }
    }
}

#[async_trait]
impl UserSubscriptionRepo for InMemoryUserSubscriptionRepo {
    async fn current_for_user(&self, user_id: Uuid) -> AppResult<Option<UserSubscription>> {
        let now = Utc::now().naive_utc();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| {
                s.user_id == user_id
                    && s.status.is_active()
                    && s.current_period_end.is_none_or(|end| end > now)
            })
            .cloned())
    }

    async fn has_trial_or_paid_history(&self, user_id: Uuid) -> AppResult<bool> {
        let paid: HashSet<Uuid> = self
            .plans
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_paid_tier)
            .map(|p| p.id)
            .collect();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.user_id == user_id && (s.is_trial || paid.contains(&s.plan_id))))
    }

    async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<UserSubscription> {
        let now = Utc::now().naive_utc();
        let subscription = UserSubscription {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            plan_id: input.plan_id,
            status: input.status,
            current_period_start: input.current_period_start,
            current_period_end: input.current_period_end,
            cancel_at_period_end: false,
            cancelled_at: None,
            is_trial: input.is_trial,
            trial_start: input.trial_start,
            trial_end: input.trial_end,
            gateway_customer_id: input.gateway_customer_id.clone(),
            gateway_subscription_id: input.gateway_subscription_id.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.rows.lock().unwrap().push(subscription.clone());
        Ok(subscription)
    }

    async fn update(&self, id: Uuid, update: &SubscriptionUpdate) -> AppResult<UserSubscription> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AppError::NotFound)?;
        row.plan_id = update.plan_id;
        row.status = update.status;
        row.current_period_start = update.current_period_start;
        row.current_period_end = update.current_period_end;
        row.cancel_at_period_end = update.cancel_at_period_end;
        row.cancelled_at = update.cancelled_at;
        row.is_trial = update.is_trial;
        row.trial_start = update.trial_start;
        row.trial_end = update.trial_end;
        row.updated_at = Some(Utc::now().naive_utc());
        Ok(row.clone())
    }

    async fn list_expired_active(&self, now: NaiveDateTime) -> AppResult<Vec<UserSubscription>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                s.status == SubscriptionStatus::Active
                    && s.current_period_end.is_some_and(|end| end < now)
            })
            .cloned()
            .collect())
    }
}

// ============================================================================
// InMemoryDeletedAccountHistoryRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryDeletedAccountHistoryRepo {
    pub emails: Mutex<Vec<(Uuid, String)>>,
}

#[async_trait]
impl DeletedAccountHistoryRepo for InMemoryDeletedAccountHistoryRepo {
    async fn email_was_deleted(&self, email: &str) -> AppResult<bool> {
        Ok(self.emails.lock().unwrap().iter().any(|(_, e)| e == email))
    }

    async fn record(&self, user_id: Uuid, email: &str) -> AppResult<()> {
        self.emails
            .lock()
            .unwrap()
            .push((user_id, email.to_string()));
        Ok(())
    }
}

// ============================================================================
// InMemoryProfileRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryProfileRepo {
    pub rows: Mutex<HashMap<Uuid, Profile>>,
}

impl InMemoryProfileRepo {
    pub fn insert(&self, profile: Profile) {
        self.rows.lock().unwrap().insert(profile.id, profile);
    }
}

#[async_trait]
impl ProfileRepo for InMemoryProfileRepo {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }

    async fn is_admin(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&user_id)
            .is_some_and(|p| p.is_admin()))
    }
}

// ============================================================================
// InMemoryEventCountRepo
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct UsageCounts {
    events_created: i64,
    events_joined: i64,
    ai_insights: i64,
    ai_chat: i64,
    invites: i64,
}

#[derive(Default)]
pub struct InMemoryEventCountRepo {
    counts: Mutex<HashMap<Uuid, UsageCounts>>,
}

impl InMemoryEventCountRepo {
    pub fn set_events_created(&self, user_id: Uuid, count: i64) {
        self.counts.lock().unwrap().entry(user_id).or_default().events_created = count;
    }

    pub fn set_events_joined(&self, user_id: Uuid, count: i64) {
        self.counts.lock().unwrap().entry(user_id).or_default().events_joined = count;
    }

    pub fn set_ai_insights_used(&self, user_id: Uuid, count: i64) {
        self.counts.lock().unwrap().entry(user_id).or_default().ai_insights = count;
    }

    pub fn set_ai_chat_used(&self, user_id: Uuid, count: i64) {
        self.counts.lock().unwrap().entry(user_id).or_default().ai_chat = count;
    }

    pub fn set_invites_sent(&self, user_id: Uuid, count: i64) {
        self.counts.lock().unwrap().entry(user_id).or_default().invites = count;
    }

    fn get(&self, user_id: Uuid) -> UsageCounts {
        self.counts
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventCountRepo for InMemoryEventCountRepo {
    async fn events_created(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self.get(user_id).events_created)
    }

    async fn events_joined(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self.get(user_id).events_joined)
    }

    async fn ai_insights_used(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self.get(user_id).ai_insights)
    }

    async fn ai_chat_used(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self.get(user_id).ai_chat)
    }

    async fn invites_sent(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self.get(user_id).invites)
    }
}

// ============================================================================
// InMemoryTransactionRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryTransactionRepo {
    pub rows: Mutex<Vec<Transaction>>,
}

#[async_trait]
impl TransactionRepo for InMemoryTransactionRepo {
    async fn create(&self, input: &CreateTransactionInput) -> AppResult<Transaction> {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            subscription_id: input.subscription_id,
            plan_name: input.plan_name.clone(),
            original_amount_cents: input.original_amount_cents,
            net_amount_cents: input.net_amount_cents,
            status: input.status,
            transaction_type: input.transaction_type,
            gateway_payment_id: input.gateway_payment_id.clone(),
            gateway_customer_id: input.gateway_customer_id.clone(),
            created_at: Some(Utc::now().naive_utc()),
        };
        self.rows.lock().unwrap().push(transaction.clone());
        Ok(transaction)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Transaction>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_in_range(&self, range: DateRange) -> AppResult<Vec<Transaction>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| match t.created_at {
                Some(c) => in_range(c, range),
                // SQL NULL fails either comparison, so undated rows only
                // survive an unbounded range.
                None => range.start.is_none() && range.end.is_none(),
            })
            .cloned()
            .collect())
    }
}

// ============================================================================
// InMemoryNotificationRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryNotificationRepo {
    pub rows: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationRepo for InMemoryNotificationRepo {
    async fn create(&self, input: &CreateNotificationInput) -> AppResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            scope: input.scope,
            kind: input.kind.clone(),
            title: input.title.clone(),
            message: input.message.clone(),
            metadata: input.metadata.clone(),
            read_at: None,
            created_at: Some(Utc::now().naive_utc()),
        };
        self.rows.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        scope: Option<NotificationScope>,
    ) -> AppResult<Vec<Notification>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id && scope.is_none_or(|s| n.scope == s))
            .cloned()
            .collect())
    }

    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        let now = Utc::now().naive_utc();
        let mut updated = 0;
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.user_id == user_id && ids.contains(&row.id) && row.read_at.is_none() {
                row.read_at = Some(now);
                updated += 1;
            }
        }
        Ok(updated)
    }
}

// ============================================================================
// InMemoryAnalyticsRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryAnalyticsRepo {
    pub event_dates: Mutex<Vec<NaiveDateTime>>,
    pub user_event_dates: Mutex<HashMap<Uuid, Vec<NaiveDateTime>>>,
    pub profile_dates: Mutex<Vec<NaiveDateTime>>,
    pub subscriptions: Mutex<Vec<(UserSubscription, SubscriptionPlan)>>,
}

#[async_trait]
impl AnalyticsRepo for InMemoryAnalyticsRepo {
    async fn event_created_dates(&self, range: DateRange) -> AppResult<Vec<NaiveDateTime>> {
        Ok(self
            .event_dates
            .lock()
            .unwrap()
            .iter()
            .copied()
            .filter(|d| in_range(*d, range))
            .collect())
    }

    async fn user_event_dates(&self, user_id: Uuid) -> AppResult<Vec<NaiveDateTime>> {
        Ok(self
            .user_event_dates
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn profile_created_dates(&self) -> AppResult<Vec<NaiveDateTime>> {
        Ok(self.profile_dates.lock().unwrap().clone())
    }

    async fn subscriptions_with_plans(
        &self,
    ) -> AppResult<Vec<(UserSubscription, SubscriptionPlan)>> {
        Ok(self.subscriptions.lock().unwrap().clone())
    }
}

// ============================================================================
// InMemoryDeletionRequestRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryDeletionRequestRepo {
    pub rows: Mutex<HashMap<Uuid, AccountDeletionRequest>>,
}

#[async_trait]
impl DeletionRequestRepo for InMemoryDeletionRequestRepo {
    async fn create(
        &self,
        user_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<AccountDeletionRequest> {
        let request = AccountDeletionRequest {
            id: Uuid::new_v4(),
            user_id,
            status: DeletionRequestStatus::Pending,
            reason,
            scheduled_deletion_date: None,
            cancelled_at: None,
            deleted_at: None,
            created_at: Some(Utc::now().naive_utc()),
            updated_at: None,
        };
        self.rows
            .lock()
            .unwrap()
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<AccountDeletionRequest>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn latest_for_user(&self, user_id: Uuid) -> AppResult<Option<AccountDeletionRequest>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn list_pending(&self) -> AppResult<Vec<AccountDeletionRequest>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == DeletionRequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<AccountDeletionRequest>> {
        let rows = self.rows.lock().unwrap();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn set_approved(&self, id: Uuid, scheduled: NaiveDateTime) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or(AppError::NotFound)?;
        row.status = DeletionRequestStatus::Approved;
        row.scheduled_deletion_date = Some(scheduled);
        row.updated_at = Some(Utc::now().naive_utc());
        Ok(())
    }

    async fn set_denied(&self, id: Uuid, cancelled_at: NaiveDateTime) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or(AppError::NotFound)?;
        row.status = DeletionRequestStatus::Denied;
        row.cancelled_at = Some(cancelled_at);
        row.updated_at = Some(Utc::now().naive_utc());
        Ok(())
    }

    async fn set_completed(&self, id: Uuid, deleted_at: NaiveDateTime) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or(AppError::NotFound)?;
        row.status = DeletionRequestStatus::Completed;
        row.deleted_at = Some(deleted_at);
        row.updated_at = Some(Utc::now().naive_utc());
        Ok(())
    }
}

// ============================================================================
// InMemoryUserDataRepo
// ============================================================================

/// Records the table order of cascade deletes and serves per-table row
/// counts once; repeat deletes return zero, like an already-emptied database.
#[derive(Default)]
pub struct InMemoryUserDataRepo {
    pub calls: Mutex<Vec<String>>,
    pub remaining_rows: Mutex<HashMap<String, u64>>,
    pub fail_table: Mutex<Option<String>>,
}

impl InMemoryUserDataRepo {
    pub fn set_rows(&self, table: &str, count: u64) {
        self.remaining_rows
            .lock()
            .unwrap()
            .insert(table.to_string(), count);
    }

    pub fn fail_on(&self, table: &str) {
        *self.fail_table.lock().unwrap() = Some(table.to_string());
    }
}

#[async_trait]
impl UserDataRepo for InMemoryUserDataRepo {
    async fn delete_user_rows(&self, table: &str, _column: &str, _user_id: Uuid) -> AppResult<u64> {
        self.calls.lock().unwrap().push(table.to_string());
        if self.fail_table.lock().unwrap().as_deref() == Some(table) {
            return Err(AppError::Database("constraint violation".into()));
        }
        Ok(self.remaining_rows.lock().unwrap().remove(table).unwrap_or(0))
    }
}

// ============================================================================
// InMemoryRatingRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryRatingRepo {
    pub rows: Mutex<Vec<UserRating>>,
}

#[async_trait]
impl RatingRepo for InMemoryRatingRepo {
    async fn create(
        &self,
        user_id: Uuid,
        stars: i16,
        comment: Option<String>,
    ) -> AppResult<UserRating> {
        let rating = UserRating {
            id: Uuid::new_v4(),
            user_id,
            stars,
            comment,
            created_at: Some(Utc::now().naive_utc()),
        };
        self.rows.lock().unwrap().push(rating.clone());
        Ok(rating)
    }

    async fn list_all(&self) -> AppResult<Vec<UserRating>> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

// ============================================================================
// InMemoryCostRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryCostRepo {
    pub rows: Mutex<Vec<AdminCost>>,
}

#[async_trait]
impl CostRepo for InMemoryCostRepo {
    async fn create(&self, input: &CreateCostInput) -> AppResult<AdminCost> {
        let cost = AdminCost {
            id: Uuid::new_v4(),
            label: input.label.clone(),
            amount_cents: input.amount_cents,
            incurred_on: input.incurred_on,
            created_by: input.created_by,
            created_at: Some(Utc::now().naive_utc()),
        };
        self.rows.lock().unwrap().push(cost.clone());
        Ok(cost)
    }

    async fn list(&self) -> AppResult<Vec<AdminCost>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.id != id);
        Ok((before - rows.len()) as u64)
    }
}
