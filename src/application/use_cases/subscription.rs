//! Subscription state resolver, trial lifecycle policy, and usage gating.

use async_trait::async_trait;
use chrono::{Duration, Months, NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::plan_catalog::{
        self, FREE_PLAN, GRACE_PERIOD_DAYS, TRIAL_DAYS, TRIAL_PLAN, can_perform,
    },
    application::use_cases::{
        billing::{BillingUseCases, CreateTransactionInput},
        notification::NotificationUseCases,
    },
    domain::entities::{
        profile::Profile,
        subscription_plan::SubscriptionPlan,
        transaction::{TransactionStatus, TransactionType},
        user_subscription::{SubscriptionStatus, UserSubscription},
    },
};

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait SubscriptionPlanRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<SubscriptionPlan>>;
    async fn get_by_name(&self, name: &str) -> AppResult<Option<SubscriptionPlan>>;
    async fn list(&self) -> AppResult<Vec<SubscriptionPlan>>;
}

#[derive(Debug, Clone)]
pub struct CreateSubscriptionInput {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<NaiveDateTime>,
    pub current_period_end: Option<NaiveDateTime>,
    pub is_trial: bool,
    pub trial_start: Option<NaiveDateTime>,
    pub trial_end: Option<NaiveDateTime>,
    pub gateway_customer_id: Option<String>,
    pub gateway_subscription_id: Option<String>,
}

/// Applied wholesale to a subscription row; callers start from the current
/// row and change the fields the transition touches.
#[derive(Debug, Clone)]
pub struct SubscriptionUpdate {
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<NaiveDateTime>,
    pub current_period_end: Option<NaiveDateTime>,
    pub cancel_at_period_end: bool,
    pub cancelled_at: Option<NaiveDateTime>,
    pub is_trial: bool,
    pub trial_start: Option<NaiveDateTime>,
    pub trial_end: Option<NaiveDateTime>,
}

impl SubscriptionUpdate {
    pub fn from_current(sub: &UserSubscription) -> Self {
        Self {
            plan_id: sub.plan_id,
            status: sub.status,
            current_period_start: sub.current_period_start,
            current_period_end: sub.current_period_end,
            cancel_at_period_end: sub.cancel_at_period_end,
            cancelled_at: sub.cancelled_at,
            is_trial: sub.is_trial,
            trial_start: sub.trial_start,
            trial_end: sub.trial_end,
        }
    }
}

#[async_trait]
pub trait UserSubscriptionRepo: Send + Sync {
    /// The single authoritative current row: latest created with an
    /// active/trialing status and an unexpired period.
    async fn current_for_user(&self, user_id: Uuid) -> AppResult<Option<UserSubscription>>;
    /// Whether the user ever held a trial or a paid-tier subscription.
    async fn has_trial_or_paid_history(&self, user_id: Uuid) -> AppResult<bool>;
    async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<UserSubscription>;
    async fn update(&self, id: Uuid, update: &SubscriptionUpdate) -> AppResult<UserSubscription>;
    /// All `active` rows whose `current_period_end` is before `now`.
    async fn list_expired_active(&self, now: NaiveDateTime) -> AppResult<Vec<UserSubscription>>;
}

#[async_trait]
pub trait DeletedAccountHistoryRepo: Send + Sync {
    async fn email_was_deleted(&self, email: &str) -> AppResult<bool>;
    async fn record(&self, user_id: Uuid, email: &str) -> AppResult<()>;
}

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<Profile>>;
    async fn is_admin(&self, user_id: Uuid) -> AppResult<bool>;
}

/// On-demand counts from the events/attendees/AI tables; nothing is stored.
#[async_trait]
pub trait EventCountRepo: Send + Sync {
    /// Non-archived, non-cancelled events owned by the user.
    async fn events_created(&self, user_id: Uuid) -> AppResult<i64>;
    async fn events_joined(&self, user_id: Uuid) -> AppResult<i64>;
    async fn ai_insights_used(&self, user_id: Uuid) -> AppResult<i64>;
    async fn ai_chat_used(&self, user_id: Uuid) -> AppResult<i64>;
    async fn invites_sent(&self, user_id: Uuid) -> AppResult<i64>;
}

// ============================================================================
// Output Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UsageGateEntry {
    pub limit: i32,
    pub used: i64,
    pub allowed: bool,
}

impl UsageGateEntry {
    fn new(limit: i32, used: i64) -> Self {
        Self {
            limit,
            used,
            allowed: can_perform(limit, used),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageSummary {
    pub plan_name: String,
    pub is_paid_tier: bool,
    pub events_created: UsageGateEntry,
    pub events_joined: UsageGateEntry,
    pub ai_insights: UsageGateEntry,
    pub ai_chat: UsageGateEntry,
    pub invites: UsageGateEntry,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelOutcome {
    pub immediate: bool,
    pub access_until: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpirySweepReport {
    pub scanned: usize,
    pub cancelled: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct PurchaseInput {
    pub plan_name: String,
    pub original_amount_cents: i64,
    pub net_amount_cents: i64,
    pub gateway_payment_id: Option<String>,
    pub gateway_customer_id: Option<String>,
}

// ============================================================================
// Pure policy helpers
// ============================================================================

/// Within grace iff strictly fewer than seven whole days have elapsed since
/// the period start.
pub fn within_grace_period(period_start: NaiveDateTime, now: NaiveDateTime) -> bool {
    (now - period_start).num_days() < GRACE_PERIOD_DAYS
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct SubscriptionUseCases {
    plan_repo: Arc<dyn SubscriptionPlanRepo>,
    subscription_repo: Arc<dyn UserSubscriptionRepo>,
    deleted_history_repo: Arc<dyn DeletedAccountHistoryRepo>,
    profile_repo: Arc<dyn ProfileRepo>,
    event_counts: Arc<dyn EventCountRepo>,
    billing: BillingUseCases,
    notifications: NotificationUseCases,
}

impl SubscriptionUseCases {
    pub fn new(
        plan_repo: Arc<dyn SubscriptionPlanRepo>,
        subscription_repo: Arc<dyn UserSubscriptionRepo>,
        deleted_history_repo: Arc<dyn DeletedAccountHistoryRepo>,
        profile_repo: Arc<dyn ProfileRepo>,
        event_counts: Arc<dyn EventCountRepo>,
        billing: BillingUseCases,
        notifications: NotificationUseCases,
    ) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            deleted_history_repo,
            profile_repo,
            event_counts,
            billing,
            notifications,
        }
    }

    /// The current subscription joined with its plan. A subscription whose
    /// plan row is missing is an error: callers must deny rather than treat
    /// the user as unlimited.
    pub async fn current_with_plan(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<(UserSubscription, SubscriptionPlan)>> {
        let Some(sub) = self.subscription_repo.current_for_user(user_id).await? else {
            return Ok(None);
        };
        let plan = self
            .plan_repo
            .get_by_id(sub.plan_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("subscription {} references unknown plan", sub.id))
            })?;
        Ok(Some((sub, plan)))
    }

    /// Per-action usage gate summary. Users without any subscription row are
    /// gated against the Free tier's limits.
    pub async fn usage_summary(&self, user_id: Uuid) -> AppResult<UsageSummary> {
        let current = self.current_with_plan(user_id).await?;
        let (plan_name, is_paid_tier, limits) = match &current {
            Some((_, plan)) => (plan.name.clone(), plan.is_paid_tier, plan.limits),
            None => {
                let free = plan_catalog::free_tier();
                (free.name.to_string(), free.is_paid_tier, free.limits)
            }
        };

        let events_created = self.event_counts.events_created(user_id).await?;
        let events_joined = self.event_counts.events_joined(user_id).await?;
        let ai_insights = self.event_counts.ai_insights_used(user_id).await?;
        let ai_chat = self.event_counts.ai_chat_used(user_id).await?;
        let invites = self.event_counts.invites_sent(user_id).await?;

        Ok(UsageSummary {
            plan_name,
            is_paid_tier,
            events_created: UsageGateEntry::new(limits.max_events_created, events_created),
            events_joined: UsageGateEntry::new(limits.max_events_joined, events_joined),
            ai_insights: UsageGateEntry::new(limits.ai_insights_overall, ai_insights),
            ai_chat: UsageGateEntry::new(limits.ai_chat, ai_chat),
            invites: UsageGateEntry::new(limits.invite_people, invites),
        })
    }

    /// Activates the 30-day trial for a new account. Rejected when the
    /// account already has trial/paid history, or when the email matches a
    /// previously deleted account (trial abuse via delete-and-recreate).
    pub async fn activate_trial(&self, user_id: Uuid) -> AppResult<UserSubscription> {
        let profile = self
            .profile_repo
            .get(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if self
            .subscription_repo
            .has_trial_or_paid_history(user_id)
            .await?
        {
            return Err(AppError::InvalidInput(
                "Account already has subscription history".into(),
            ));
        }

        if self
            .deleted_history_repo
            .email_was_deleted(&profile.email)
            .await?
        {
            return Err(AppError::TrialIneligible);
        }

        let trial_plan = self
            .plan_repo
            .get_by_name(TRIAL_PLAN)
            .await?
            .ok_or_else(|| AppError::Internal("trial plan missing".into()))?;

        let now = Utc::now().naive_utc();
        let trial_end = now + Duration::days(TRIAL_DAYS);

        let subscription = match self.subscription_repo.current_for_user(user_id).await? {
            Some(current) => {
                let mut update = SubscriptionUpdate::from_current(&current);
                update.plan_id = trial_plan.id;
                update.status = SubscriptionStatus::Trialing;
                update.current_period_start = Some(now);
                update.current_period_end = Some(trial_end);
                update.is_trial = true;
                update.trial_start = Some(now);
                update.trial_end = Some(trial_end);
                self.subscription_repo.update(current.id, &update).await?
            }
            None => {
                self.subscription_repo
                    .create(&CreateSubscriptionInput {
                        user_id,
                        plan_id: trial_plan.id,
                        status: SubscriptionStatus::Trialing,
                        current_period_start: Some(now),
                        current_period_end: Some(trial_end),
                        is_trial: true,
                        trial_start: Some(now),
                        trial_end: Some(trial_end),
                        gateway_customer_id: None,
                        gateway_subscription_id: None,
                    })
                    .await?
            }
        };

        self.notifications
            .emit_user(
                user_id,
                "trial_activated",
                "Trial activated",
                &format!("Your {TRIAL_DAYS}-day trial is now active."),
            )
            .await;

        Ok(subscription)
    }

    /// Records a successful gateway payment: upgrades the subscription to
    /// the purchased plan for one month and appends the purchase row.
    pub async fn record_purchase(
        &self,
        user_id: Uuid,
        input: PurchaseInput,
    ) -> AppResult<UserSubscription> {
        let plan = self
            .plan_repo
            .get_by_name(&input.plan_name)
            .await?
            .ok_or(AppError::NotFound)?;
        if !plan.is_paid_tier {
            return Err(AppError::InvalidInput(
                "Cannot purchase a non-paid plan".into(),
            ));
        }

        let now = Utc::now().naive_utc();
        let period_end = now
            .checked_add_months(Months::new(1))
            .unwrap_or(now + Duration::days(30));

        let subscription = match self.subscription_repo.current_for_user(user_id).await? {
            Some(current) => {
                let mut update = SubscriptionUpdate::from_current(&current);
                update.plan_id = plan.id;
                update.status = SubscriptionStatus::Active;
                update.current_period_start = Some(now);
                update.current_period_end = Some(period_end);
                update.cancel_at_period_end = false;
                update.cancelled_at = None;
                update.is_trial = false;
                self.subscription_repo.update(current.id, &update).await?
            }
            None => {
                self.subscription_repo
                    .create(&CreateSubscriptionInput {
                        user_id,
                        plan_id: plan.id,
                        status: SubscriptionStatus::Active,
                        current_period_start: Some(now),
                        current_period_end: Some(period_end),
                        is_trial: false,
                        trial_start: None,
                        trial_end: None,
                        gateway_customer_id: input.gateway_customer_id.clone(),
                        gateway_subscription_id: None,
                    })
                    .await?
            }
        };

        self.billing
            .record(CreateTransactionInput {
                user_id,
                subscription_id: Some(subscription.id),
                plan_name: plan.name.clone(),
                original_amount_cents: input.original_amount_cents,
                net_amount_cents: input.net_amount_cents,
                status: TransactionStatus::Paid,
                transaction_type: TransactionType::Purchase,
                gateway_payment_id: input.gateway_payment_id,
                gateway_customer_id: input.gateway_customer_id,
            })
            .await?;

        self.notifications
            .emit_user(
                user_id,
                "subscription_activated",
                "Subscription active",
                &format!("Your {} subscription is now active.", plan.name),
            )
            .await;

        Ok(subscription)
    }

    /// Cancels the current paid subscription. Inside the grace period the
    /// downgrade is immediate and the paid amount is refunded in the ledger;
    /// afterwards access is retained until the period end.
    pub async fn cancel(&self, user_id: Uuid) -> AppResult<CancelOutcome> {
        let (sub, plan) = self
            .current_with_plan(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !plan.is_paid_tier {
            return Err(AppError::InvalidInput(
                "Nothing to cancel on the free tier".into(),
            ));
        }
        if sub.status == SubscriptionStatus::Cancelled {
            return Err(AppError::InvalidInput(
                "Subscription is already cancelled".into(),
            ));
        }

        let now = Utc::now().naive_utc();
        let period_start = sub.current_period_start.unwrap_or(now);

        if within_grace_period(period_start, now) {
            let free_plan = self
                .plan_repo
                .get_by_name(FREE_PLAN)
                .await?
                .ok_or_else(|| AppError::Internal("free plan missing".into()))?;

            let mut update = SubscriptionUpdate::from_current(&sub);
            update.plan_id = free_plan.id;
            update.status = SubscriptionStatus::Cancelled;
            update.cancelled_at = Some(now);
            update.cancel_at_period_end = false;
            self.subscription_repo.update(sub.id, &update).await?;

            // Penalty-free: the refund nets the purchase out of revenue.
            self.billing
                .record(CreateTransactionInput {
                    user_id,
                    subscription_id: Some(sub.id),
                    plan_name: plan.name.clone(),
                    original_amount_cents: plan.price_cents as i64,
                    net_amount_cents: plan.price_cents as i64,
                    status: TransactionStatus::Cancelled,
                    transaction_type: TransactionType::Cancellation,
                    gateway_payment_id: None,
                    gateway_customer_id: sub.gateway_customer_id.clone(),
                })
                .await?;

            self.notifications
                .emit_user(
                    user_id,
                    "subscription_cancelled",
                    "Subscription cancelled",
                    "Your subscription was cancelled and you are back on the Free plan.",
                )
                .await;

            Ok(CancelOutcome {
                immediate: true,
                access_until: None,
            })
        } else {
            let mut update = SubscriptionUpdate::from_current(&sub);
            update.cancel_at_period_end = true;
            self.subscription_repo.update(sub.id, &update).await?;

            self.notifications
                .emit_user(
                    user_id,
                    "subscription_cancelled",
                    "Cancellation scheduled",
                    "Your subscription will end at the close of the current billing period.",
                )
                .await;

            Ok(CancelOutcome {
                immediate: false,
                access_until: sub.current_period_end,
            })
        }
    }

    /// Expiry sweep, invoked by an external trigger: flips expired `active`
    /// rows to cancelled, downgrades them to Free, and appends a zero-amount
    /// cancellation row. Best-effort per subscription.
    pub async fn auto_cancel_expired(&self) -> AppResult<ExpirySweepReport> {
        let now = Utc::now().naive_utc();
        let free_plan = self
            .plan_repo
            .get_by_name(FREE_PLAN)
            .await?
            .ok_or_else(|| AppError::Internal("free plan missing".into()))?;

        let expired = self.subscription_repo.list_expired_active(now).await?;
        let mut report = ExpirySweepReport {
            scanned: expired.len(),
            ..Default::default()
        };

        for sub in expired {
            let plan_name = match self.plan_repo.get_by_id(sub.plan_id).await {
                Ok(Some(plan)) => plan.name,
                _ => "unknown".to_string(),
            };

            let mut update = SubscriptionUpdate::from_current(&sub);
            update.plan_id = free_plan.id;
            update.status = SubscriptionStatus::Cancelled;
            update.cancelled_at = Some(now);
            update.cancel_at_period_end = false;

            match self.subscription_repo.update(sub.id, &update).await {
                Ok(_) => {
                    report.cancelled += 1;
                    if let Err(err) = self
                        .billing
                        .record(CreateTransactionInput {
                            user_id: sub.user_id,
                            subscription_id: Some(sub.id),
                            plan_name,
                            original_amount_cents: 0,
                            net_amount_cents: 0,
                            status: TransactionStatus::Cancelled,
                            transaction_type: TransactionType::Cancellation,
                            gateway_payment_id: None,
                            gateway_customer_id: sub.gateway_customer_id.clone(),
                        })
                        .await
                    {
                        tracing::warn!(
                            subscription_id = %sub.id,
                            error = ?err,
                            "Expiry sweep: cancellation transaction failed"
                        );
                    }
                    self.notifications
                        .emit_user(
                            sub.user_id,
                            "subscription_expired",
                            "Subscription expired",
                            "Your subscription period ended and your account moved to the Free plan.",
                        )
                        .await;
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::error!(
                        subscription_id = %sub.id,
                        error = ?err,
                        "Expiry sweep: failed to cancel subscription"
                    );
                }
            }
        }

        Ok(report)
    }
}
