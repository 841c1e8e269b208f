//! Admin analytics: read-side aggregation over transaction, event, profile
//! and subscription rows. Pure arithmetic over rows fetched for the range;
//! nothing is mutated.

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    application::use_cases::billing::{DateRange, TransactionRepo},
    domain::entities::{
        subscription_plan::SubscriptionPlan,
        transaction::{Transaction, TransactionStatus, TransactionType},
        user_subscription::{SubscriptionStatus, UserSubscription},
    },
};

#[async_trait]
pub trait AnalyticsRepo: Send + Sync {
    async fn event_created_dates(&self, range: DateRange) -> AppResult<Vec<NaiveDateTime>>;
    /// Creation dates of one user's events, for the per-user forecast.
    async fn user_event_dates(&self, user_id: Uuid) -> AppResult<Vec<NaiveDateTime>>;
    /// All-time signup dates; cumulative counts need history beyond the range.
    async fn profile_created_dates(&self) -> AppResult<Vec<NaiveDateTime>>;
    async fn subscriptions_with_plans(
        &self,
    ) -> AppResult<Vec<(UserSubscription, SubscriptionPlan)>>;
}

// ============================================================================
// Report Types
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyMetrics {
    pub revenue_cents: i64,
    pub paid_transactions: i64,
    pub cancelled_transactions: i64,
    pub new_users: i64,
    pub new_events: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyBucket {
    pub day: String,
    #[serde(flatten)]
    pub metrics: DailyMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanBreakdown {
    pub plan_name: String,
    pub active_subscribers: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub total_revenue_cents: i64,
    pub total_users: i64,
    pub total_events: i64,
    pub paid_transaction_count: i64,
    pub cancelled_transaction_count: i64,
    pub revenue_mean_cents: f64,
    pub revenue_median_cents: f64,
    pub revenue_mode_cents: i64,
    pub user_growth_rate_pct: f64,
    pub active_subscriptions: i64,
    pub conversion_rate_pct: f64,
    pub time_series: Vec<DailyBucket>,
    pub subscription_breakdown: Vec<PlanBreakdown>,
}

// ============================================================================
// Pure aggregation
// ============================================================================

fn day_key(dt: NaiveDateTime) -> String {
    dt.date().format("%Y-%m-%d").to_string()
}

fn is_paid(tx: &Transaction) -> bool {
    tx.status == TransactionStatus::Paid && tx.transaction_type == TransactionType::Purchase
}

fn is_cancelled(tx: &Transaction) -> bool {
    tx.status == TransactionStatus::Cancelled
        && tx.transaction_type == TransactionType::Cancellation
}

pub fn mean(amounts: &[i64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }
    amounts.iter().sum::<i64>() as f64 / amounts.len() as f64
}

/// Mid value(s) of the sorted amounts; the average of the two middles when
/// the count is even.
pub fn median(amounts: &[i64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }
    let mut sorted = amounts.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    }
}

/// Most frequent amount; frequency ties break to the smallest value.
pub fn mode(amounts: &[i64]) -> i64 {
    let mut freq: BTreeMap<i64, usize> = BTreeMap::new();
    for &a in amounts {
        *freq.entry(a).or_default() += 1;
    }
    let mut best: Option<(i64, usize)> = None;
    for (value, count) in freq {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(v, _)| v).unwrap_or(0)
}

/// Growth of the user base over the 7 days before the last observed signup.
/// A zero base with any delta reads as 100%; no data reads as 0.
pub fn user_growth_rate_pct(profile_dates: &[NaiveDateTime]) -> f64 {
    let Some(last) = profile_dates.iter().max().copied() else {
        return 0.0;
    };
    let cutoff = last - Duration::days(7);
    let base = profile_dates.iter().filter(|d| **d <= cutoff).count() as i64;
    let total = profile_dates.len() as i64;
    let delta = total - base;
    if base == 0 {
        if delta > 0 { 100.0 } else { 0.0 }
    } else {
        delta as f64 / base as f64 * 100.0
    }
}

fn in_range(dt: NaiveDateTime, range: DateRange) -> bool {
    if let Some(start) = range.start
        && dt < start
    {
        return false;
    }
    if let Some(end) = range.end
        && dt > end
    {
        return false;
    }
    true
}

pub fn aggregate(
    now: NaiveDateTime,
    range: DateRange,
    transactions: &[Transaction],
    event_dates: &[NaiveDateTime],
    profile_dates: &[NaiveDateTime],
    subscriptions: &[(UserSubscription, SubscriptionPlan)],
) -> AnalyticsReport {
    // Unseen days are implicitly absent; a BTreeMap keeps the series sorted.
    let mut buckets: BTreeMap<String, DailyMetrics> = BTreeMap::new();

    let mut paid_amounts: Vec<i64> = Vec::new();
    let mut total_revenue: i64 = 0;
    let mut paid_count: i64 = 0;
    let mut cancelled_count: i64 = 0;
    let mut per_plan_revenue: BTreeMap<String, i64> = BTreeMap::new();

    for tx in transactions {
        let Some(created) = tx.created_at else {
            continue;
        };
        if is_paid(tx) {
            paid_count += 1;
            paid_amounts.push(tx.net_amount_cents);
            total_revenue += tx.net_amount_cents;
            let bucket = buckets.entry(day_key(created)).or_default();
            bucket.revenue_cents += tx.net_amount_cents;
            bucket.paid_transactions += 1;
            *per_plan_revenue.entry(tx.plan_name.clone()).or_default() += tx.net_amount_cents;
        } else if is_cancelled(tx) {
            cancelled_count += 1;
            total_revenue -= tx.net_amount_cents;
            let bucket = buckets.entry(day_key(created)).or_default();
            bucket.revenue_cents -= tx.net_amount_cents;
            bucket.cancelled_transactions += 1;
            *per_plan_revenue.entry(tx.plan_name.clone()).or_default() -= tx.net_amount_cents;
        }
    }

    for &date in event_dates {
        buckets.entry(day_key(date)).or_default().new_events += 1;
    }
    for &date in profile_dates.iter().filter(|d| in_range(**d, range)) {
        buckets.entry(day_key(date)).or_default().new_users += 1;
    }

    let total_users = profile_dates.len() as i64;

    let mut active_by_plan: BTreeMap<String, i64> = BTreeMap::new();
    let mut active_subscriptions: i64 = 0;
    for (sub, plan) in subscriptions {
        let unexpired = sub.current_period_end.map(|end| end > now).unwrap_or(false);
        if sub.status == SubscriptionStatus::Active && unexpired && plan.is_paid_tier {
            active_subscriptions += 1;
            *active_by_plan.entry(plan.name.clone()).or_default() += 1;
        }
    }

    let conversion_rate_pct = if total_users > 0 {
        active_subscriptions as f64 / total_users as f64 * 100.0
    } else {
        0.0
    };

    let plan_names: std::collections::BTreeSet<String> = per_plan_revenue
        .keys()
        .cloned()
        .chain(active_by_plan.keys().cloned())
        .collect();
    let subscription_breakdown = plan_names
        .into_iter()
        .map(|name| PlanBreakdown {
            active_subscribers: active_by_plan.get(&name).copied().unwrap_or(0),
            revenue_cents: per_plan_revenue.get(&name).copied().unwrap_or(0).max(0),
            plan_name: name,
        })
        .collect();

    AnalyticsReport {
        total_revenue_cents: total_revenue.max(0),
        total_users,
        total_events: event_dates.len() as i64,
        paid_transaction_count: paid_count,
        cancelled_transaction_count: cancelled_count,
        revenue_mean_cents: mean(&paid_amounts),
        revenue_median_cents: median(&paid_amounts),
        revenue_mode_cents: mode(&paid_amounts),
        user_growth_rate_pct: user_growth_rate_pct(profile_dates),
        active_subscriptions,
        conversion_rate_pct,
        time_series: buckets
            .into_iter()
            .map(|(day, metrics)| DailyBucket { day, metrics })
            .collect(),
        subscription_breakdown,
    }
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct AnalyticsUseCases {
    transaction_repo: Arc<dyn TransactionRepo>,
    analytics_repo: Arc<dyn AnalyticsRepo>,
}

impl AnalyticsUseCases {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepo>,
        analytics_repo: Arc<dyn AnalyticsRepo>,
    ) -> Self {
        Self {
            transaction_repo,
            analytics_repo,
        }
    }

    /// Net revenue per day within the range, ordered by day. Cancellation
    /// rows subtract so refunded revenue drops back out of the series.
    pub async fn daily_net_revenue(
        &self,
        range: DateRange,
    ) -> AppResult<Vec<(chrono::NaiveDate, i64)>> {
        let transactions = self.transaction_repo.list_in_range(range).await?;
        let mut days: BTreeMap<chrono::NaiveDate, i64> = BTreeMap::new();
        for tx in &transactions {
            let Some(created) = tx.created_at else {
                continue;
            };
            let signed = match tx.transaction_type {
                TransactionType::Cancellation => -tx.net_amount_cents,
                TransactionType::Purchase => tx.net_amount_cents,
            };
            *days.entry(created.date()).or_default() += signed;
        }
        Ok(days.into_iter().collect())
    }

    /// Events-per-day counts for one user, ordered by day.
    pub async fn user_event_history(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(chrono::NaiveDate, i64)>> {
        let dates = self.analytics_repo.user_event_dates(user_id).await?;
        let mut days: BTreeMap<chrono::NaiveDate, i64> = BTreeMap::new();
        for date in dates {
            *days.entry(date.date()).or_default() += 1;
        }
        Ok(days.into_iter().collect())
    }

    pub async fn overview(&self, range: DateRange) -> AppResult<AnalyticsReport> {
        let transactions = self.transaction_repo.list_in_range(range).await?;
        let event_dates = self.analytics_repo.event_created_dates(range).await?;
        let profile_dates = self.analytics_repo.profile_created_dates().await?;
        let subscriptions = self.analytics_repo.subscriptions_with_plans().await?;

        Ok(aggregate(
            chrono::Utc::now().naive_utc(),
            range,
            &transactions,
            &event_dates,
            &profile_dates,
            &subscriptions,
        ))
    }
}
