use std::sync::Arc;

use crate::{
    application::use_cases::{
        account_deletion::AccountDeletionUseCases,
        analytics::AnalyticsUseCases,
        billing::BillingUseCases,
        costs::CostUseCases,
        notification::NotificationUseCases,
        projections::ProjectionUseCases,
        ratings::RatingUseCases,
        subscription::{ProfileRepo, SubscriptionUseCases},
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
    pub billing_use_cases: Arc<BillingUseCases>,
    pub analytics_use_cases: Arc<AnalyticsUseCases>,
    pub projection_use_cases: Arc<ProjectionUseCases>,
    pub account_deletion_use_cases: Arc<AccountDeletionUseCases>,
    pub notification_use_cases: Arc<NotificationUseCases>,
    pub rating_use_cases: Arc<RatingUseCases>,
    pub cost_use_cases: Arc<CostUseCases>,
    pub profile_repo: Arc<dyn ProfileRepo>,
}
