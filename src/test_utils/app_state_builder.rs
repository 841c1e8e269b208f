//! Test app state builder for HTTP-level route testing.
//!
//! Builds an `AppState` entirely backed by the in-memory mocks so route
//! tests can run without a database.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        jwt,
        ports::text_generation::TextGenerationPort,
        use_cases::{
            account_deletion::AccountDeletionUseCases, analytics::AnalyticsUseCases,
            billing::BillingUseCases, costs::CostUseCases, notification::NotificationUseCases,
            projections::ProjectionUseCases, ratings::RatingUseCases,
            subscription::SubscriptionUseCases,
        },
    },
    infra::config::AppConfig,
    test_utils::{
        InMemoryAnalyticsRepo, InMemoryCostRepo, InMemoryDeletionRequestRepo, InMemoryRatingRepo,
        InMemoryUserDataRepo, SubscriptionFixture,
    },
};

const TEST_JWT_SECRET: &str = "test_jwt_secret";

/// Issues a token the routes will accept as `Authorization: Bearer <token>`.
pub fn issue_test_token(user_id: Uuid, email: &str) -> String {
    jwt::issue(
        user_id,
        email,
        &SecretString::new(TEST_JWT_SECRET.into()),
        Duration::hours(1),
    )
    .expect("Failed to issue test token")
}

/// Builder for creating `AppState` with in-memory mocks for route tests.
///
/// The mock stores stay accessible through the builder's public fields, so
/// tests keep a clone of the builder's Arcs around for seeding and
/// assertions after `build()`.
pub struct TestAppStateBuilder {
    pub fixture: SubscriptionFixture,
    pub analytics: Arc<InMemoryAnalyticsRepo>,
    pub deletion_requests: Arc<InMemoryDeletionRequestRepo>,
    pub user_data: Arc<InMemoryUserDataRepo>,
    pub ratings: Arc<InMemoryRatingRepo>,
    pub costs: Arc<InMemoryCostRepo>,
    text_generation: Option<Arc<dyn TextGenerationPort>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            fixture: SubscriptionFixture::new(),
            analytics: Arc::new(InMemoryAnalyticsRepo::default()),
            deletion_requests: Arc::new(InMemoryDeletionRequestRepo::default()),
            user_data: Arc::new(InMemoryUserDataRepo::default()),
            ratings: Arc::new(InMemoryRatingRepo::default()),
            costs: Arc::new(InMemoryCostRepo::default()),
            text_generation: None,
        }
    }

    /// Route the ROI projection through a canned text-generation port.
    pub fn with_text_generation(mut self, port: Arc<dyn TextGenerationPort>) -> Self {
        self.text_generation = Some(port);
        self
    }

    pub fn build(&self) -> AppState {
        let notification_use_cases = NotificationUseCases::new(self.fixture.notifications.clone());
        let billing_use_cases = BillingUseCases::new(self.fixture.transactions.clone());

        let subscription_use_cases = SubscriptionUseCases::new(
            self.fixture.plans.clone(),
            self.fixture.subscriptions.clone(),
            self.fixture.deleted_history.clone(),
            self.fixture.profiles.clone(),
            self.fixture.event_counts.clone(),
            billing_use_cases.clone(),
            notification_use_cases.clone(),
        );

        let analytics_use_cases =
            AnalyticsUseCases::new(self.fixture.transactions.clone(), self.analytics.clone());

        let projection_use_cases = ProjectionUseCases::new(self.text_generation.clone());

        let account_deletion_use_cases = AccountDeletionUseCases::new(
            self.deletion_requests.clone(),
            self.user_data.clone(),
            self.fixture.deleted_history.clone(),
            self.fixture.profiles.clone(),
            notification_use_cases.clone(),
        );

        let rating_use_cases = RatingUseCases::new(self.ratings.clone());
        let cost_use_cases = CostUseCases::new(self.costs.clone());

        let config = Arc::new(AppConfig {
            jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
            access_token_ttl: Duration::hours(24),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            database_url: String::new(),
            db_max_connections: 1,
            cohere_api_key: None,
            cohere_api_url: Url::parse("https://api.cohere.com/v2/chat").unwrap(),
            cohere_model: "command-r".to_string(),
        });

        AppState {
            config,
            subscription_use_cases: Arc::new(subscription_use_cases),
            billing_use_cases: Arc::new(billing_use_cases),
            analytics_use_cases: Arc::new(analytics_use_cases),
            projection_use_cases: Arc::new(projection_use_cases),
            account_deletion_use_cases: Arc::new(account_deletion_use_cases),
            notification_use_cases: Arc::new(notification_use_cases),
            rating_use_cases: Arc::new(rating_use_cases),
            cost_use_cases: Arc::new(cost_use_cases),
            profile_repo: self.fixture.profiles.clone(),
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
