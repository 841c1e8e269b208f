use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::text_generation::TextGenerationPort,
        use_cases::{
            account_deletion::{AccountDeletionUseCases, DeletionRequestRepo, UserDataRepo},
            analytics::{AnalyticsRepo, AnalyticsUseCases},
            billing::{BillingUseCases, TransactionRepo},
            costs::{CostRepo, CostUseCases},
            notification::{NotificationRepo, NotificationUseCases},
            projections::ProjectionUseCases,
            ratings::{RatingRepo, RatingUseCases},
            subscription::{
                DeletedAccountHistoryRepo, EventCountRepo, ProfileRepo, SubscriptionPlanRepo,
                SubscriptionUseCases, UserSubscriptionRepo,
            },
        },
    },
    infra::{cohere_client::CohereClient, config::AppConfig, postgres_persistence},
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(
        postgres_persistence(&config.database_url, config.db_max_connections).await?,
    );

    let profile_repo = postgres_arc.clone() as Arc<dyn ProfileRepo>;
    let notification_use_cases =
        NotificationUseCases::new(postgres_arc.clone() as Arc<dyn NotificationRepo>);
    let billing_use_cases =
        BillingUseCases::new(postgres_arc.clone() as Arc<dyn TransactionRepo>);

    let subscription_use_cases = SubscriptionUseCases::new(
        postgres_arc.clone() as Arc<dyn SubscriptionPlanRepo>,
        postgres_arc.clone() as Arc<dyn UserSubscriptionRepo>,
        postgres_arc.clone() as Arc<dyn DeletedAccountHistoryRepo>,
        profile_repo.clone(),
        postgres_arc.clone() as Arc<dyn EventCountRepo>,
        billing_use_cases.clone(),
        notification_use_cases.clone(),
    );

    let analytics_use_cases = AnalyticsUseCases::new(
        postgres_arc.clone() as Arc<dyn TransactionRepo>,
        postgres_arc.clone() as Arc<dyn AnalyticsRepo>,
    );

    let text_generation = config.cohere_api_key.clone().map(|api_key| {
        Arc::new(CohereClient::new(
            config.cohere_api_url.clone(),
            api_key,
            config.cohere_model.clone(),
        )) as Arc<dyn TextGenerationPort>
    });
    let projection_use_cases = ProjectionUseCases::new(text_generation);

    let account_deletion_use_cases = AccountDeletionUseCases::new(
        postgres_arc.clone() as Arc<dyn DeletionRequestRepo>,
        postgres_arc.clone() as Arc<dyn UserDataRepo>,
        postgres_arc.clone() as Arc<dyn DeletedAccountHistoryRepo>,
        profile_repo.clone(),
        notification_use_cases.clone(),
    );

    let rating_use_cases = RatingUseCases::new(postgres_arc.clone() as Arc<dyn RatingRepo>);
    let cost_use_cases = CostUseCases::new(postgres_arc.clone() as Arc<dyn CostRepo>);

    Ok(AppState {
        config: Arc::new(config),
        subscription_use_cases: Arc::new(subscription_use_cases),
        billing_use_cases: Arc::new(billing_use_cases),
        analytics_use_cases: Arc::new(analytics_use_cases),
        projection_use_cases: Arc::new(projection_use_cases),
        account_deletion_use_cases: Arc::new(account_deletion_use_cases),
        notification_use_cases: Arc::new(notification_use_cases),
        rating_use_cases: Arc::new(rating_use_cases),
        cost_use_cases: Arc::new(cost_use_cases),
        profile_repo,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eventria_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
