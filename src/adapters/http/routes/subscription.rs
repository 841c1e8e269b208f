use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, auth::current_user},
    app_error::AppResult,
    application::use_cases::subscription::PurchaseInput,
    domain::entities::{subscription_plan::SubscriptionPlan, user_subscription::UserSubscription},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_subscription))
        .route("/limits", get(get_limits))
        .route("/trial", post(activate_trial))
        .route("/cancel", post(cancel_subscription))
        .route("/purchase", post(record_purchase))
        .route("/transactions", get(get_transactions))
}

#[derive(Serialize)]
struct SubscriptionResponse {
    subscription: Option<UserSubscription>,
    plan: Option<SubscriptionPlan>,
}

async fn get_subscription(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&jar, &headers, &app_state)?;

    let current = app_state
        .subscription_use_cases
        .current_with_plan(user_id)
        .await?;
    let (subscription, plan) = match current {
        Some((subscription, plan)) => (Some(subscription), Some(plan)),
        None => (None, None),
    };

    Ok(Json(SubscriptionResponse { subscription, plan }))
}

async fn get_limits(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&jar, &headers, &app_state)?;

    let summary = app_state
        .subscription_use_cases
        .usage_summary(user_id)
        .await?;

    Ok(Json(summary))
}

async fn activate_trial(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&jar, &headers, &app_state)?;

    let subscription = app_state
        .subscription_use_cases
        .activate_trial(user_id)
        .await?;

    Ok(Json(subscription))
}

async fn cancel_subscription(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&jar, &headers, &app_state)?;

    let outcome = app_state.subscription_use_cases.cancel(user_id).await?;

    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct PurchaseRequest {
    plan_name: String,
    original_amount_cents: i64,
    net_amount_cents: i64,
    gateway_payment_id: Option<String>,
    gateway_customer_id: Option<String>,
}

async fn record_purchase(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(body): Json<PurchaseRequest>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&jar, &headers, &app_state)?;

    let subscription = app_state
        .subscription_use_cases
        .record_purchase(
            user_id,
            PurchaseInput {
                plan_name: body.plan_name,
                original_amount_cents: body.original_amount_cents,
                net_amount_cents: body.net_amount_cents,
                gateway_payment_id: body.gateway_payment_id,
                gateway_customer_id: body.gateway_customer_id,
            },
        )
        .await?;

    Ok(Json(subscription))
}

async fn get_transactions(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&jar, &headers, &app_state)?;

    let transactions = app_state.billing_use_cases.history(user_id).await?;

    Ok(Json(transactions))
}
