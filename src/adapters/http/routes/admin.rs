//! Admin-only routes. Every handler goes through the admin guard before
//! touching a use case.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, auth::require_admin, routes::analytics::ForecastResponse},
    app_error::{AppError, AppResult},
    application::use_cases::{
        account_deletion::{BulkAction, BulkSelection},
        billing::DateRange,
        costs::CreateCostInput,
        projections::{Granularity, HistoryPoint, bucket_monthly},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/account-deletion-requests/update", post(update_deletion_requests))
        .route("/account-deletion-requests/delete", post(execute_deletion))
        .route("/analytics", get(get_analytics))
        .route("/analytics/predictions", post(revenue_predictions))
        .route("/roip", post(roi_projection))
        .route("/costs", get(list_costs).post(create_cost))
        .route("/costs/{id}", delete(delete_cost))
        .route("/ratings", get(get_ratings))
        .route("/subscriptions/expire", post(expire_subscriptions))
}

fn to_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateRange {
    DateRange {
        start: start.and_then(|d| d.and_hms_opt(0, 0, 0)),
        end: end.and_then(|d| d.and_hms_opt(23, 59, 59)),
    }
}

fn revenue_points(days: Vec<(NaiveDate, i64)>) -> Vec<HistoryPoint> {
    days.into_iter()
        .map(|(date, value_cents)| HistoryPoint { date, value_cents })
        .collect()
}

// ============================================================================
// Account deletion
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum DeletionAction {
    Approve,
    Deny,
}

#[derive(Deserialize)]
struct UpdateDeletionRequestsBody {
    action: DeletionAction,
    #[serde(default)]
    ids: Option<Vec<Uuid>>,
    #[serde(default)]
    all_pending: bool,
}

#[derive(Serialize)]
struct UpdateDeletionRequestsResponse {
    success: bool,
    updated: usize,
    action: BulkAction,
    message: String,
}

async fn update_deletion_requests(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(body): Json<UpdateDeletionRequestsBody>,
) -> AppResult<impl IntoResponse> {
    require_admin(&jar, &headers, &app_state).await?;

    let action = match body.action {
        DeletionAction::Approve => BulkAction::Approve,
        DeletionAction::Deny => BulkAction::Deny,
    };
    let selection = if body.all_pending {
        BulkSelection::AllPending
    } else {
        BulkSelection::Ids(body.ids.unwrap_or_default())
    };

    let report = app_state
        .account_deletion_use_cases
        .bulk_update(action, selection, Utc::now().naive_utc())
        .await?;

    let verb = match report.action {
        BulkAction::Approve => "approved",
        BulkAction::Deny => "denied",
    };
    Ok(Json(UpdateDeletionRequestsResponse {
        success: true,
        updated: report.updated,
        action: report.action,
        message: format!("{} of {} request(s) {}", report.updated, report.requested, verb),
    }))
}

#[derive(Deserialize)]
struct ExecuteDeletionBody {
    request_id: Option<Uuid>,
    user_id: Option<Uuid>,
}

async fn execute_deletion(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(body): Json<ExecuteDeletionBody>,
) -> AppResult<impl IntoResponse> {
    require_admin(&jar, &headers, &app_state).await?;

    let request_id = match (body.request_id, body.user_id) {
        (Some(request_id), _) => request_id,
        (None, Some(user_id)) => app_state
            .account_deletion_use_cases
            .latest_request_for_user(user_id)
            .await?
            .ok_or(AppError::NotFound)?
            .id,
        (None, None) => {
            return Err(AppError::InvalidInput(
                "request_id or user_id is required".into(),
            ));
        }
    };

    let outcome = app_state
        .account_deletion_use_cases
        .complete(request_id, Utc::now().naive_utc())
        .await?;

    let status = if outcome.completed {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(outcome)))
}

// ============================================================================
// Analytics and projections
// ============================================================================

#[derive(Deserialize)]
struct AnalyticsQuery {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

async fn get_analytics(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&jar, &headers, &app_state).await?;

    let report = app_state
        .analytics_use_cases
        .overview(to_range(query.start, query.end))
        .await?;

    Ok(Json(report))
}

#[derive(Deserialize, Default)]
struct PredictionsBody {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

/// Month-bucketed revenue forecast, arithmetic path only.
async fn revenue_predictions(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Option<Json<PredictionsBody>>,
) -> AppResult<impl IntoResponse> {
    require_admin(&jar, &headers, &app_state).await?;
    let Json(body) = body.unwrap_or_default();

    let days = app_state
        .analytics_use_cases
        .daily_net_revenue(to_range(body.start, body.end))
        .await?;
    let monthly = bucket_monthly(&revenue_points(days));

    let outcome = app_state
        .projection_use_cases
        .forecast(&monthly, Granularity::Monthly);

    Ok(Json(ForecastResponse::from(outcome)))
}

/// ROI projection; delegates to the text-generation API when configured.
async fn roi_projection(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Option<Json<PredictionsBody>>,
) -> AppResult<impl IntoResponse> {
    require_admin(&jar, &headers, &app_state).await?;
    let Json(body) = body.unwrap_or_default();

    let days = app_state
        .analytics_use_cases
        .daily_net_revenue(to_range(body.start, body.end))
        .await?;

    let outcome = app_state
        .projection_use_cases
        .forecast_roi(&revenue_points(days))
        .await?;

    Ok(Json(ForecastResponse::from(outcome)))
}

// ============================================================================
// Costs
// ============================================================================

async fn list_costs(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    require_admin(&jar, &headers, &app_state).await?;

    let costs = app_state.cost_use_cases.list().await?;

    Ok(Json(costs))
}

#[derive(Deserialize)]
struct CreateCostBody {
    label: String,
    amount_cents: i64,
    incurred_on: NaiveDate,
}

async fn create_cost(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(body): Json<CreateCostBody>,
) -> AppResult<impl IntoResponse> {
    let admin_id = require_admin(&jar, &headers, &app_state).await?;

    let cost = app_state
        .cost_use_cases
        .create(CreateCostInput {
            label: body.label,
            amount_cents: body.amount_cents,
            incurred_on: body.incurred_on,
            created_by: Some(admin_id),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(cost)))
}

async fn delete_cost(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    require_admin(&jar, &headers, &app_state).await?;

    app_state.cost_use_cases.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Ratings and subscription sweep
// ============================================================================

async fn get_ratings(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    require_admin(&jar, &headers, &app_state).await?;

    let summary = app_state.rating_use_cases.summary().await?;

    Ok(Json(summary))
}

async fn expire_subscriptions(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    require_admin(&jar, &headers, &app_state).await?;

    let report = app_state
        .subscription_use_cases
        .auto_cancel_expired()
        .await?;

    Ok(Json(report))
}
