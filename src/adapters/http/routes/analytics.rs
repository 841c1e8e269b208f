use axum::{Json, Router, extract::State, http::HeaderMap, response::IntoResponse, routing::post};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::{
    adapters::http::{app_state::AppState, auth::current_user},
    app_error::AppResult,
    application::use_cases::projections::{
        Granularity, HistoryPoint, ProjectedPoint, ProjectionOutcome,
    },
};

pub fn router() -> Router<AppState> {
    Router::new().route("/predictions", post(event_predictions))
}

#[derive(Serialize)]
pub(super) struct ForecastResponse {
    pub predictions: Vec<ProjectedPoint>,
    pub growth_rate_pct: f64,
    pub data_quality: &'static str,
    pub method: &'static str,
}

impl From<ProjectionOutcome> for ForecastResponse {
    fn from(outcome: ProjectionOutcome) -> Self {
        Self {
            predictions: outcome.predictions,
            growth_rate_pct: outcome.growth_rate_pct,
            data_quality: outcome.data_quality.as_str(),
            method: outcome.method.as_str(),
        }
    }
}

/// Forecast of the calling user's event-creation activity, six days ahead.
async fn event_predictions(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&jar, &headers, &app_state)?;

    let history = app_state
        .analytics_use_cases
        .user_event_history(user_id)
        .await?;
    let points: Vec<HistoryPoint> = history
        .into_iter()
        .map(|(date, count)| HistoryPoint {
            date,
            value_cents: count,
        })
        .collect();

    let outcome = app_state
        .projection_use_cases
        .forecast(&points, Granularity::Daily);

    Ok(Json(ForecastResponse::from(outcome)))
}
