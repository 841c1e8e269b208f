use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, auth::current_user},
    app_error::AppResult,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_notifications))
        .route("/read", post(mark_read))
}

async fn get_notifications(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&jar, &headers, &app_state)?;

    let notifications = app_state.notification_use_cases.list(user_id).await?;

    Ok(Json(notifications))
}

#[derive(Deserialize)]
struct MarkReadRequest {
    ids: Vec<Uuid>,
}

#[derive(Serialize)]
struct MarkReadResponse {
    updated: u64,
}

async fn mark_read(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(body): Json<MarkReadRequest>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&jar, &headers, &app_state)?;

    let updated = app_state
        .notification_use_cases
        .mark_read(user_id, &body.ids)
        .await?;

    Ok(Json(MarkReadResponse { updated }))
}
