use axum::{Json, Router, extract::State, http::HeaderMap, response::IntoResponse, routing::post};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    adapters::http::{app_state::AppState, auth::current_user},
    app_error::AppResult,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_rating))
}

#[derive(Deserialize)]
struct SubmitRatingRequest {
    stars: i16,
    comment: Option<String>,
}

async fn submit_rating(
    State(app_state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(body): Json<SubmitRatingRequest>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user(&jar, &headers, &app_state)?;

    let rating = app_state
        .rating_use_cases
        .submit(user_id, body.stars, body.comment)
        .await?;

    Ok(Json(rating))
}
