//! Request authentication helpers shared by the route modules.

use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::jwt,
};

/// Resolves the calling user from the `access_token` cookie, falling back to
/// an `Authorization: Bearer` header for non-browser clients.
pub fn current_user(jar: &CookieJar, headers: &HeaderMap, app_state: &AppState) -> AppResult<Uuid> {
    let token = match jar.get("access_token") {
        Some(cookie) => cookie.value().to_string(),
        None => bearer_token(headers).ok_or(AppError::Unauthorized)?,
    };
    let claims = jwt::verify(&token, &app_state.config.jwt_secret)?;
    claims.user_id()
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Like [`current_user`] but additionally requires an admin profile.
pub async fn require_admin(
    jar: &CookieJar,
    headers: &HeaderMap,
    app_state: &AppState,
) -> AppResult<Uuid> {
    let user_id = current_user(jar, headers, app_state)?;
    if !app_state.profile_repo.is_admin(user_id).await? {
        return Err(AppError::Forbidden);
    }
    Ok(user_id)
}
