use axum::Router;

use crate::adapters::http::app_state::AppState;

pub mod admin;
pub mod analytics;
pub mod notifications;
pub mod ratings;
pub mod subscription;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/subscription", subscription::router())
        .nest("/notifications", notifications::router())
        .nest("/analytics", analytics::router())
        .nest("/ratings", ratings::router())
        .nest("/admin", admin::router())
}
