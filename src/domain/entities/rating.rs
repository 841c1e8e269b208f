use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

/// 0-5 star rating submitted by a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserRating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stars: i16,
    pub comment: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}
