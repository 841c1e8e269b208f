use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub account_type: String,
    pub created_at: Option<NaiveDateTime>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.account_type == "admin"
    }
}
