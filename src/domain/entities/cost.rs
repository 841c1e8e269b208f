use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

/// Flat cost-ledger row, admin-only CRUD.
#[derive(Debug, Clone, Serialize)]
pub struct AdminCost {
    pub id: Uuid,
    pub label: String,
    pub amount_cents: i64,
    pub incurred_on: NaiveDate,
    pub created_by: Option<Uuid>,
    pub created_at: Option<NaiveDateTime>,
}
