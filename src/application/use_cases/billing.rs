//! Transaction recorder and billing history.
//!
//! The ledger is append-only: exactly one row per successful payment and one
//! per cancellation/expiry event, never updated afterwards.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::transaction::{Transaction, TransactionStatus, TransactionType},
};

#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub user_id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub plan_name: String,
    pub original_amount_cents: i64,
    pub net_amount_cents: i64,
    pub status: TransactionStatus,
    pub transaction_type: TransactionType,
    pub gateway_payment_id: Option<String>,
    pub gateway_customer_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

#[async_trait]
pub trait TransactionRepo: Send + Sync {
    async fn create(&self, input: &CreateTransactionInput) -> AppResult<Transaction>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Transaction>>;
    async fn list_in_range(&self, range: DateRange) -> AppResult<Vec<Transaction>>;
}

/// Net revenue over a slice of ledger rows: paid amounts minus cancelled
/// amounts, clamped to zero for display.
pub fn net_revenue_cents(transactions: &[Transaction]) -> i64 {
    let mut total: i64 = 0;
    for tx in transactions {
        match tx.status {
            TransactionStatus::Paid => total += tx.net_amount_cents,
            TransactionStatus::Cancelled => total -= tx.net_amount_cents,
        }
    }
    total.max(0)
}

#[derive(Clone)]
pub struct BillingUseCases {
    transaction_repo: Arc<dyn TransactionRepo>,
}

impl BillingUseCases {
    pub fn new(transaction_repo: Arc<dyn TransactionRepo>) -> Self {
        Self { transaction_repo }
    }

    pub async fn record(&self, input: CreateTransactionInput) -> AppResult<Transaction> {
        self.transaction_repo.create(&input).await
    }

    pub async fn history(&self, user_id: Uuid) -> AppResult<Vec<Transaction>> {
        self.transaction_repo.list_by_user(user_id).await
    }
}
