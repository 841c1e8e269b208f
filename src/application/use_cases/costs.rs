//! Admin cost ledger.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::cost::AdminCost,
};

#[derive(Debug, Clone)]
pub struct CreateCostInput {
    pub label: String,
    pub amount_cents: i64,
    pub incurred_on: NaiveDate,
    pub created_by: Option<Uuid>,
}

#[async_trait]
pub trait CostRepo: Send + Sync {
    async fn create(&self, input: &CreateCostInput) -> AppResult<AdminCost>;
    async fn list(&self) -> AppResult<Vec<AdminCost>>;
    async fn delete(&self, id: Uuid) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct CostUseCases {
    repo: Arc<dyn CostRepo>,
}

impl CostUseCases {
    pub fn new(repo: Arc<dyn CostRepo>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: CreateCostInput) -> AppResult<AdminCost> {
        if input.label.trim().is_empty() {
            return Err(AppError::InvalidInput("Cost label cannot be empty".into()));
        }
        if input.amount_cents < 0 {
            return Err(AppError::InvalidInput(
                "Cost amount cannot be negative".into(),
            ));
        }
        self.repo.create(&input).await
    }

    pub async fn list(&self) -> AppResult<Vec<AdminCost>> {
        self.repo.list().await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let deleted = self.repo.delete(id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
