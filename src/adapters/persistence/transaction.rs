use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::billing::{CreateTransactionInput, DateRange, TransactionRepo},
    domain::entities::transaction::Transaction,
};

fn row_to_transaction(row: sqlx::postgres::PgRow) -> Transaction {
    Transaction {
        id: row.get("id"),
        user_id: row.get("user_id"),
        subscription_id: row.get("subscription_id"),
        plan_name: row.get("plan_name"),
        original_amount_cents: row.get("original_amount_cents"),
        net_amount_cents: row.get("net_amount_cents"),
        status: row.get("status"),
        transaction_type: row.get("transaction_type"),
        gateway_payment_id: row.get("gateway_payment_id"),
        gateway_customer_id: row.get("gateway_customer_id"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, subscription_id, plan_name, original_amount_cents, net_amount_cents,
    status, transaction_type, gateway_payment_id, gateway_customer_id, created_at
"#;

#[async_trait]
impl TransactionRepo for PostgresPersistence {
    async fn create(&self, input: &CreateTransactionInput) -> AppResult<Transaction> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO transactions (
                id, user_id, subscription_id, plan_name, original_amount_cents,
                net_amount_cents, status, transaction_type, gateway_payment_id,
                gateway_customer_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(input.subscription_id)
        .bind(&input.plan_name)
        .bind(input.original_amount_cents)
        .bind(input.net_amount_cents)
        .bind(input.status)
        .bind(input.transaction_type)
        .bind(&input.gateway_payment_id)
        .bind(&input.gateway_customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_transaction(row))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transactions WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_transaction).collect())
    }

    async fn list_in_range(&self, range: DateRange) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM transactions
            WHERE ($1::timestamp IS NULL OR created_at >= $1)
              AND ($2::timestamp IS NULL OR created_at <= $2)
            ORDER BY created_at
            "#,
            SELECT_COLS
        ))
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_transaction).collect())
    }
}
