// src/db/finance_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::finance::{FinancialTransaction, TransactionKind},
};

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    // Só as entradas interessam ao relatório de rentabilidade
    pub async fn list_income<'e, E>(&self, executor: E) -> Result<Vec<FinancialTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transactions = sqlx::query_as::<_, FinancialTransaction>(
            r#"
            SELECT id, kind, client_id, linked_entity_name, amount, occurred_on, description, created_at
            FROM transactions
            WHERE kind = $1
            ORDER BY occurred_on ASC
            "#,
        )
            .bind(TransactionKind::Income)
            .fetch_all(executor)
            .await?;

        Ok(transactions)
    }
}
