// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,  // Entrada
    Expense, // Saída
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTransaction {
    pub id: Uuid,

    pub kind: TransactionKind,

    // Vínculos. Lançamentos antigos só guardam o nome do cliente,
    // os novos guardam o id. Os dois precisam ser consultados.
    pub client_id: Option<Uuid>,
    #[schema(example = "Oficinas Centro S.L.")]
    pub linked_entity_name: Option<String>,

    #[schema(example = "150.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-02-10")]
    pub occurred_on: NaiveDate,

    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
}
