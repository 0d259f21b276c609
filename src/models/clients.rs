// src/models/clients.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- CLIENTE (Contrato de limpeza) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Oficinas Centro S.L.")]
    pub name: String,

    // Mensalidade fixa do contrato (None = cobrança avulsa)
    #[schema(example = "450.00")]
    pub monthly_fee: Option<Decimal>,

    // Códigos dos dias contratados ("L", "M", "X"...). Só a quantidade importa
    // para o custo estimado.
    #[schema(example = json!(["L", "X"]))]
    pub contracted_weekdays: Vec<String>,

    // Qualquer alias do funcionário (id interno, uid do provedor, id legado)
    #[schema(example = "emp-0042")]
    pub assigned_employee_ref: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Visitas por semana implicadas pelo contrato.
    pub fn weekly_visits(&self) -> usize {
        self.contracted_weekdays.len()
    }
}
