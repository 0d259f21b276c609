// src/models/materials.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "material_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MaterialRequestStatus {
    Pending,
    Approved,
    Rejected,
}

// Pedido de material feito pela equipe para um cliente
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub id: Uuid,
    pub client_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub status: MaterialRequestStatus,
    pub created_at: DateTime<Utc>,
}

// Tabela de preços do estoque. O nome do produto é a chave de junção.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub product_name: String,
    pub unit_price: Decimal,
}
