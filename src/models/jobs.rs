// src/models/jobs.rs

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,   // Agendado
    Completed, // Realizado (entra no custo real)
    Cancelled,
}

// Origem do serviço: gerado pela rota semanal ou criado à mão na agenda
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_origin", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobOrigin {
    Template,
    Manual,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: Uuid,
    pub client_id: Uuid,

    // Snapshot do nome no momento da criação (não acompanha renomeações)
    #[schema(example = "Oficinas Centro S.L.")]
    pub client_name: String,

    // Alias do funcionário; registros antigos guardam o uid do provedor
    pub employee_ref: Option<String>,
    #[schema(example = "Ana Pérez")]
    pub employee_name: String,

    #[schema(example = "Recurring Service (Monday)")]
    pub description: String,

    pub origin: JobOrigin,
    pub status: JobStatus,

    #[schema(example = "60.00")]
    pub price: Option<Decimal>,

    // Horário de parede local (sem fuso)
    #[schema(value_type = String, example = "2026-02-02T09:00:00")]
    pub scheduled_start: NaiveDateTime,
    #[schema(value_type = String, example = "2026-02-02T11:00:00")]
    pub scheduled_end: NaiveDateTime,

    pub created_at: DateTime<Utc>,
}

// Linha a ser inserida (ainda sem id)
#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduledJob {
    pub client_id: Uuid,
    pub client_name: String,
    pub employee_ref: Option<String>,
    pub employee_name: String,
    pub description: String,
    pub origin: JobOrigin,
    pub status: JobStatus,
    pub price: Option<Decimal>,
    pub scheduled_start: NaiveDateTime,
    pub scheduled_end: NaiveDateTime,
    pub created_at: DateTime<Utc>,
}
