// src/models/calendar.rs

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::jobs::{JobOrigin, JobRecord, JobStatus};

// Evento da agenda: um serviço (gerado pela rota ou manual) já pronto para a tela
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub job_id: Uuid,
    #[schema(example = "Oficinas Centro S.L. · Recurring Service (Monday)")]
    pub title: String,
    #[schema(value_type = String, example = "2026-02-02T09:00:00")]
    pub start: NaiveDateTime,
    #[schema(value_type = String, example = "2026-02-02T11:00:00")]
    pub end: NaiveDateTime,
    pub client_id: Uuid,
    pub employee_ref: Option<String>,
    pub employee_name: String,
    pub origin: JobOrigin,
    pub status: JobStatus,
}

impl From<&JobRecord> for CalendarEvent {
    fn from(job: &JobRecord) -> Self {
        Self {
            job_id: job.id,
            title: format!("{} · {}", job.client_name, job.description),
            start: job.scheduled_start,
            end: job.scheduled_end,
            client_id: job.client_id,
            employee_ref: job.employee_ref.clone(),
            employee_name: job.employee_name.clone(),
            origin: job.origin,
            status: job.status,
        }
    }
}

// Foto completa da agenda publicada aos assinantes.
// Quem recebe substitui a visão inteira (nada de diff).
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSnapshot {
    pub revision: u64,
    #[schema(value_type = Vec<CalendarEvent>)]
    pub events: Arc<Vec<CalendarEvent>>,
}
