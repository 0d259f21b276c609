// src/handlers/calendar.rs

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        calendar::{CalendarEvent, CalendarSnapshot},
        jobs::JobRecord,
    },
    services::calendar_service::ManualJob,
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// Primeiro dia (inclusivo)
    #[param(value_type = String, example = "2026-02-01")]
    pub from: NaiveDate,
    /// Último dia (inclusivo)
    #[param(value_type = String, example = "2026-02-28")]
    pub to: NaiveDate,
    pub employee_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateManualJobPayload {
    pub client_id: Uuid,

    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    #[schema(example = "Oficinas Centro S.L.")]
    pub client_name: String,

    pub employee_ref: Option<String>,

    #[serde(default)]
    #[schema(example = "Ana Pérez")]
    pub employee_name: String,

    #[validate(length(min = 1, max = 200, message = "A descrição é obrigatória."))]
    #[schema(example = "Limpieza de cristales")]
    pub description: String,

    #[schema(value_type = String, example = "2026-02-03T15:00:00")]
    pub start: NaiveDateTime,
    #[schema(value_type = String, example = "2026-02-03T17:00:00")]
    pub end: NaiveDateTime,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteJobPayload {
    // Preço final cobrado; ausente mantém o anterior
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
}

// GET /api/calendar
#[utoipa::path(
    get,
    path = "/api/calendar",
    tag = "Calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Serviços do período (gerados e manuais) por ordem de início", body = Vec<CalendarEvent>),
        (status = 400, description = "Intervalo inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let events = app_state
        .calendar_service
        .events(query.from, query.to, query.employee_id.as_deref())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(events)))
}

// POST /api/calendar/jobs
#[utoipa::path(
    post,
    path = "/api/calendar/jobs",
    tag = "Calendar",
    request_body = CreateManualJobPayload,
    responses(
        (status = 201, description = "Serviço avulso criado", body = JobRecord),
        (status = 400, description = "Payload inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_manual_job(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateManualJobPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    tracing::debug!(actor = %user.0.sub, client_id = %payload.client_id, "Criando serviço avulso");

    let job = app_state
        .calendar_service
        .create_manual_job(ManualJob {
            client_id: payload.client_id,
            client_name: payload.client_name,
            employee_ref: payload.employee_ref,
            employee_name: payload.employee_name,
            description: payload.description,
            start: payload.start,
            end: payload.end,
            price: payload.price,
        })
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(job)))
}

// POST /api/jobs/{id}/complete
#[utoipa::path(
    post,
    path = "/api/jobs/{id}/complete",
    tag = "Calendar",
    request_body = CompleteJobPayload,
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 200, description = "Serviço marcado como realizado", body = JobRecord),
        (status = 404, description = "Serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_job(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<CompleteJobPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    tracing::debug!(actor = %user.0.sub, %job_id, "Concluindo serviço");

    let job = app_state
        .calendar_service
        .complete_job(job_id, payload.price)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(job)))
}

// GET /api/calendar/stream (SSE)
// Cada evento traz a foto completa do mês corrente; o cliente troca a tela inteira.
#[utoipa::path(
    get,
    path = "/api/calendar/stream",
    tag = "Calendar",
    responses(
        (status = 200, description = "text/event-stream de CalendarSnapshot", body = CalendarSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn stream_calendar(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshots = WatchStream::new(app_state.calendar_service.subscribe());

    let events = snapshots.map(|snapshot| Ok(snapshot_event(&snapshot)));

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn snapshot_event(snapshot: &CalendarSnapshot) -> Event {
    let event = Event::default()
        .event("calendar")
        .id(snapshot.revision.to_string());

    match serde_json::to_string(snapshot) {
        Ok(data) => event.data(data),
        Err(e) => {
            tracing::error!(error = %e, "Falha ao serializar a agenda");
            event.data("{}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_prices_are_rejected() {
        let payload = CompleteJobPayload { price: Some(Decimal::from(-5)) };
        assert!(payload.validate().is_err());

        assert!(CompleteJobPayload::default().validate().is_ok());
        assert!(CompleteJobPayload { price: Some(Decimal::from(60)) }.validate().is_ok());
    }

    #[test]
    fn manual_job_payload_requires_names() {
        let payload: CreateManualJobPayload = serde_json::from_str(
            r#"{
                "clientId": "550e8400-e29b-41d4-a716-446655440000",
                "clientName": "",
                "description": "Limpieza",
                "start": "2026-02-03T15:00:00",
                "end": "2026-02-03T17:00:00"
            }"#,
        )
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("client_name"));
    }
}
