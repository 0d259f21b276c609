// src/handlers/routes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::routes::{CalendarMonth, ExpansionOutcome, RouteDay, RouteTemplate},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteDayPayload {
    // Ordem de visita do dia; lista vazia limpa o dia
    #[validate(length(max = 100, message = "Máximo de 100 clientes por dia."))]
    pub client_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GenerateMonthQuery {
    #[validate(range(min = 2000, max = 2100, message = "Ano fora do intervalo."))]
    pub year: Option<i32>,
    #[validate(range(min = 1, max = 12, message = "Mês deve ser de 1 a 12."))]
    pub month: Option<u32>,
}

impl GenerateMonthQuery {
    // Sem parâmetros: mês corrente (hora local)
    pub fn target_month(&self) -> Result<CalendarMonth, AppError> {
        let current = CalendarMonth::current();
        CalendarMonth::new(
            self.year.unwrap_or(current.year()),
            self.month.unwrap_or(current.month()),
        )
    }
}

// GET /api/routes/{employee_id}
#[utoipa::path(
    get,
    path = "/api/routes/{employee_id}",
    tag = "Routes",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Modelo semanal do funcionário", body = RouteTemplate),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_route_template(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let template = app_state
        .route_service
        .get_template(employee_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(template)))
}

// PUT /api/routes/{employee_id}/days/{weekday}
#[utoipa::path(
    put,
    path = "/api/routes/{employee_id}/days/{weekday}",
    tag = "Routes",
    request_body = UpdateRouteDayPayload,
    params(
        ("employee_id" = Uuid, Path, description = "ID do funcionário"),
        ("weekday" = String, Path, description = "Lunes..Viernes (ou Monday..Friday)")
    ),
    responses(
        (status = 200, description = "Dia substituído; devolve o modelo inteiro", body = RouteTemplate),
        (status = 400, description = "Dia ou payload inválido"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_route_day(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((employee_id, weekday)): Path<(Uuid, String)>,
    Json(payload): Json<UpdateRouteDayPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let day: RouteDay = weekday
        .parse()
        .map_err(|e: AppError| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::debug!(actor = %user.0.sub, %employee_id, day = %day, "Atualizando rota");

    let template = app_state
        .route_service
        .update_day(employee_id, day, &payload.client_ids)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(template)))
}

// POST /api/routes/{employee_id}/generate
#[utoipa::path(
    post,
    path = "/api/routes/{employee_id}/generate",
    tag = "Routes",
    params(
        ("employee_id" = Uuid, Path, description = "ID do funcionário"),
        GenerateMonthQuery
    ),
    responses(
        (status = 201, description = "Serviços do mês criados", body = ExpansionOutcome),
        (status = 200, description = "Modelo vazio, nada gerado", body = ExpansionOutcome),
        (status = 404, description = "Funcionário não encontrado"),
        (status = 500, description = "Lote não gravado (nenhum serviço criado)")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_month(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<GenerateMonthQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let month = query
        .target_month()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!(actor = %user.0.sub, %employee_id, "Gerando serviços do mês");

    let outcome = app_state
        .route_service
        .generate_month(employee_id, month)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let status = match outcome {
        ExpansionOutcome::Created { .. } => {
            app_state.calendar_service.republish().await;
            StatusCode::CREATED
        }
        ExpansionOutcome::NothingToGenerate => StatusCode::OK,
    };

    Ok((status, Json(outcome)))
}
