// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::reports::{ProfitabilityReport, ReportSort, SortColumn, SortDirection},
};

// ---
// Query: ordenação da tabela
// ---
// `sortBy` + `direction` fixam a ordem; `toggle` aplica um clique de cabeçalho
// sobre essa ordem (mesma coluna inverte, coluna nova começa decrescente).
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    pub sort_by: Option<SortColumn>,
    pub direction: Option<SortDirection>,
    pub toggle: Option<SortColumn>,
}

impl ReportQuery {
    pub fn into_sort(self) -> Option<ReportSort> {
        if self.sort_by.is_none() && self.direction.is_none() && self.toggle.is_none() {
            return None;
        }

        let base = ReportSort::default();
        let mut sort = ReportSort {
            column: self.sort_by.unwrap_or(base.column),
            direction: self.direction.unwrap_or(SortDirection::Desc),
        };
        if let Some(column) = self.toggle {
            sort = sort.select(column);
        }
        Some(sort)
    }
}

// GET /api/reports/profitability
#[utoipa::path(
    get,
    path = "/api/reports/profitability",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Rentabilidade por cliente + totais da carteira", body = ProfitabilityReport),
        (status = 401, description = "Não autorizado"),
        (status = 500, description = "Alguma leitura falhou; nenhum relatório parcial")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profitability_report(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .profitability_service
        .client_report(query.into_sort())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_parameters_means_base_order() {
        assert_eq!(ReportQuery::default().into_sort(), None);
    }

    #[test]
    fn toggle_flips_the_current_column() {
        let query = ReportQuery {
            toggle: Some(SortColumn::Profit),
            ..Default::default()
        };
        assert_eq!(
            query.into_sort(),
            Some(ReportSort { column: SortColumn::Profit, direction: SortDirection::Asc })
        );

        let query = ReportQuery {
            sort_by: Some(SortColumn::Revenue),
            direction: Some(SortDirection::Asc),
            toggle: Some(SortColumn::Margin),
        };
        assert_eq!(
            query.into_sort(),
            Some(ReportSort { column: SortColumn::Margin, direction: SortDirection::Desc })
        );
    }

    #[test]
    fn query_string_uses_camel_case_names() {
        let query: ReportQuery = serde_json::from_str(r#"{"sortBy":"totalCost","direction":"asc"}"#).unwrap();
        assert_eq!(
            query.into_sort(),
            Some(ReportSort { column: SortColumn::TotalCost, direction: SortDirection::Asc })
        );
    }
}
