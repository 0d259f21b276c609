// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Reports ---
        handlers::reports::get_profitability_report,

        // --- Routes ---
        handlers::routes::get_route_template,
        handlers::routes::update_route_day,
        handlers::routes::generate_month,

        // --- Calendar ---
        handlers::calendar::list_events,
        handlers::calendar::create_manual_job,
        handlers::calendar::complete_job,
        handlers::calendar::stream_calendar,
    ),
    components(
        schemas(
            // --- Reports ---
            models::reports::ClientProfitability,
            models::reports::PortfolioTotals,
            models::reports::ProfitabilityReport,
            models::reports::ReportSort,
            models::reports::SortColumn,
            models::reports::SortDirection,

            // --- Routes ---
            models::routes::RouteDay,
            models::routes::RouteTemplate,
            models::routes::CalendarMonth,
            models::routes::ExpansionOutcome,
            handlers::routes::UpdateRouteDayPayload,

            // --- Calendar / Jobs ---
            models::jobs::JobStatus,
            models::jobs::JobOrigin,
            models::jobs::JobRecord,
            models::calendar::CalendarEvent,
            models::calendar::CalendarSnapshot,
            handlers::calendar::CreateManualJobPayload,
            handlers::calendar::CompleteJobPayload,

            // --- Cadastros ---
            models::clients::Client,
            models::finance::TransactionKind,
            models::finance::FinancialTransaction,
        )
    ),
    tags(
        (name = "Reports", description = "Rentabilidade por cliente"),
        (name = "Routes", description = "Rotas semanais e geração mensal de serviços"),
        (name = "Calendar", description = "Agenda de serviços (gerados e avulsos)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_endpoint_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/reports/profitability",
            "/api/routes/{employee_id}",
            "/api/routes/{employee_id}/days/{weekday}",
            "/api/routes/{employee_id}/generate",
            "/api/calendar",
            "/api/calendar/jobs",
            "/api/jobs/{id}/complete",
            "/api/calendar/stream",
        ] {
            assert!(doc.paths.paths.contains_key(path), "faltando {path}");
        }
    }
}
