//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Logger (RUST_LOG, padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env().expect("Configuração inválida.");

    let app_state = AppState::new(&settings)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Primeira foto da agenda para quem assinar o stream
    app_state.calendar_service.republish().await;

    // Relatórios
    let report_routes = Router::new()
        .route("/profitability", get(handlers::reports::get_profitability_report));

    // Rotas semanais dos funcionários
    let route_routes = Router::new()
        .route("/{employee_id}", get(handlers::routes::get_route_template))
        .route("/{employee_id}/days/{weekday}", put(handlers::routes::update_route_day))
        .route("/{employee_id}/generate", post(handlers::routes::generate_month));

    // Agenda
    let calendar_routes = Router::new()
        .route("/", get(handlers::calendar::list_events))
        .route("/jobs", post(handlers::calendar::create_manual_job))
        .route("/stream", get(handlers::calendar::stream_calendar));

    let job_routes = Router::new()
        .route("/{id}/complete", post(handlers::calendar::complete_job));

    // Tudo em /api (menos o health) passa pelo guardião de token
    let protected = Router::new()
        .nest("/reports", report_routes)
        .nest("/routes", route_routes)
        .nest("/calendar", calendar_routes)
        .nest("/jobs", job_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let listener = TcpListener::bind(&settings.bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", settings.bind_addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
