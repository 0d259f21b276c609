// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{PgCalendarStore, PgProfitabilitySource, PgRouteStore},
    services::{
        auth::TokenVerifier, calendar_service::CalendarService,
        profitability_service::ProfitabilityService, route_service::RouteService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("AUTH_JWT_SECRET").context("AUTH_JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {raw}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            max_connections,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub token_verifier: TokenVerifier,
    pub i18n_store: Arc<I18nStore>,

    pub profitability_service: ProfitabilityService,
    pub route_service: RouteService,
    pub calendar_service: CalendarService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, settings))
    }

    // --- Monta o gráfico de dependências ---
    fn with_pool(db_pool: PgPool, settings: &Settings) -> Self {
        let profitability_service =
            ProfitabilityService::new(Arc::new(PgProfitabilitySource::new(db_pool.clone())));
        let route_service = RouteService::new(Arc::new(PgRouteStore::new(db_pool.clone())));
        let calendar_service = CalendarService::new(Arc::new(PgCalendarStore::new(db_pool.clone())));

        Self {
            db_pool,
            token_verifier: TokenVerifier::new(&settings.jwt_secret),
            i18n_store: Arc::new(I18nStore::new()),
            profitability_service,
            route_service,
            calendar_service,
        }
    }
}
