use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Funcionário {0} não encontrado")]
    EmployeeNotFound(Uuid),

    #[error("Serviço {0} não encontrado")]
    JobNotFound(Uuid),

    #[error("Dia da semana inválido: {0}")]
    InvalidWeekday(String),

    #[error("Mês inválido: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Intervalo de datas inválido")]
    InvalidDateRange,

    // Falha de leitura/escrita no banco. A causa vai para o log,
    // o usuário recebe só a mensagem genérica.
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

// O erro que de fato sai pela API (já traduzido)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::EmployeeNotFound(_) => (StatusCode::NOT_FOUND, "employee_not_found"),
            AppError::JobNotFound(_) => (StatusCode::NOT_FOUND, "job_not_found"),
            AppError::InvalidWeekday(_) => (StatusCode::BAD_REQUEST, "invalid_weekday"),
            AppError::InvalidMonth { .. } => (StatusCode::BAD_REQUEST, "invalid_month"),
            AppError::InvalidDateRange => (StatusCode::BAD_REQUEST, "invalid_date_range"),
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable"),
        }
    }

    /// Converte o erro de domínio na resposta traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();

        if status.is_server_error() {
            // A causa real fica só no log
            tracing::error!(error = %self, "🔥 Operação abortada");
        }

        let details = match self {
            // Todos os detalhes da validação, campo a campo
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::InvalidWeekday(value) => Some(json!({ "weekday": value })),
            AppError::InvalidMonth { year, month } => Some(json!({ "year": year, "month": month })),
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, key).to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Para os pontos sem acesso ao idioma (middlewares), responde no idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::default())
            .into_response()
    }
}
