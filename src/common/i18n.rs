// src/common/i18n.rs

use std::collections::HashMap;

// Catálogo de mensagens de erro por idioma: (idioma, chave, mensagem)
const CATALOG: &[(&str, &str, &str)] = &[
    // --- en ---
    ("en", "validation_error", "One or more fields are invalid."),
    ("en", "invalid_token", "Invalid or missing authentication token."),
    ("en", "employee_not_found", "Employee not found."),
    ("en", "job_not_found", "Job not found."),
    ("en", "invalid_weekday", "Invalid weekday. Use Monday to Friday."),
    ("en", "invalid_month", "Invalid month."),
    ("en", "invalid_date_range", "The start of the range must be before its end."),
    ("en", "store_unavailable", "The operation could not be completed. Please try again."),
    // --- es ---
    ("es", "validation_error", "Uno o más campos no son válidos."),
    ("es", "invalid_token", "Token de autenticación inválido o ausente."),
    ("es", "employee_not_found", "Empleado no encontrado."),
    ("es", "job_not_found", "Trabajo no encontrado."),
    ("es", "invalid_weekday", "Día inválido. Use de lunes a viernes."),
    ("es", "invalid_month", "Mes inválido."),
    ("es", "invalid_date_range", "El inicio del rango debe ser anterior al final."),
    ("es", "store_unavailable", "No se pudo completar la operación. Inténtelo de nuevo."),
    // --- pt ---
    ("pt", "validation_error", "Um ou mais campos são inválidos."),
    ("pt", "invalid_token", "Token de autenticação inválido ou ausente."),
    ("pt", "employee_not_found", "Funcionário não encontrado."),
    ("pt", "job_not_found", "Serviço não encontrado."),
    ("pt", "invalid_weekday", "Dia inválido. Use de segunda a sexta."),
    ("pt", "invalid_month", "Mês inválido."),
    ("pt", "invalid_date_range", "O início do intervalo deve ser anterior ao fim."),
    ("pt", "store_unavailable", "Não foi possível concluir a operação. Tente novamente."),
];

pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();
        for (lang, key, text) in CATALOG {
            messages.entry(*lang).or_default().insert(*key, *text);
        }
        Self { messages }
    }

    /// Mensagem no idioma pedido; cai para o inglês e, em último caso, na própria chave.
    pub fn translate<'a>(&'a self, lang: &str, key: &'a str) -> &'a str {
        self.messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .copied()
            .unwrap_or(key)
    }
}
