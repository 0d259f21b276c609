// src/models/staff.rs

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

// Registro cru da tabela `employees`.
// O valor/hora vem de importações antigas: pode ser número (12.5) ou texto com
// vírgula decimal ("12,50"). Por isso fica em JSONB e é normalizado na ingestão.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: Uuid,
    pub full_name: String,
    pub internal_code: Option<String>,
    pub auth_uid: Option<String>,
    pub legacy_id: Option<String>,
    pub hourly_rate: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl EmployeeRecord {
    /// Todos os identificadores pelos quais este funcionário pode ser referenciado.
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases = vec![self.id.to_string()];
        for alias in [&self.internal_code, &self.auth_uid, &self.legacy_id]
            .into_iter()
            .flatten()
        {
            let alias = alias.trim();
            if !alias.is_empty() {
                aliases.push(alias.to_string());
            }
        }
        aliases
    }
}

/// Teto aceito para o valor/hora. Acima disso o dado é lixo de importação
/// e os produtos do relatório estourariam o `Decimal`.
pub const MAX_HOURLY_RATE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Normaliza o valor/hora para um decimal em [0, MAX_HOURLY_RATE].
/// Qualquer coisa que não dê para interpretar (ou fora da faixa) vira zero.
pub fn normalize_hourly_rate(raw: &Value) -> Decimal {
    let parsed = match raw {
        Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
        Value::String(s) => parse_locale_decimal(s),
        _ => None,
    };

    match parsed {
        Some(rate) if !rate.is_sign_negative() && rate <= MAX_HOURLY_RATE => rate,
        Some(rate) => {
            tracing::warn!(%rate, "Valor/hora fora da faixa, considerado zero");
            Decimal::ZERO
        }
        None => Decimal::ZERO,
    }
}

// "1.234,50" -> 1234.50 | "12,5" -> 12.5 | "12.5" -> 12.5
fn parse_locale_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    Decimal::from_str(&normalized).ok()
}

// Funcionário já resolvido: um id canônico, um valor/hora.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEmployee {
    pub id: Uuid,
    pub full_name: String,
    pub hourly_rate: Decimal,
}

/// Tabela de resolução de aliases montada uma vez por leitura.
/// Qualquer alias (id, código interno, uid do provedor, id legado) aponta
/// para o mesmo funcionário canônico.
#[derive(Debug, Default, Clone)]
pub struct EmployeeDirectory {
    aliases: HashMap<String, Uuid>,
    employees: HashMap<Uuid, ResolvedEmployee>,
}

impl EmployeeDirectory {
    pub fn from_records(records: &[EmployeeRecord]) -> Self {
        let mut directory = Self::default();

        for record in records {
            let hourly_rate = record
                .hourly_rate
                .as_ref()
                .map(normalize_hourly_rate)
                .unwrap_or(Decimal::ZERO);

            directory.employees.insert(
                record.id,
                ResolvedEmployee {
                    id: record.id,
                    full_name: record.full_name.clone(),
                    hourly_rate,
                },
            );

            for alias in record.aliases() {
                // O primeiro dono de um alias vence; duplicidade é dado sujo
                if let Some(owner) = directory.aliases.get(&alias) {
                    if *owner != record.id {
                        tracing::warn!(alias = %alias, "Alias de funcionário duplicado, mantendo o primeiro");
                    }
                    continue;
                }
                directory.aliases.insert(alias, record.id);
            }
        }

        directory
    }

    pub fn resolve(&self, alias: &str) -> Option<&ResolvedEmployee> {
        self.aliases
            .get(alias.trim())
            .and_then(|id| self.employees.get(id))
    }

    /// Valor/hora pelo alias; zero quando ausente ou desconhecido.
    pub fn hourly_rate(&self, alias: Option<&str>) -> Decimal {
        alias
            .and_then(|a| self.resolve(a))
            .map(|e| e.hourly_rate)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}
