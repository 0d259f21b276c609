// src/models/routes.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Dias da rota (segunda a sexta) ---
// Gravados no banco com o nome local ("Lunes"...), como nos dados herdados.
// Na entrada aceitamos também o nome em inglês.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum RouteDay {
    #[serde(rename = "Lunes", alias = "Monday")]
    Monday,
    #[serde(rename = "Martes", alias = "Tuesday")]
    Tuesday,
    #[serde(rename = "Miércoles", alias = "Miercoles", alias = "Wednesday")]
    Wednesday,
    #[serde(rename = "Jueves", alias = "Thursday")]
    Thursday,
    #[serde(rename = "Viernes", alias = "Friday")]
    Friday,
}

impl RouteDay {
    pub const ALL: [RouteDay; 5] = [
        RouteDay::Monday,
        RouteDay::Tuesday,
        RouteDay::Wednesday,
        RouteDay::Thursday,
        RouteDay::Friday,
    ];

    /// Nome gravado no banco.
    pub fn local_name(self) -> &'static str {
        match self {
            RouteDay::Monday => "Lunes",
            RouteDay::Tuesday => "Martes",
            RouteDay::Wednesday => "Miércoles",
            RouteDay::Thursday => "Jueves",
            RouteDay::Friday => "Viernes",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            RouteDay::Monday => "Monday",
            RouteDay::Tuesday => "Tuesday",
            RouteDay::Wednesday => "Wednesday",
            RouteDay::Thursday => "Thursday",
            RouteDay::Friday => "Friday",
        }
    }

    /// Índice no calendário com domingo = 0 ... sábado = 6.
    pub fn sunday_index(self) -> u32 {
        match self {
            RouteDay::Monday => 1,
            RouteDay::Tuesday => 2,
            RouteDay::Wednesday => 3,
            RouteDay::Thursday => 4,
            RouteDay::Friday => 5,
        }
    }
}

impl fmt::Display for RouteDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english_name())
    }
}

impl FromStr for RouteDay {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let day = match wanted.as_str() {
            "lunes" | "monday" => RouteDay::Monday,
            "martes" | "tuesday" => RouteDay::Tuesday,
            "miércoles" | "miercoles" | "wednesday" => RouteDay::Wednesday,
            "jueves" | "thursday" => RouteDay::Thursday,
            "viernes" | "friday" => RouteDay::Friday,
            _ => return Err(AppError::InvalidWeekday(s.to_string())),
        };
        Ok(day)
    }
}

// --- Modelo semanal de um funcionário ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteTemplate {
    pub employee_id: Uuid,

    // Dia -> clientes na ordem de visita
    #[schema(value_type = Object, example = json!({"Lunes": ["550e8400-e29b-41d4-a716-446655440000"]}))]
    pub days: BTreeMap<RouteDay, Vec<Uuid>>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl RouteTemplate {
    pub fn empty(employee_id: Uuid) -> Self {
        Self {
            employee_id,
            ..Default::default()
        }
    }

    pub fn clients_for(&self, day: RouteDay) -> &[Uuid] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Verdadeiro quando nenhum dia tem cliente configurado.
    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }

    /// Ids distintos de todos os clientes da semana.
    pub fn all_client_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.days.values().flatten().copied().collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

// --- Mês de calendário (alvo da expansão) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CalendarMonth {
    #[schema(example = 2026)]
    year: i32,
    #[schema(example = 2)]
    month: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, AppError> {
        match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(_) => Ok(Self { year, month }),
            None => Err(AppError::InvalidMonth { year, month }),
        }
    }

    /// Mês corrente no relógio local do servidor.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Result<NaiveDate, AppError> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or(AppError::InvalidMonth {
            year: self.year,
            month: self.month,
        })
    }

    /// Primeiro dia do mês seguinte (limite exclusivo).
    pub fn next_first_day(&self) -> Result<NaiveDate, AppError> {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        CalendarMonth::new(year, month)?.first_day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

// --- Resultado da geração mensal ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExpansionOutcome {
    // Modelo sem dias/clientes: nada é gravado
    NothingToGenerate,
    Created { count: u64 },
}
