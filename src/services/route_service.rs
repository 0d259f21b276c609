// src/services/route_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        jobs::{JobOrigin, JobStatus, NewScheduledJob},
        routes::{CalendarMonth, ExpansionOutcome, RouteDay, RouteTemplate},
        staff::EmployeeRecord,
    },
};

// Bloco fixo de cada visita gerada (horário local)
pub const VISIT_START: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(t) => t,
    None => panic!("horário inválido"),
};
pub const VISIT_END: NaiveTime = match NaiveTime::from_hms_opt(11, 0, 0) {
    Some(t) => t,
    None => panic!("horário inválido"),
};

pub const UNKNOWN_CLIENT_NAME: &str = "Unknown client";

// Acesso ao armazenamento usado pelo gerador de rotas
#[async_trait]
pub trait RouteStore: Send + Sync {
    async fn load_template(&self, employee_id: Uuid) -> Result<RouteTemplate, AppError>;

    async fn save_day(&self, employee_id: Uuid, day: RouteDay, client_ids: &[Uuid]) -> Result<(), AppError>;

    async fn find_employee(&self, employee_id: Uuid) -> Result<Option<EmployeeRecord>, AppError>;

    async fn client_names(&self, client_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, AppError>;

    /// Grava todos os serviços de uma vez (tudo ou nada). Devolve quantos entraram.
    async fn commit_jobs(&self, jobs: Vec<NewScheduledJob>) -> Result<u64, AppError>;
}

/// Todas as datas do mês que caem no dia da semana pedido.
/// Parte do dia 1, avança dia a dia até acertar o dia e então pula de 7 em 7.
pub fn month_dates_for_weekday(month: CalendarMonth, day: RouteDay) -> Result<Vec<NaiveDate>, AppError> {
    let mut date = month.first_day()?;
    while date.weekday().num_days_from_sunday() != day.sunday_index() {
        date = date.succ_opt().ok_or(AppError::InvalidMonth {
            year: month.year(),
            month: month.month(),
        })?;
    }

    let mut dates = Vec::new();
    while month.contains(date) {
        dates.push(date);
        match date.checked_add_days(Days::new(7)) {
            Some(next) => date = next,
            None => break,
        }
    }

    Ok(dates)
}

pub fn recurring_description(day: RouteDay) -> String {
    format!("Recurring Service ({})", day)
}

/// Expande o modelo semanal em serviços concretos para o mês.
/// Ordem: dia da semana, data, cliente (na ordem do modelo).
pub fn expand_template(
    template: &RouteTemplate,
    month: CalendarMonth,
    employee: &EmployeeRecord,
    client_names: &HashMap<Uuid, String>,
    created_at: DateTime<Utc>,
) -> Result<Vec<NewScheduledJob>, AppError> {
    let mut jobs = Vec::new();

    for day in RouteDay::ALL {
        let client_ids = template.clients_for(day);
        if client_ids.is_empty() {
            continue;
        }

        let description = recurring_description(day);
        for date in month_dates_for_weekday(month, day)? {
            for client_id in client_ids {
                let client_name = client_names
                    .get(client_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_CLIENT_NAME.to_string());

                jobs.push(NewScheduledJob {
                    client_id: *client_id,
                    client_name,
                    employee_ref: Some(employee.id.to_string()),
                    employee_name: employee.full_name.clone(),
                    description: description.clone(),
                    origin: JobOrigin::Template,
                    status: JobStatus::Pending,
                    price: None,
                    scheduled_start: date.and_time(VISIT_START),
                    scheduled_end: date.and_time(VISIT_END),
                    created_at,
                });
            }
        }
    }

    Ok(jobs)
}

#[derive(Clone)]
pub struct RouteService {
    store: Arc<dyn RouteStore>,
}

impl RouteService {
    pub fn new(store: Arc<dyn RouteStore>) -> Self {
        Self { store }
    }

    pub async fn get_template(&self, employee_id: Uuid) -> Result<RouteTemplate, AppError> {
        self.ensure_employee(employee_id).await?;
        self.store.load_template(employee_id).await
    }

    /// Substitui a lista inteira de clientes de um dia.
    pub async fn update_day(
        &self,
        employee_id: Uuid,
        day: RouteDay,
        client_ids: &[Uuid],
    ) -> Result<RouteTemplate, AppError> {
        self.ensure_employee(employee_id).await?;

        // Mesma visita duas vezes no mesmo dia não faz sentido; mantém a primeira posição
        let mut unique: Vec<Uuid> = Vec::with_capacity(client_ids.len());
        for id in client_ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        self.store.save_day(employee_id, day, &unique).await?;
        tracing::info!(%employee_id, day = %day, clients = unique.len(), "🗓️ Rota do dia atualizada");

        self.store.load_template(employee_id).await
    }

    /// Gera os serviços do mês a partir do modelo gravado.
    /// Rodar duas vezes para o mesmo mês duplica os serviços.
    pub async fn generate_month(&self, employee_id: Uuid, month: CalendarMonth) -> Result<ExpansionOutcome, AppError> {
        let employee = self.ensure_employee(employee_id).await?;

        // Sempre relê o modelo do banco
        let template = self.store.load_template(employee_id).await?;
        if template.is_empty() {
            tracing::info!(%employee_id, "Modelo vazio, nada a gerar");
            return Ok(ExpansionOutcome::NothingToGenerate);
        }

        let client_names = self.store.client_names(&template.all_client_ids()).await?;

        let jobs = expand_template(&template, month, &employee, &client_names, Utc::now())?;
        if jobs.is_empty() {
            return Ok(ExpansionOutcome::NothingToGenerate);
        }

        let count = self.store.commit_jobs(jobs).await?;
        tracing::info!(
            %employee_id,
            year = month.year(),
            month = month.month(),
            count,
            "✅ Serviços do mês gerados"
        );

        Ok(ExpansionOutcome::Created { count })
    }

    async fn ensure_employee(&self, employee_id: Uuid) -> Result<EmployeeRecord, AppError> {
        self.store
            .find_employee(employee_id)
            .await?
            .ok_or(AppError::EmployeeNotFound(employee_id))
    }
}
