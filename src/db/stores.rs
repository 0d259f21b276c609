// src/db/stores.rs
//
// Implementações Postgres das fontes de dados usadas pelos serviços.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, FinanceRepository, JobRepository, MaterialsRepository, RouteRepository, StaffRepository},
    models::{
        jobs::{JobRecord, NewScheduledJob},
        routes::{RouteDay, RouteTemplate},
        staff::EmployeeRecord,
    },
    services::{
        calendar_service::CalendarStore,
        profitability_service::{ProfitabilitySnapshot, ProfitabilitySource},
        route_service::RouteStore,
    },
};

// =============================================================================
//  1. RENTABILIDADE
// =============================================================================

#[derive(Clone)]
pub struct PgProfitabilitySource {
    pool: PgPool,
    clients: ClientRepository,
    finance: FinanceRepository,
    jobs: JobRepository,
    staff: StaffRepository,
    materials: MaterialsRepository,
}

impl PgProfitabilitySource {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            clients: ClientRepository::new(),
            finance: FinanceRepository::new(),
            jobs: JobRepository::new(),
            staff: StaffRepository::new(),
            materials: MaterialsRepository::new(),
        }
    }
}

#[async_trait]
impl ProfitabilitySource for PgProfitabilitySource {
    async fn load_snapshot(&self) -> Result<ProfitabilitySnapshot, AppError> {
        // As seis leituras em paralelo; a primeira falha cancela o resto
        let (clients, income, completed_jobs, employees, approved_requests, inventory) = tokio::try_join!(
            self.clients.list_clients(&self.pool),
            self.finance.list_income(&self.pool),
            self.jobs.list_completed(&self.pool),
            self.staff.list_employees(&self.pool),
            self.materials.list_approved_requests(&self.pool),
            self.materials.list_inventory(&self.pool),
        )?;

        Ok(ProfitabilitySnapshot {
            clients,
            income,
            completed_jobs,
            employees,
            approved_requests,
            inventory,
        })
    }
}

// =============================================================================
//  2. ROTAS
// =============================================================================

#[derive(Clone)]
pub struct PgRouteStore {
    pool: PgPool,
    routes: RouteRepository,
    staff: StaffRepository,
    clients: ClientRepository,
    jobs: JobRepository,
}

impl PgRouteStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            routes: RouteRepository::new(),
            staff: StaffRepository::new(),
            clients: ClientRepository::new(),
            jobs: JobRepository::new(),
        }
    }
}

#[async_trait]
impl RouteStore for PgRouteStore {
    async fn load_template(&self, employee_id: Uuid) -> Result<RouteTemplate, AppError> {
        self.routes.get_template(&self.pool, employee_id).await
    }

    async fn save_day(&self, employee_id: Uuid, day: RouteDay, client_ids: &[Uuid]) -> Result<(), AppError> {
        self.routes.upsert_day(&self.pool, employee_id, day, client_ids).await
    }

    async fn find_employee(&self, employee_id: Uuid) -> Result<Option<EmployeeRecord>, AppError> {
        self.staff.find_by_id(&self.pool, employee_id).await
    }

    async fn client_names(&self, client_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, AppError> {
        self.clients.find_names(&self.pool, client_ids).await
    }

    async fn commit_jobs(&self, jobs: Vec<NewScheduledJob>) -> Result<u64, AppError> {
        // Lote atômico: ou entram todos, ou nenhum (rollback no drop)
        let mut tx = self.pool.begin().await?;

        for job in &jobs {
            self.jobs.insert_job(&mut *tx, job).await?;
        }

        tx.commit().await?;
        Ok(jobs.len() as u64)
    }
}

// =============================================================================
//  3. AGENDA
// =============================================================================

#[derive(Clone)]
pub struct PgCalendarStore {
    pool: PgPool,
    jobs: JobRepository,
    staff: StaffRepository,
}

impl PgCalendarStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            jobs: JobRepository::new(),
            staff: StaffRepository::new(),
        }
    }
}

#[async_trait]
impl CalendarStore for PgCalendarStore {
    async fn jobs_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
        employee_refs: Option<&[String]>,
    ) -> Result<Vec<JobRecord>, AppError> {
        self.jobs.list_scheduled_between(&self.pool, from, to, employee_refs).await
    }

    async fn find_employee_by_alias(&self, alias: &str) -> Result<Option<EmployeeRecord>, AppError> {
        self.staff.find_by_alias(&self.pool, alias).await
    }

    async fn insert_job(&self, job: NewScheduledJob) -> Result<JobRecord, AppError> {
        self.jobs.insert_job(&self.pool, &job).await
    }

    async fn complete_job(&self, job_id: Uuid, price: Option<Decimal>) -> Result<JobRecord, AppError> {
        self.jobs.complete_job(&self.pool, job_id, price).await
    }
}
