// src/services/calendar_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        calendar::{CalendarEvent, CalendarSnapshot},
        jobs::{JobOrigin, JobRecord, JobStatus, NewScheduledJob},
        routes::CalendarMonth,
        staff::EmployeeRecord,
    },
};

#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Serviços com início em [from, to). Com `employee_refs`, só os
    /// atribuídos a um desses identificadores.
    async fn jobs_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
        employee_refs: Option<&[String]>,
    ) -> Result<Vec<JobRecord>, AppError>;

    async fn find_employee_by_alias(&self, alias: &str) -> Result<Option<EmployeeRecord>, AppError>;

    async fn insert_job(&self, job: NewScheduledJob) -> Result<JobRecord, AppError>;

    async fn complete_job(&self, job_id: Uuid, price: Option<Decimal>) -> Result<JobRecord, AppError>;
}

// Dados de um serviço avulso criado pela agenda
#[derive(Debug, Clone)]
pub struct ManualJob {
    pub client_id: Uuid,
    pub client_name: String,
    pub employee_ref: Option<String>,
    pub employee_name: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub price: Option<Decimal>,
}

/// Junta os serviços gerados e os manuais numa lista só, ordenada por início.
/// Um mesmo serviço nunca aparece duas vezes.
pub fn merge_events(jobs: &[JobRecord]) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = jobs.iter().map(CalendarEvent::from).collect();
    events.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.employee_name.cmp(&b.employee_name))
            .then_with(|| a.title.cmp(&b.title))
    });

    let mut seen = std::collections::HashSet::new();
    events.retain(|e| seen.insert(e.job_id));
    events
}

// Datas inclusivas -> [início do primeiro dia, início do dia seguinte ao último)
fn day_window(from: NaiveDate, to: NaiveDate) -> Result<(NaiveDateTime, NaiveDateTime), AppError> {
    if from > to {
        return Err(AppError::InvalidDateRange);
    }
    let end = to.checked_add_days(Days::new(1)).ok_or(AppError::InvalidDateRange)?;
    Ok((from.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN)))
}

#[derive(Clone)]
pub struct CalendarService {
    store: Arc<dyn CalendarStore>,
    feed: Arc<watch::Sender<CalendarSnapshot>>,
}

impl CalendarService {
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        let (feed, _) = watch::channel(CalendarSnapshot::default());
        Self {
            store,
            feed: Arc::new(feed),
        }
    }

    pub async fn events(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        employee_ref: Option<&str>,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let (start, end) = day_window(from, to)?;

        // O filtro aceita qualquer alias e casa com todos os do funcionário
        let refs = match employee_ref.map(str::trim).filter(|r| !r.is_empty()) {
            Some(alias) => Some(match self.store.find_employee_by_alias(alias).await? {
                Some(employee) => employee.aliases(),
                None => vec![alias.to_string()],
            }),
            None => None,
        };

        let jobs = self.store.jobs_between(start, end, refs.as_deref()).await?;
        Ok(merge_events(&jobs))
    }

    pub async fn create_manual_job(&self, job: ManualJob) -> Result<JobRecord, AppError> {
        if job.end <= job.start {
            return Err(AppError::InvalidDateRange);
        }

        let (employee_ref, employee_name) = self
            .canonical_employee(job.employee_ref, job.employee_name)
            .await?;

        let record = self
            .store
            .insert_job(NewScheduledJob {
                client_id: job.client_id,
                client_name: job.client_name,
                employee_ref,
                employee_name,
                description: job.description,
                origin: JobOrigin::Manual,
                status: JobStatus::Pending,
                price: job.price,
                scheduled_start: job.start,
                scheduled_end: job.end,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(job_id = %record.id, client_id = %record.client_id, "📌 Serviço avulso criado");
        self.republish().await;
        Ok(record)
    }

    pub async fn complete_job(&self, job_id: Uuid, price: Option<Decimal>) -> Result<JobRecord, AppError> {
        let record = self.store.complete_job(job_id, price).await?;
        tracing::info!(%job_id, "✅ Serviço concluído");
        self.republish().await;
        Ok(record)
    }

    // Grava sempre o id do funcionário; alias desconhecido fica como veio
    async fn canonical_employee(
        &self,
        employee_ref: Option<String>,
        employee_name: String,
    ) -> Result<(Option<String>, String), AppError> {
        let Some(alias) = employee_ref.as_deref().map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok((None, employee_name));
        };

        match self.store.find_employee_by_alias(alias).await? {
            Some(employee) => {
                let name = if employee_name.trim().is_empty() {
                    employee.full_name
                } else {
                    employee_name
                };
                Ok((Some(employee.id.to_string()), name))
            }
            None => {
                tracing::warn!(employee_ref = %alias, "Funcionário não encontrado, referência mantida como veio");
                Ok((Some(alias.to_string()), employee_name))
            }
        }
    }

    // --- Assinatura (foto completa a cada mudança) ---

    pub fn subscribe(&self) -> watch::Receiver<CalendarSnapshot> {
        self.feed.subscribe()
    }

    /// Relê o mês corrente e publica uma nova foto para os assinantes.
    pub async fn refresh(&self) -> Result<u64, AppError> {
        let month = CalendarMonth::current();
        let (start, end) = (
            month.first_day()?.and_time(NaiveTime::MIN),
            month.next_first_day()?.and_time(NaiveTime::MIN),
        );

        let jobs = self.store.jobs_between(start, end, None).await?;
        let events = Arc::new(merge_events(&jobs));

        let mut revision = 0;
        self.feed.send_modify(|snapshot| {
            snapshot.revision += 1;
            snapshot.events = events;
            revision = snapshot.revision;
        });

        tracing::debug!(revision, "Agenda republicada");
        Ok(revision)
    }

    /// Como `refresh`, mas só registra a falha: a escrita já foi confirmada
    /// e o atraso fica restrito à tela.
    pub async fn republish(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Falha ao republicar a agenda");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryCalendar {
        jobs: Mutex<Vec<JobRecord>>,
        employees: Vec<EmployeeRecord>,
    }

    #[async_trait]
    impl CalendarStore for MemoryCalendar {
        async fn jobs_between(
            &self,
            from: NaiveDateTime,
            to: NaiveDateTime,
            employee_refs: Option<&[String]>,
        ) -> Result<Vec<JobRecord>, AppError> {
            Ok(self
                .jobs
                .lock()
                .unwrap()
                .iter()
                .filter(|j| j.scheduled_start >= from && j.scheduled_start < to)
                .filter(|j| match (employee_refs, &j.employee_ref) {
                    (None, _) => true,
                    (Some(refs), Some(r)) => refs.contains(r),
                    (Some(_), None) => false,
                })
                .cloned()
                .collect())
        }

        async fn find_employee_by_alias(&self, alias: &str) -> Result<Option<EmployeeRecord>, AppError> {
            Ok(self
                .employees
                .iter()
                .find(|e| e.aliases().iter().any(|a| a == alias.trim()))
                .cloned())
        }

        async fn insert_job(&self, job: NewScheduledJob) -> Result<JobRecord, AppError> {
            let record = JobRecord {
                id: Uuid::new_v4(),
                client_id: job.client_id,
                client_name: job.client_name,
                employee_ref: job.employee_ref,
                employee_name: job.employee_name,
                description: job.description,
                origin: job.origin,
                status: job.status,
                price: job.price,
                scheduled_start: job.scheduled_start,
                scheduled_end: job.scheduled_end,
                created_at: job.created_at,
            };
            self.jobs.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn complete_job(&self, job_id: Uuid, price: Option<Decimal>) -> Result<JobRecord, AppError> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs.iter_mut().find(|j| j.id == job_id).ok_or(AppError::JobNotFound(job_id))?;
            job.status = JobStatus::Completed;
            if price.is_some() {
                job.price = price;
            }
            Ok(job.clone())
        }
    }

    fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, 0, 0).unwrap()
    }

    fn manual(day: NaiveDate, hour: u32, client: &str) -> ManualJob {
        ManualJob {
            client_id: Uuid::new_v4(),
            client_name: client.to_string(),
            employee_ref: Some("E-01".to_string()),
            employee_name: "Ana Pérez".to_string(),
            description: "Limpieza profunda".to_string(),
            start: at(day, hour),
            end: at(day, hour + 2),
            price: None,
        }
    }

    fn this_month_day(d: u32) -> NaiveDate {
        CalendarMonth::current().first_day().unwrap().with_day(d).unwrap()
    }

    #[tokio::test]
    async fn events_are_ordered_by_start_and_filtered_by_window() {
        let service = CalendarService::new(Arc::new(MemoryCalendar::default()));
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        service.create_manual_job(manual(day, 14, "Tarde")).await.unwrap();
        service.create_manual_job(manual(day, 8, "Mañana")).await.unwrap();
        service
            .create_manual_job(manual(day.succ_opt().unwrap(), 8, "Fuera"))
            .await
            .unwrap();

        let events = service.events(day, day, None).await.unwrap();
        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Mañana · Limpieza profunda", "Tarde · Limpieza profunda"]);
    }

    #[tokio::test]
    async fn inverted_ranges_are_rejected() {
        let service = CalendarService::new(Arc::new(MemoryCalendar::default()));
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        let err = service.events(day, day.pred_opt().unwrap(), None).await;
        assert!(matches!(err, Err(AppError::InvalidDateRange)));

        let mut job = manual(day, 10, "X");
        job.end = job.start;
        assert!(matches!(service.create_manual_job(job).await, Err(AppError::InvalidDateRange)));
    }

    #[tokio::test]
    async fn every_write_publishes_a_full_snapshot() {
        let service = CalendarService::new(Arc::new(MemoryCalendar::default()));
        let mut rx = service.subscribe();
        assert_eq!(rx.borrow().revision, 0);

        let created = service.create_manual_job(manual(this_month_day(3), 9, "Bar Sol")).await.unwrap();
        rx.changed().await.unwrap();
        {
            let snapshot = rx.borrow_and_update();
            assert_eq!(snapshot.revision, 1);
            assert_eq!(snapshot.events.len(), 1);
            assert_eq!(snapshot.events[0].status, JobStatus::Pending);
        }

        service.complete_job(created.id, Some(Decimal::from(60))).await.unwrap();
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update();
        assert_eq!(snapshot.revision, 2);
        assert_eq!(snapshot.events[0].status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn completing_an_unknown_job_is_a_not_found() {
        let service = CalendarService::new(Arc::new(MemoryCalendar::default()));
        let missing = Uuid::new_v4();
        assert!(matches!(
            service.complete_job(missing, None).await,
            Err(AppError::JobNotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn job_created_under_an_alias_is_listed_by_canonical_id() {
        let ana = EmployeeRecord {
            id: Uuid::new_v4(),
            full_name: "Ana Pérez".to_string(),
            internal_code: Some("E-01".to_string()),
            auth_uid: Some("uid-ana".to_string()),
            legacy_id: None,
            hourly_rate: None,
            created_at: Utc::now(),
        };
        let store = MemoryCalendar {
            employees: vec![ana.clone()],
            ..Default::default()
        };
        let service = CalendarService::new(Arc::new(store));
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        // Criado pelo código interno, sem nome
        let mut job = manual(day, 9, "Bar Sol");
        job.employee_name = String::new();
        let created = service.create_manual_job(job).await.unwrap();
        let canonical = ana.id.to_string();
        assert_eq!(created.employee_ref.as_deref(), Some(canonical.as_str()));
        assert_eq!(created.employee_name, "Ana Pérez");

        // Qualquer alias encontra o serviço
        for filter in [canonical.as_str(), "E-01", "uid-ana"] {
            let events = service.events(day, day, Some(filter)).await.unwrap();
            assert_eq!(events.len(), 1, "filtro {filter}");
        }
        assert!(service.events(day, day, Some("E-99")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_alias_is_kept_as_given() {
        let service = CalendarService::new(Arc::new(MemoryCalendar::default()));
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        let created = service.create_manual_job(manual(day, 9, "Bar Sol")).await.unwrap();
        assert_eq!(created.employee_ref.as_deref(), Some("E-01"));

        let events = service.events(day, day, Some("E-01")).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn merge_keeps_each_job_once() {
        let day = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let job = JobRecord {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            client_name: "Bar Sol".into(),
            employee_ref: None,
            employee_name: "Ana".into(),
            description: "Recurring Service (Monday)".into(),
            origin: JobOrigin::Template,
            status: JobStatus::Pending,
            price: None,
            scheduled_start: at(day, 9),
            scheduled_end: at(day, 11),
            created_at: Utc::now(),
        };

        let events = merge_events(&[job.clone(), job]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Bar Sol · Recurring Service (Monday)");
    }
}
