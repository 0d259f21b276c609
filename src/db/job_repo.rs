// src/db/job_repo.rs

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::jobs::{JobRecord, JobStatus, NewScheduledJob},
};

const JOB_COLUMNS: &str = r#"
    id, client_id, client_name, employee_ref, employee_name, description,
    origin, status, price, scheduled_start, scheduled_end, created_at
"#;

#[derive(Clone, Default)]
pub struct JobRepository;

impl JobRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_completed<'e, E>(&self, executor: E) -> Result<Vec<JobRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE status = $1");
        let jobs = sqlx::query_as::<_, JobRecord>(&sql)
            .bind(JobStatus::Completed)
            .fetch_all(executor)
            .await?;

        Ok(jobs)
    }

    // Agenda de um intervalo [from, to), opcionalmente filtrada pelos aliases
    // de um funcionário (registros antigos guardam qualquer um deles)
    pub async fn list_scheduled_between<'e, E>(
        &self,
        executor: E,
        from: NaiveDateTime,
        to: NaiveDateTime,
        employee_refs: Option<&[String]>,
    ) -> Result<Vec<JobRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE scheduled_start >= $1
              AND scheduled_start < $2
              AND ($3::text[] IS NULL OR employee_ref = ANY($3))
            ORDER BY scheduled_start ASC, client_name ASC
            "#
        );
        let jobs = sqlx::query_as::<_, JobRecord>(&sql)
            .bind(from)
            .bind(to)
            .bind(employee_refs.map(<[String]>::to_vec))
            .fetch_all(executor)
            .await?;

        Ok(jobs)
    }

    pub async fn insert_job<'e, E>(
        &self,
        executor: E,
        job: &NewScheduledJob,
    ) -> Result<JobRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO jobs (
                client_id, client_name, employee_ref, employee_name, description,
                origin, status, price, scheduled_start, scheduled_end, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {JOB_COLUMNS}
            "#
        );
        let record = sqlx::query_as::<_, JobRecord>(&sql)
            .bind(job.client_id)
            .bind(&job.client_name)
            .bind(job.employee_ref.as_deref())
            .bind(&job.employee_name)
            .bind(&job.description)
            .bind(job.origin)
            .bind(job.status)
            .bind(job.price)
            .bind(job.scheduled_start)
            .bind(job.scheduled_end)
            .bind(job.created_at)
            .fetch_one(executor)
            .await?;

        Ok(record)
    }

    // Marca como realizado; o preço informado substitui o anterior
    pub async fn complete_job<'e, E>(
        &self,
        executor: E,
        job_id: Uuid,
        price: Option<Decimal>,
    ) -> Result<JobRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE jobs
            SET status = $2, price = COALESCE($3, price)
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        );
        sqlx::query_as::<_, JobRecord>(&sql)
            .bind(job_id)
            .bind(JobStatus::Completed)
            .bind(price)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::JobNotFound(job_id))
    }
}
