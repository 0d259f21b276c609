// src/db/staff_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::staff::EmployeeRecord};

#[derive(Clone, Default)]
pub struct StaffRepository;

impl StaffRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_employees<'e, E>(&self, executor: E) -> Result<Vec<EmployeeRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employees = sqlx::query_as::<_, EmployeeRecord>(
            r#"
            SELECT id, full_name, internal_code, auth_uid, legacy_id, hourly_rate, created_at
            FROM employees
            ORDER BY full_name ASC
            "#,
        )
            .fetch_all(executor)
            .await?;

        Ok(employees)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
    ) -> Result<Option<EmployeeRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, EmployeeRecord>(
            r#"
            SELECT id, full_name, internal_code, auth_uid, legacy_id, hourly_rate, created_at
            FROM employees
            WHERE id = $1
            "#,
        )
            .bind(employee_id)
            .fetch_optional(executor)
            .await?;

        Ok(employee)
    }

    // Qualquer alias (id, código interno, uid do provedor, id legado).
    // Em caso de alias repetido vence o primeiro por nome, como no diretório.
    pub async fn find_by_alias<'e, E>(
        &self,
        executor: E,
        alias: &str,
    ) -> Result<Option<EmployeeRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, EmployeeRecord>(
            r#"
            SELECT id, full_name, internal_code, auth_uid, legacy_id, hourly_rate, created_at
            FROM employees
            WHERE id::text = $1 OR internal_code = $1 OR auth_uid = $1 OR legacy_id = $1
            ORDER BY full_name ASC
            LIMIT 1
            "#,
        )
            .bind(alias.trim())
            .fetch_optional(executor)
            .await?;

        Ok(employee)
    }
}
