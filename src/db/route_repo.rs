// src/db/route_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::routes::{RouteDay, RouteTemplate},
};

// Uma linha por (funcionário, dia)
#[derive(Debug, FromRow)]
struct TemplateDayRow {
    weekday: String,
    client_ids: Vec<Uuid>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct RouteRepository;

impl RouteRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_template<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
    ) -> Result<RouteTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, TemplateDayRow>(
            r#"
            SELECT weekday, client_ids, updated_at
            FROM route_templates
            WHERE employee_id = $1
            "#,
        )
            .bind(employee_id)
            .fetch_all(executor)
            .await?;

        let mut template = RouteTemplate::empty(employee_id);
        for row in rows {
            // Dias fora de segunda-sexta (dado antigo) são ignorados
            let day = match row.weekday.parse::<RouteDay>() {
                Ok(day) => day,
                Err(_) => {
                    tracing::warn!(weekday = %row.weekday, %employee_id, "Dia de rota desconhecido ignorado");
                    continue;
                }
            };
            template.updated_at = template.updated_at.max(Some(row.updated_at));
            template.days.insert(day, row.client_ids);
        }

        Ok(template)
    }

    // Sobrescreve a lista inteira de um dia (UPSERT)
    pub async fn upsert_day<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        day: RouteDay,
        client_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO route_templates (employee_id, weekday, client_ids)
            VALUES ($1, $2, $3)
            ON CONFLICT (employee_id, weekday)
            DO UPDATE SET
                client_ids = EXCLUDED.client_ids,
                updated_at = NOW()
            "#,
        )
            .bind(employee_id)
            .bind(day.local_name())
            .bind(client_ids)
            .execute(executor)
            .await?;

        Ok(())
    }
}
