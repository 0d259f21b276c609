// src/db/client_repo.rs

use std::collections::HashMap;

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::clients::Client};

// Repositório da tabela 'clients'
#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_clients<'e, E>(&self, executor: E) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, monthly_fee, contracted_weekdays, assigned_employee_ref, created_at
            FROM clients
            ORDER BY name ASC
            "#,
        )
            .fetch_all(executor)
            .await?;

        Ok(clients)
    }

    // Nomes para desnormalizar nos serviços gerados (id -> nome)
    pub async fn find_names<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM clients WHERE id = ANY($1)",
        )
            .bind(ids)
            .fetch_all(executor)
            .await?;

        Ok(rows.into_iter().collect())
    }
}
