// src/db/materials_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::materials::{InventoryItem, MaterialRequest, MaterialRequestStatus},
};

#[derive(Clone, Default)]
pub struct MaterialsRepository;

impl MaterialsRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  PEDIDOS DE MATERIAL
    // =========================================================================

    pub async fn list_approved_requests<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<MaterialRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let requests = sqlx::query_as::<_, MaterialRequest>(
            r#"
            SELECT id, client_id, product_name, quantity, status, created_at
            FROM material_requests
            WHERE status = $1
            "#,
        )
            .bind(MaterialRequestStatus::Approved)
            .fetch_all(executor)
            .await?;

        Ok(requests)
    }

    // =========================================================================
    //  ESTOQUE (tabela de preços)
    // =========================================================================

    pub async fn list_inventory<'e, E>(&self, executor: E) -> Result<Vec<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT id, product_name, unit_price FROM inventory_items ORDER BY product_name ASC",
        )
            .fetch_all(executor)
            .await?;

        Ok(items)
    }
}
