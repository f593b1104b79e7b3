// src/db/purchase_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::purchase::{Purchase, PurchaseItem, Supplier, SupplierPayload},
};

// Fornecedores e entradas de mercadoria
#[derive(Clone)]
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Fornecedores
    // ---

    pub async fn list_suppliers(&self, store_id: Uuid) -> Result<Vec<Supplier>, AppError> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE store_id = $1 AND deleted_at IS NULL ORDER BY name ASC",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(suppliers)
    }

    pub async fn find_supplier<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        supplier_id: Uuid,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE id = $1 AND store_id = $2 AND deleted_at IS NULL",
        )
        .bind(supplier_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn create_supplier<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        payload: &SupplierPayload,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (store_id, name, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(&payload.name)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(&payload.address)
        .fetch_one(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn update_supplier<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        supplier_id: Uuid,
        payload: &SupplierPayload,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers SET name = $3, phone = $4, email = $5, address = $6, updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(supplier_id)
        .bind(store_id)
        .bind(&payload.name)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(&payload.address)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::SupplierNotFound)
    }

    pub async fn soft_delete_supplier<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        supplier_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE suppliers SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(supplier_id)
        .bind(store_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soma `delta` ao que a loja deve ao fornecedor.
    pub async fn add_supplier_balance<'e, E>(
        &self,
        executor: E,
        supplier_id: Uuid,
        delta: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE suppliers SET balance = balance + $2, updated_at = NOW() WHERE id = $1")
            .bind(supplier_id)
            .bind(delta)
            .execute(executor)
            .await?;
        Ok(())
    }

    // ---
    // Compras
    // ---

    pub async fn insert_purchase<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        supplier_id: Option<Uuid>,
        reference: Option<&str>,
        total: Decimal,
        paid_amount: Decimal,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases
                (store_id, supplier_id, reference, total, paid_amount, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(supplier_id)
        .bind(reference)
        .bind(total)
        .bind(paid_amount)
        .bind(notes)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(purchase)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        purchase_id: Uuid,
        store_id: Uuid,
        product_id: Uuid,
        quantity: Decimal,
        unit_cost: Decimal,
        line_total: Decimal,
    ) -> Result<PurchaseItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, PurchaseItem>(
            r#"
            INSERT INTO purchase_items
                (purchase_id, store_id, product_id, quantity, unit_cost, line_total)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(purchase_id)
        .bind(store_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_cost)
        .bind(line_total)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_purchases(&self, store_id: Uuid) -> Result<Vec<Purchase>, AppError> {
        let purchases = sqlx::query_as::<_, Purchase>(
            "SELECT * FROM purchases WHERE store_id = $1 ORDER BY created_at DESC",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(purchases)
    }

    pub async fn find_purchase(
        &self,
        store_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<Option<Purchase>, AppError> {
        let purchase = sqlx::query_as::<_, Purchase>(
            "SELECT * FROM purchases WHERE id = $1 AND store_id = $2",
        )
        .bind(purchase_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(purchase)
    }

    pub async fn items(&self, purchase_id: Uuid) -> Result<Vec<PurchaseItem>, AppError> {
        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_items WHERE purchase_id = $1 ORDER BY id",
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    // Nome do fornecedor mesmo que já apagado (histórico)
    pub async fn supplier_name(&self, supplier_id: Uuid) -> Result<Option<String>, AppError> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }
}
