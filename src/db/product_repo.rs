// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::product::{CreateProductPayload, Product, ProductQuery, UpdateProductPayload},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

// SKU duplicado (na mesma loja) vira erro amigável
fn map_sku_violation(e: sqlx::Error, sku: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::SkuAlreadyExists(sku.to_string());
        }
    }
    e.into()
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list(
        &self,
        store_id: Uuid,
        query: &ProductQuery,
    ) -> Result<Vec<Product>, AppError> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE store_id = $1
              AND deleted_at IS NULL
              AND ($2 OR is_active)
              AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%' OR sku ILIKE '%' || $3 || '%')
              AND (NOT $4 OR stock <= low_stock_threshold)
            ORDER BY name ASC
            "#,
        )
        .bind(store_id)
        .bind(query.include_inactive)
        .bind(search)
        .bind(query.low_stock_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND store_id = $2 AND deleted_at IS NULL",
        )
        .bind(product_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// Trava os produtos (em ordem de id, para evitar deadlock entre vendas simultâneas).
    /// Ids repetidos ou de outra loja simplesmente não voltam.
    pub async fn lock_many<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        product_ids: &[Uuid],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE store_id = $1 AND id = ANY($2) AND deleted_at IS NULL
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(store_id)
        .bind(product_ids)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    pub async fn count_live<'e, E>(&self, executor: E, store_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE store_id = $1 AND deleted_at IS NULL",
        )
        .bind(store_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sku = payload.sku.trim();

        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (store_id, sku, name, description, category, unit,
                 price, cost_price, stock, low_stock_threshold)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'un'), $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(sku)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.category)
        .bind(&payload.unit)
        .bind(payload.price)
        .bind(payload.cost_price)
        .bind(payload.stock)
        .bind(payload.low_stock_threshold)
        .fetch_one(executor)
        .await
        .map_err(|e| map_sku_violation(e, sku))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        product_id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sku = payload.sku.trim();

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                sku = $3, name = $4, description = $5, category = $6, unit = $7,
                price = $8, low_stock_threshold = $9, is_active = $10, updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(store_id)
        .bind(sku)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.category)
        .bind(&payload.unit)
        .bind(payload.price)
        .bind(payload.low_stock_threshold)
        .bind(payload.is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_sku_violation(e, sku))?
        .ok_or(AppError::ProductNotFound)
    }

    // O SKU fica livre para um novo produto (índice parcial em deleted_at)
    pub async fn soft_delete<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE products SET deleted_at = NOW(), is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(product_id)
        .bind(store_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soma `delta` ao estoque (negativo = saída). Quem chama já validou o saldo.
    /// Soma `delta` ao estoque. Chamar com o produto já travado.
    pub async fn add_stock<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        product_id: Uuid,
        delta: Decimal,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET stock = stock + $3, updated_at = NOW()
            WHERE id = $1 AND store_id = $2
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(store_id)
        .bind(delta)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ProductNotFound)
    }

    /// Entrada de compra: novo estoque e novo custo médio.
    pub async fn receive_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        new_stock: Decimal,
        new_cost: Decimal,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET stock = $2, cost_price = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(new_stock)
        .bind(new_cost)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ProductNotFound)
    }
}
