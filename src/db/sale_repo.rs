// src/db/sale_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sale::{PaymentMethod, Sale, SaleItem, SaleQuery, SaleSource},
};

/// Cabeçalho de uma venda já calculada, pronto para gravar.
#[derive(Debug)]
pub struct NewSale<'a> {
    pub store_id: Uuid,
    pub invoice_number: i64,
    pub customer_id: Option<Uuid>,
    pub cashier_id: Option<Uuid>,
    pub source: SaleSource,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub paid_amount: Decimal,
    pub due_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<&'a str>,
}

// Linha com nome e custo "congelados" no momento da venda
#[derive(Debug)]
pub struct NewSaleItem<'a> {
    pub sale_id: Uuid,
    pub store_id: Uuid,
    pub product_id: Uuid,
    pub product_name: &'a str,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
    pub discount: Decimal,
    pub line_total: Decimal,
}

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

const DEFAULT_PAGE: i64 = 50;
const MAX_PAGE: i64 = 500;

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Próximo número de nota da loja. Só é seguro com a linha da loja travada.
    pub async fn next_invoice_number<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let next: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(invoice_number), 0) + 1 FROM sales WHERE store_id = $1",
        )
        .bind(store_id)
        .fetch_one(executor)
        .await?;
        Ok(next)
    }

    pub async fn insert_sale<'e, E>(
        &self,
        executor: E,
        sale: &NewSale<'_>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales
                (store_id, invoice_number, customer_id, cashier_id, source, subtotal, discount,
                 tax, total, paid_amount, due_amount, payment_method, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(sale.store_id)
        .bind(sale.invoice_number)
        .bind(sale.customer_id)
        .bind(sale.cashier_id)
        .bind(sale.source)
        .bind(sale.subtotal)
        .bind(sale.discount)
        .bind(sale.tax)
        .bind(sale.total)
        .bind(sale.paid_amount)
        .bind(sale.due_amount)
        .bind(sale.payment_method)
        .bind(sale.notes)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        item: &NewSaleItem<'_>,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items
                (sale_id, store_id, product_id, product_name, quantity,
                 unit_price, unit_cost, discount, line_total)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(item.sale_id)
        .bind(item.store_id)
        .bind(item.product_id)
        .bind(item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.unit_cost)
        .bind(item.discount)
        .bind(item.line_total)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn list(&self, store_id: Uuid, query: &SaleQuery) -> Result<Vec<Sale>, AppError> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
        let offset = query.offset.unwrap_or(0).max(0);

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE store_id = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
              AND ($4::uuid IS NULL OR customer_id = $4)
              AND ($5::sale_status IS NULL OR status = $5)
            ORDER BY created_at DESC, invoice_number DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(store_id)
        .bind(query.from)
        .bind(query.to)
        .bind(query.customer_id)
        .bind(query.status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    // Pedidos do portal de um cliente em uma loja
    pub async fn list_for_customer(
        &self,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE store_id = $1 AND customer_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(store_id)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 AND store_id = $2")
            .bind(sale_id)
            .bind(store_id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn lock<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 AND store_id = $2 FOR UPDATE")
            .bind(sale_id)
            .bind(store_id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::SaleNotFound)
    }

    pub async fn items<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = $1 ORDER BY id",
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn mark_voided<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        voided_by: Uuid,
        reason: &str,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales SET status = 'VOIDED', void_reason = $2, voided_by = $3, voided_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(sale_id)
        .bind(reason)
        .bind(voided_by)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::SaleNotFound)
    }
}
