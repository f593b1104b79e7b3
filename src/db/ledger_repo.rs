// src/db/ledger_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        due_payment::{DuePayment, DueQuery, DueStatus},
        ledger::{BalanceRequest, CustomerTransaction, LedgerKind, RequestStatus},
    },
};

/// Um lançamento a gravar. `balance_after` é preenchido na hora de lançar.
#[derive(Debug)]
pub struct NewTransaction<'a> {
    pub store_id: Uuid,
    pub customer_id: Uuid,
    pub kind: LedgerKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub sale_id: Option<Uuid>,
    pub request_id: Option<Uuid>,
    pub due_payment_id: Option<Uuid>,
    pub description: Option<&'a str>,
    pub created_by: Option<Uuid>,
}

impl<'a> NewTransaction<'a> {
    pub fn new(store_id: Uuid, customer_id: Uuid, kind: LedgerKind, amount: Decimal) -> Self {
        Self {
            store_id,
            customer_id,
            kind,
            amount,
            balance_after: Decimal::ZERO,
            sale_id: None,
            request_id: None,
            due_payment_id: None,
            description: None,
            created_by: None,
        }
    }
}

// Livro-razão do cliente: lançamentos, solicitações de depósito e contas a receber
#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Lançamentos (append-only)
    // ---

    pub async fn insert_transaction<'e, E>(
        &self,
        executor: E,
        entry: &NewTransaction<'_>,
    ) -> Result<CustomerTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tx = sqlx::query_as::<_, CustomerTransaction>(
            r#"
            INSERT INTO customer_transactions
                (store_id, customer_id, kind, amount, balance_after,
                 sale_id, request_id, due_payment_id, description, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(entry.store_id)
        .bind(entry.customer_id)
        .bind(entry.kind)
        .bind(entry.amount)
        .bind(entry.balance_after)
        .bind(entry.sale_id)
        .bind(entry.request_id)
        .bind(entry.due_payment_id)
        .bind(entry.description)
        .bind(entry.created_by)
        .fetch_one(executor)
        .await?;
        Ok(tx)
    }

    pub async fn list_transactions(
        &self,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerTransaction>, AppError> {
        let txs = sqlx::query_as::<_, CustomerTransaction>(
            r#"
            SELECT * FROM customer_transactions
            WHERE store_id = $1 AND customer_id = $2
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(store_id)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(txs)
    }

    /// Lançamentos de saldo ligados a uma venda (para o estorno).
    /// Lançamentos de saldo ligados a uma venda (tipo e valor sinalizado).
    pub async fn sale_postings<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Vec<(LedgerKind, Decimal)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let postings = sqlx::query_as::<_, (LedgerKind, Decimal)>(
            r#"
            SELECT kind, amount FROM customer_transactions
            WHERE sale_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(executor)
        .await?;
        Ok(postings)
    }

    // ---
    // Solicitações de depósito (portal)
    // ---

    pub async fn create_request<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        customer_id: Uuid,
        amount: Decimal,
        bank_account_id: Option<Uuid>,
        reference: Option<&str>,
    ) -> Result<BalanceRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, BalanceRequest>(
            r#"
            INSERT INTO customer_balance_requests
                (store_id, customer_id, amount, bank_account_id, reference)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(customer_id)
        .bind(amount)
        .bind(bank_account_id)
        .bind(reference)
        .fetch_one(executor)
        .await?;
        Ok(request)
    }

    pub async fn lock_request<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        request_id: Uuid,
    ) -> Result<BalanceRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, BalanceRequest>(
            "SELECT * FROM customer_balance_requests WHERE id = $1 AND store_id = $2 FOR UPDATE",
        )
        .bind(request_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RequestNotFound)
    }

    pub async fn list_requests(
        &self,
        store_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<BalanceRequest>, AppError> {
        let requests = sqlx::query_as::<_, BalanceRequest>(
            r#"
            SELECT * FROM customer_balance_requests
            WHERE store_id = $1 AND ($2::request_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(store_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn list_requests_for_customer(
        &self,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<BalanceRequest>, AppError> {
        let requests = sqlx::query_as::<_, BalanceRequest>(
            r#"
            SELECT * FROM customer_balance_requests
            WHERE store_id = $1 AND customer_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(store_id)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn review_request<'e, E>(
        &self,
        executor: E,
        request_id: Uuid,
        status: RequestStatus,
        reviewed_by: Uuid,
        rejection_reason: Option<&str>,
    ) -> Result<BalanceRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, BalanceRequest>(
            r#"
            UPDATE customer_balance_requests
            SET status = $2, reviewed_by = $3, reviewed_at = NOW(), rejection_reason = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(status)
        .bind(reviewed_by)
        .bind(rejection_reason)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RequestNotFound)
    }

    // ---
    // Contas a receber
    // ---

    pub async fn create_due<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        customer_id: Uuid,
        sale_id: Option<Uuid>,
        amount: Decimal,
        due_date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> Result<DuePayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let due = sqlx::query_as::<_, DuePayment>(
            r#"
            INSERT INTO due_payments (store_id, customer_id, sale_id, amount, due_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(customer_id)
        .bind(sale_id)
        .bind(amount)
        .bind(due_date)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(due)
    }

    pub async fn list_dues(
        &self,
        store_id: Uuid,
        query: &DueQuery,
    ) -> Result<Vec<DuePayment>, AppError> {
        let dues = sqlx::query_as::<_, DuePayment>(
            r#"
            SELECT * FROM due_payments
            WHERE store_id = $1
              AND ($2::due_status IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR customer_id = $3)
            ORDER BY due_date ASC NULLS LAST, created_at ASC
            "#,
        )
        .bind(store_id)
        .bind(query.status)
        .bind(query.customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(dues)
    }

    pub async fn lock_due<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        due_id: Uuid,
    ) -> Result<DuePayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, DuePayment>(
            "SELECT * FROM due_payments WHERE id = $1 AND store_id = $2 FOR UPDATE",
        )
        .bind(due_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::DuePaymentNotFound)
    }

    pub async fn record_due_payment<'e, E>(
        &self,
        executor: E,
        due_id: Uuid,
        paid_amount: Decimal,
        status: DueStatus,
    ) -> Result<DuePayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, DuePayment>(
            r#"
            UPDATE due_payments SET paid_amount = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(due_id)
        .bind(paid_amount)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::DuePaymentNotFound)
    }

    /// Cancela o que ainda está aberto de uma venda estornada.
    pub async fn cancel_dues_for_sale<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE due_payments SET status = 'CANCELLED', updated_at = NOW()
            WHERE sale_id = $1 AND status = ANY($2)
            "#,
        )
        .bind(sale_id)
        .bind(&DueStatus::OPEN[..])
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn open_due_total<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount - paid_amount), 0) FROM due_payments
            WHERE store_id = $1 AND customer_id = $2 AND status IN ('PENDING', 'PARTIAL')
            "#,
        )
        .bind(store_id)
        .bind(customer_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}
