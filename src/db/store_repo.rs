// src/db/store_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::store::{
        BankAccount, CreateBankAccountPayload, Store, SubscriptionStatus, UpdateStorePayload,
    },
};

#[derive(Clone)]
pub struct StoreRepository {
    pool: PgPool,
}

impl StoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Busca uma loja viva (não apagada), ativa ou suspensa.
    pub async fn find_by_id(&self, store_id: Uuid) -> Result<Option<Store>, AppError> {
        let store = sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(store)
    }

    /// Trava a linha da loja até o fim da transação.
    /// Serializa a numeração de notas e as mudanças de assinatura.
    pub async fn lock<'e, E>(&self, executor: E, store_id: Uuid) -> Result<Store, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(store_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::StoreNotFound)
    }

    pub async fn create_store<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        name: &str,
        phone: Option<&str>,
        address: Option<&str>,
        trial_expires_at: DateTime<Utc>,
    ) -> Result<Store, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let store = sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores
                (owner_id, name, phone, address, subscription_status, subscription_expires_at)
            VALUES ($1, $2, $3, $4, 'TRIAL', $5)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(phone)
        .bind(address)
        .bind(trial_expires_at)
        .fetch_one(executor)
        .await?;
        Ok(store)
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Store>, AppError> {
        let stores = sqlx::query_as::<_, Store>(
            r#"
            SELECT * FROM stores
            WHERE owner_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stores)
    }

    pub async fn list_all(&self) -> Result<Vec<Store>, AppError> {
        let stores = sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE deleted_at IS NULL ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stores)
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        payload: &UpdateStorePayload,
    ) -> Result<Store, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores SET
                name = $2, phone = $3, address = $4, currency = $5,
                tax_rate = $6, receipt_footer = $7, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(&payload.name)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(payload.currency.to_uppercase())
        .bind(payload.tax_rate)
        .bind(&payload.receipt_footer)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::StoreNotFound)
    }

    // Ativa/suspende (ação da plataforma)
    pub async fn set_active<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        is_active: bool,
    ) -> Result<Store, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores SET is_active = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(is_active)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::StoreNotFound)
    }

    pub async fn set_subscription<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        plan_id: Option<Uuid>,
        status: SubscriptionStatus,
        expires_at: DateTime<Utc>,
    ) -> Result<Store, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores SET
                subscription_plan_id = COALESCE($2, subscription_plan_id),
                subscription_status = $3,
                subscription_expires_at = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(plan_id)
        .bind(status)
        .bind(expires_at)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::StoreNotFound)
    }

    // ---
    // Contas bancárias (destino dos depósitos do portal)
    // ---

    pub async fn list_bank_accounts(&self, store_id: Uuid) -> Result<Vec<BankAccount>, AppError> {
        let accounts = sqlx::query_as::<_, BankAccount>(
            r#"
            SELECT * FROM store_bank_accounts
            WHERE store_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    pub async fn find_bank_account<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<BankAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, BankAccount>(
            r#"
            SELECT * FROM store_bank_accounts
            WHERE id = $1 AND store_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(account_id)
        .bind(store_id)
        .fetch_optional(executor)
        .await?;
        Ok(account)
    }

    pub async fn create_bank_account<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        payload: &CreateBankAccountPayload,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, BankAccount>(
            r#"
            INSERT INTO store_bank_accounts
                (store_id, bank_name, account_name, account_number, iban)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(&payload.bank_name)
        .bind(&payload.account_name)
        .bind(&payload.account_number)
        .bind(&payload.iban)
        .fetch_one(executor)
        .await?;
        Ok(account)
    }

    pub async fn delete_bank_account<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        account_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE store_bank_accounts SET deleted_at = NOW()
            WHERE id = $1 AND store_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(account_id)
        .bind(store_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
