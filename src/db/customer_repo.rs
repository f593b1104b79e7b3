// src/db/customer_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::customer::{Customer, CustomerMembership, CustomerStoreRelation, StoreCustomer},
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

// Cliente visto pela loja: identidade + saldo + quanto ainda deve
const STORE_CUSTOMER_SELECT: &str = r#"
    SELECT
        c.id, c.full_name, c.phone, c.email, r.balance, r.notes,
        COALESCE((
            SELECT SUM(d.amount - d.paid_amount) FROM due_payments d
            WHERE d.store_id = r.store_id AND d.customer_id = c.id
              AND d.status IN ('PENDING', 'PARTIAL')
        ), 0) AS open_due,
        r.created_at AS joined_at
    FROM customer_store_relations r
    JOIN customers c ON c.id = r.customer_id
    WHERE r.store_id = $1 AND r.deleted_at IS NULL AND c.deleted_at IS NULL
"#;

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Identidade global do cliente
    // ---

    pub async fn find_by_phone<'e, E>(
        &self,
        executor: E,
        phone: &str,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE phone = $1 AND deleted_at IS NULL",
        )
        .bind(phone)
        .fetch_optional(executor)
        .await?;
        Ok(customer)
    }

    pub async fn find_by_id(&self, customer_id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        phone: &str,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (full_name, phone, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .bind(password_hash)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::PhoneAlreadyExists;
                }
            }
            e.into()
        })
    }

    /// O cliente cadastrado no balcão "assume" a conta no portal definindo uma senha.
    pub async fn claim_account<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        full_name: &str,
        password_hash: &str,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET full_name = $2, password_hash = $3, updated_at = NOW()
            WHERE id = $1 AND password_hash IS NULL AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(full_name)
        .bind(password_hash)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::PhoneAlreadyExists)
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        full_name: &str,
        email: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET full_name = $2, email = $3, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(full_name)
        .bind(email)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::CustomerNotFound)
    }

    // ---
    // Vínculo com a loja
    // ---

    pub async fn link_to_store<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        store_id: Uuid,
        notes: Option<&str>,
    ) -> Result<CustomerStoreRelation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CustomerStoreRelation>(
            r#"
            INSERT INTO customer_store_relations (customer_id, store_id, notes)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(store_id)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::CustomerAlreadyInStore;
                }
            }
            e.into()
        })
    }

    pub async fn find_relation<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<CustomerStoreRelation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let relation = sqlx::query_as::<_, CustomerStoreRelation>(
            r#"
            SELECT * FROM customer_store_relations
            WHERE store_id = $1 AND customer_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(store_id)
        .bind(customer_id)
        .fetch_optional(executor)
        .await?;
        Ok(relation)
    }

    /// Trava o vínculo (e portanto o saldo) até o fim da transação.
    pub async fn lock_relation<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<CustomerStoreRelation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CustomerStoreRelation>(
            r#"
            SELECT * FROM customer_store_relations
            WHERE store_id = $1 AND customer_id = $2 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(store_id)
        .bind(customer_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::CustomerNotInStore)
    }

    pub async fn set_balance<'e, E>(
        &self,
        executor: E,
        relation_id: Uuid,
        balance: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE customer_store_relations SET balance = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(relation_id)
        .bind(balance)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn set_notes<'e, E>(
        &self,
        executor: E,
        relation_id: Uuid,
        notes: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE customer_store_relations SET notes = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(relation_id)
        .bind(notes)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn unlink<'e, E>(&self, executor: E, relation_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE customer_store_relations
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(relation_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    // ---
    // Visões
    // ---

    pub async fn list_for_store(
        &self,
        store_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<StoreCustomer>, AppError> {
        let sql = format!(
            r#"{} AND ($2::text IS NULL
                OR c.full_name ILIKE '%' || $2 || '%'
                OR c.phone LIKE '%' || $2 || '%')
            ORDER BY c.full_name ASC"#,
            STORE_CUSTOMER_SELECT
        );

        let customers = sqlx::query_as::<_, StoreCustomer>(&sql)
            .bind(store_id)
            .bind(search)
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    pub async fn get_for_store<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<StoreCustomer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{} AND c.id = $2", STORE_CUSTOMER_SELECT);

        let customer = sqlx::query_as::<_, StoreCustomer>(&sql)
            .bind(store_id)
            .bind(customer_id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    // Lojas (vivas e ativas) onde o cliente tem cadastro
    pub async fn memberships(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerMembership>, AppError> {
        let memberships = sqlx::query_as::<_, CustomerMembership>(
            r#"
            SELECT s.id AS store_id, s.name AS store_name, s.currency,
                   r.balance, r.created_at AS joined_at
            FROM customer_store_relations r
            JOIN stores s ON s.id = r.store_id
            WHERE r.customer_id = $1 AND r.deleted_at IS NULL
              AND s.deleted_at IS NULL AND s.is_active
            ORDER BY s.name ASC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(memberships)
    }
}
