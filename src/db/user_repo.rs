// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário ativo pelo e-mail (sem diferenciar maiúsculas)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE lower(email) = lower($1) AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID (ignora os apagados)
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário. E-mail duplicado vira um erro amigável.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: UserRole,
        store_id: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name, role, store_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .bind(store_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    // ---
    // Funcionários (caixas) de uma loja
    // ---

    pub async fn list_cashiers<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
    ) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE store_id = $1 AND role = 'CASHIER' AND deleted_at IS NULL
            ORDER BY full_name ASC
            "#,
        )
        .bind(store_id)
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    pub async fn count_cashiers<'e, E>(&self, executor: E, store_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE store_id = $1 AND role = 'CASHIER' AND deleted_at IS NULL
            "#,
        )
        .bind(store_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Atualiza só os campos enviados (COALESCE mantém o valor atual).
    pub async fn update_cashier<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        user_id: Uuid,
        full_name: Option<&str>,
        is_active: Option<bool>,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                full_name = COALESCE($3, full_name),
                is_active = COALESCE($4, is_active),
                password_hash = COALESCE($5, password_hash),
                updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND role = 'CASHIER' AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(store_id)
        .bind(full_name)
        .bind(is_active)
        .bind(password_hash)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    pub async fn soft_delete_cashier<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE users SET deleted_at = NOW(), is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND role = 'CASHIER' AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(store_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // Visão da plataforma: todos os usuários vivos
    pub async fn list_all<'e, E>(&self, executor: E) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE deleted_at IS NULL ORDER BY created_at DESC",
        )
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    pub async fn exists_platform_admin(&self) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users WHERE role = 'PLATFORM_ADMIN' AND deleted_at IS NULL
            )
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
