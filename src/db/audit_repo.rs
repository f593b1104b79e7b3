// src/db/audit_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::audit::AuditLog};

/// Uma entrada de auditoria. Gravada na mesma transação da mudança que descreve.
#[derive(Debug)]
pub struct AuditEntry<'a> {
    pub store_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub action: &'a str,
    pub entity: &'a str,
    pub entity_id: Option<Uuid>,
    pub details: Value,
}

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

pub const DEFAULT_AUDIT_LIMIT: i64 = 100;
const MAX_AUDIT_LIMIT: i64 = 1000;

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record<'e, E>(&self, executor: E, entry: AuditEntry<'_>) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (store_id, user_id, action, entity, entity_id, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.store_id)
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.entity)
        .bind(entry.entity_id)
        .bind(entry.details)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// `store_id = None` lista todas as lojas (visão da plataforma).
    pub async fn list(
        &self,
        store_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<AuditLog>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT);

        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE ($1::uuid IS NULL OR store_id = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(store_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
