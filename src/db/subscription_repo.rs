// src/db/subscription_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        ledger::RequestStatus,
        subscription::{PlanPayload, SubscriptionPlan, SubscriptionRequest},
    },
};

#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Planos
    // ---

    pub async fn list_plans(&self, active_only: bool) -> Result<Vec<SubscriptionPlan>, AppError> {
        let plans = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            SELECT * FROM subscription_plans
            WHERE deleted_at IS NULL AND (NOT $1 OR is_active)
            ORDER BY price ASC, name ASC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(plans)
    }

    pub async fn find_plan<'e, E>(
        &self,
        executor: E,
        plan_id: Uuid,
    ) -> Result<Option<SubscriptionPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            "SELECT * FROM subscription_plans WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(plan_id)
        .fetch_optional(executor)
        .await?;
        Ok(plan)
    }

    pub async fn create_plan<'e, E>(
        &self,
        executor: E,
        payload: &PlanPayload,
    ) -> Result<SubscriptionPlan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            INSERT INTO subscription_plans
                (name, description, price, duration_days,
                 max_products, max_cashiers, features, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.duration_days)
        .bind(payload.max_products)
        .bind(payload.max_cashiers)
        .bind(&payload.features)
        .bind(payload.is_active)
        .fetch_one(executor)
        .await?;
        Ok(plan)
    }

    pub async fn update_plan<'e, E>(
        &self,
        executor: E,
        plan_id: Uuid,
        payload: &PlanPayload,
    ) -> Result<SubscriptionPlan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            UPDATE subscription_plans SET
                name = $2, description = $3, price = $4, duration_days = $5,
                max_products = $6, max_cashiers = $7, features = $8, is_active = $9,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(plan_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.duration_days)
        .bind(payload.max_products)
        .bind(payload.max_cashiers)
        .bind(&payload.features)
        .bind(payload.is_active)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::PlanNotFound)
    }

    pub async fn soft_delete_plan<'e, E>(
        &self,
        executor: E,
        plan_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE subscription_plans SET deleted_at = NOW(), is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(plan_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Solicitações de assinatura
    // ---

    /// O índice parcial garante no máximo uma solicitação PENDING por loja.
    pub async fn create_request<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
        plan_id: Uuid,
        payment_reference: Option<&str>,
        notes: Option<&str>,
        requested_by: Uuid,
    ) -> Result<SubscriptionRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SubscriptionRequest>(
            r#"
            INSERT INTO subscription_requests
                (store_id, plan_id, payment_reference, notes, requested_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(store_id)
        .bind(plan_id)
        .bind(payment_reference)
        .bind(notes)
        .bind(requested_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::PendingRequestExists;
                }
            }
            e.into()
        })
    }

    pub async fn find_pending_for_store<'e, E>(
        &self,
        executor: E,
        store_id: Uuid,
    ) -> Result<Option<SubscriptionRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, SubscriptionRequest>(
            "SELECT * FROM subscription_requests WHERE store_id = $1 AND status = 'PENDING'",
        )
        .bind(store_id)
        .fetch_optional(executor)
        .await?;
        Ok(request)
    }

    pub async fn list_requests_for_store(
        &self,
        store_id: Uuid,
    ) -> Result<Vec<SubscriptionRequest>, AppError> {
        let requests = sqlx::query_as::<_, SubscriptionRequest>(
            "SELECT * FROM subscription_requests WHERE store_id = $1 ORDER BY created_at DESC",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<SubscriptionRequest>, AppError> {
        let requests = sqlx::query_as::<_, SubscriptionRequest>(
            r#"
            SELECT * FROM subscription_requests
            WHERE ($1::request_status IS NULL OR status = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn lock_request<'e, E>(
        &self,
        executor: E,
        request_id: Uuid,
    ) -> Result<SubscriptionRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SubscriptionRequest>(
            "SELECT * FROM subscription_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RequestNotFound)
    }

    /// Fecha a solicitação. O motivo da recusa é anexado às notas.
    pub async fn review_request<'e, E>(
        &self,
        executor: E,
        request_id: Uuid,
        status: RequestStatus,
        reviewed_by: Uuid,
        reason: Option<&str>,
    ) -> Result<SubscriptionRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SubscriptionRequest>(
            r#"
            UPDATE subscription_requests SET
                status = $2, reviewed_by = $3, reviewed_at = NOW(),
                notes = CASE WHEN $4::text IS NULL THEN notes ELSE CONCAT_WS(' | ', notes, $4) END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(status)
        .bind(reviewed_by)
        .bind(reason)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::RequestNotFound)
    }
}
