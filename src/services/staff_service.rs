// src/services/staff_service.rs

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditEntry,
        AuditRepository,
        StoreRepository,
        SubscriptionRepository,
        UserRepository,
    },
    models::{
        auth::{User, UserRole},
        staff::{CreateCashierPayload, UpdateCashierPayload},
    },
    services::{auth::hash_password, subscription_service::limit_reached},
};

// RH da loja: os caixas
#[derive(Clone)]
pub struct StaffService {
    user_repo: UserRepository,
    store_repo: StoreRepository,
    subscription_repo: SubscriptionRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl StaffService {
    pub fn new(
        user_repo: UserRepository,
        store_repo: StoreRepository,
        subscription_repo: SubscriptionRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, store_repo, subscription_repo, audit_repo, pool }
    }

    pub async fn list_staff(&self, store_id: Uuid) -> Result<Vec<User>, AppError> {
        self.user_repo.list_cashiers(&self.pool, store_id).await
    }

    pub async fn create_cashier(
        &self,
        merchant: &User,
        store_id: Uuid,
        payload: &CreateCashierPayload,
    ) -> Result<User, AppError> {
        let hashed = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        // A trava da loja serializa a contagem contra o limite do plano
        let store = self.store_repo.lock(&mut *tx, store_id).await?;
        if let Some(plan_id) = store.subscription_plan_id {
            if let Some(plan) = self.subscription_repo.find_plan(&mut *tx, plan_id).await? {
                let current = self.user_repo.count_cashiers(&mut *tx, store_id).await?;
                if limit_reached(plan.max_cashiers, current) {
                    return Err(AppError::PlanLimitReached("max_cashiers".into()));
                }
            }
        }

        let cashier = self
            .user_repo
            .create_user(
                &mut *tx,
                payload.email.trim(),
                &hashed,
                &payload.full_name,
                UserRole::Cashier,
                Some(store_id),
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(merchant.id),
                    action: "staff.create",
                    entity: "user",
                    entity_id: Some(cashier.id),
                    details: json!({ "email": cashier.email }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(cashier)
    }

    pub async fn update_cashier(
        &self,
        merchant: &User,
        store_id: Uuid,
        cashier_id: Uuid,
        payload: &UpdateCashierPayload,
    ) -> Result<User, AppError> {
        let hashed = match &payload.password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let cashier = self
            .user_repo
            .update_cashier(
                &mut *tx,
                store_id,
                cashier_id,
                payload.full_name.as_deref(),
                payload.is_active,
                hashed.as_deref(),
            )
            .await?
            .ok_or(AppError::StaffNotFound)?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(merchant.id),
                    action: "staff.update",
                    entity: "user",
                    entity_id: Some(cashier.id),
                    details: json!({
                        "isActive": cashier.is_active,
                        "passwordChanged": hashed.is_some(),
                    }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(cashier)
    }

    pub async fn delete_cashier(
        &self,
        merchant: &User,
        store_id: Uuid,
        cashier_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.user_repo.soft_delete_cashier(&mut *tx, store_id, cashier_id).await? {
            return Err(AppError::StaffNotFound);
        }

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(merchant.id),
                    action: "staff.delete",
                    entity: "user",
                    entity_id: Some(cashier_id),
                    details: json!({}),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
