// src/services/admin_service.rs

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{audit_repo::AuditEntry, AuditRepository, StoreRepository, UserRepository},
    models::{audit::AuditLog, auth::User, store::Store},
};

#[derive(Clone)]
pub struct AdminService {
    store_repo: StoreRepository,
    user_repo: UserRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl AdminService {
    pub fn new(
        store_repo: StoreRepository,
        user_repo: UserRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { store_repo, user_repo, audit_repo, pool }
    }

    pub async fn list_stores(&self) -> Result<Vec<Store>, AppError> {
        self.store_repo.list_all().await
    }

    /// Suspende ou reativa um inquilino inteiro.
    pub async fn set_store_status(
        &self,
        admin: &User,
        store_id: Uuid,
        is_active: bool,
    ) -> Result<Store, AppError> {
        let mut tx = self.pool.begin().await?;

        self.store_repo.lock(&mut *tx, store_id).await?;
        let store = self.store_repo.set_active(&mut *tx, store_id, is_active).await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store.id),
                    user_id: Some(admin.id),
                    action: if is_active { "store.reactivate" } else { "store.suspend" },
                    entity: "store",
                    entity_id: Some(store.id),
                    details: json!({ "isActive": is_active }),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "🏪 Loja {} agora está {}",
            store.id,
            if is_active { "ativa" } else { "suspensa" },
        );
        Ok(store)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_all(&self.pool).await
    }

    pub async fn list_audit_logs(
        &self,
        store_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> Result<Vec<AuditLog>, AppError> {
        self.audit_repo.list(store_id, limit).await
    }
}
