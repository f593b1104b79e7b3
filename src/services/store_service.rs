// src/services/store_service.rs

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{audit_repo::AuditEntry, AuditRepository, StoreRepository},
    models::{
        auth::{User, UserRole},
        store::{
            BankAccount,
            CreateBankAccountPayload,
            CreateStorePayload,
            Store,
            UpdateStorePayload,
        },
    },
    services::auth::TRIAL_DAYS,
};

/// Quem pode entrar em qual loja: admin em todas, lojista nas suas, caixa na dele.
pub fn can_access(user: &User, store: &Store) -> bool {
    match user.role {
        UserRole::PlatformAdmin => true,
        UserRole::Merchant => store.owner_id == user.id,
        UserRole::Cashier => user.store_id == Some(store.id),
    }
}

/// Loja de outro dono responde 404 (não revela que existe); loja suspensa, 403.
pub fn check_context(user: &User, store: &Store) -> Result<(), AppError> {
    if !can_access(user, store) {
        tracing::warn!("⛔ Usuário {} tentou acessar a loja {}", user.id, store.id);
        return Err(AppError::StoreNotFound);
    }

    if !store.is_active && user.role != UserRole::PlatformAdmin {
        return Err(AppError::StoreSuspended);
    }
    Ok(())
}

#[derive(Clone)]
pub struct StoreService {
    store_repo: StoreRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl StoreService {
    pub fn new(store_repo: StoreRepository, audit_repo: AuditRepository, pool: PgPool) -> Self {
        Self { store_repo, audit_repo, pool }
    }

    /// Resolve o contexto de loja de uma requisição (guard HTTP e canais IPC).
    pub async fn resolve_context(&self, user: &User, store_id: Uuid) -> Result<Store, AppError> {
        let store = self
            .store_repo
            .find_by_id(store_id)
            .await?
            .ok_or(AppError::StoreNotFound)?;

        check_context(user, &store)?;
        Ok(store)
    }

    pub async fn create_store(
        &self,
        owner: &User,
        payload: &CreateStorePayload,
    ) -> Result<Store, AppError> {
        let mut tx = self.pool.begin().await?;

        let store = self
            .store_repo
            .create_store(
                &mut *tx,
                owner.id,
                &payload.name,
                payload.phone.as_deref(),
                payload.address.as_deref(),
                Utc::now() + chrono::Duration::days(TRIAL_DAYS),
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store.id),
                    user_id: Some(owner.id),
                    action: "store.create",
                    entity: "store",
                    entity_id: Some(store.id),
                    details: json!({ "name": store.name }),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!("🏪 Loja {} criada por {}", store.id, owner.id);
        Ok(store)
    }

    pub async fn update_store(
        &self,
        user: &User,
        store_id: Uuid,
        payload: &UpdateStorePayload,
    ) -> Result<Store, AppError> {
        let mut tx = self.pool.begin().await?;

        let store = self.store_repo.update_settings(&mut *tx, store_id, payload).await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "store.update",
                    entity: "store",
                    entity_id: Some(store_id),
                    details: json!({ "currency": store.currency, "taxRate": store.tax_rate }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(store)
    }

    pub async fn list_bank_accounts(&self, store_id: Uuid) -> Result<Vec<BankAccount>, AppError> {
        self.store_repo.list_bank_accounts(store_id).await
    }

    pub async fn add_bank_account(
        &self,
        store_id: Uuid,
        payload: &CreateBankAccountPayload,
    ) -> Result<BankAccount, AppError> {
        self.store_repo.create_bank_account(&self.pool, store_id, payload).await
    }

    pub async fn remove_bank_account(
        &self,
        store_id: Uuid,
        account_id: Uuid,
    ) -> Result<(), AppError> {
        let removed = self.store_repo.delete_bank_account(&self.pool, store_id, account_id).await?;
        if !removed {
            return Err(AppError::BankAccountNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::store::SubscriptionStatus;
    use rust_decimal::Decimal;

    fn user(role: UserRole, store_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "alguem@loja.com".into(),
            password_hash: String::new(),
            full_name: "Alguém".into(),
            role,
            store_id,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn store(owner_id: Uuid) -> Store {
        Store {
            id: Uuid::new_v4(),
            owner_id,
            name: "Mercadinho".into(),
            phone: None,
            address: None,
            currency: "BRL".into(),
            tax_rate: Decimal::ZERO,
            receipt_footer: None,
            is_active: true,
            subscription_plan_id: None,
            subscription_status: SubscriptionStatus::Trial,
            subscription_expires_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn merchant_only_reaches_owned_stores() {
        let merchant = user(UserRole::Merchant, None);
        assert!(can_access(&merchant, &store(merchant.id)));
        assert!(!can_access(&merchant, &store(Uuid::new_v4())));
    }

    #[test]
    fn cashier_only_reaches_its_store() {
        let shop = store(Uuid::new_v4());
        assert!(can_access(&user(UserRole::Cashier, Some(shop.id)), &shop));
        assert!(!can_access(&user(UserRole::Cashier, Some(Uuid::new_v4())), &shop));
        assert!(!can_access(&user(UserRole::Cashier, None), &shop));
    }

    #[test]
    fn admin_reaches_any_store() {
        assert!(can_access(&user(UserRole::PlatformAdmin, None), &store(Uuid::new_v4())));
    }

    #[test]
    fn another_merchants_store_is_not_found() {
        let merchant = user(UserRole::Merchant, None);
        let cashier = user(UserRole::Cashier, Some(Uuid::new_v4()));
        let foreign = store(Uuid::new_v4());

        assert!(matches!(check_context(&merchant, &foreign), Err(AppError::StoreNotFound)));
        assert!(matches!(check_context(&cashier, &foreign), Err(AppError::StoreNotFound)));
        assert_eq!(AppError::StoreNotFound.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn suspended_store_only_lets_the_admin_in() {
        let merchant = user(UserRole::Merchant, None);
        let mut own = store(merchant.id);
        own.is_active = false;

        assert!(matches!(check_context(&merchant, &own), Err(AppError::StoreSuspended)));
        assert!(check_context(&user(UserRole::PlatformAdmin, None), &own).is_ok());
    }
}
