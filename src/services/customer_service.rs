// src/services/customer_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{audit_repo::AuditEntry, AuditRepository, CustomerRepository, LedgerRepository},
    models::{
        auth::User,
        customer::{CreateCustomerPayload, CustomerQuery, StoreCustomer, UpdateCustomerPayload},
    },
};

#[derive(Clone)]
pub struct CustomerService {
    customer_repo: CustomerRepository,
    ledger_repo: LedgerRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(
        customer_repo: CustomerRepository,
        ledger_repo: LedgerRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { customer_repo, ledger_repo, audit_repo, pool }
    }

    /// Cadastra o cliente na loja. O telefone identifica o cliente entre lojas:
    /// se já existir, só cria o vínculo.
    pub async fn create_customer(
        &self,
        user: &User,
        store_id: Uuid,
        payload: &CreateCustomerPayload,
    ) -> Result<StoreCustomer, AppError> {
        let phone = payload.phone.trim();

        let mut tx = self.pool.begin().await?;

        let customer = match self.customer_repo.find_by_phone(&mut *tx, phone).await? {
            Some(existing) => existing,
            None => {
                self.customer_repo
                    .create_customer(
                        &mut *tx,
                        &payload.full_name,
                        phone,
                        payload.email.as_deref(),
                        None,
                    )
                    .await?
            }
        };

        self.customer_repo
            .link_to_store(&mut *tx, customer.id, store_id, payload.notes.as_deref())
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "customer.create",
                    entity: "customer",
                    entity_id: Some(customer.id),
                    details: json!({ "phone": customer.phone }),
                },
            )
            .await?;

        let view = self
            .customer_repo
            .get_for_store(&mut *tx, store_id, customer.id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tx.commit().await?;
        Ok(view)
    }

    pub async fn list_customers(
        &self,
        store_id: Uuid,
        query: &CustomerQuery,
    ) -> Result<Vec<StoreCustomer>, AppError> {
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        self.customer_repo.list_for_store(store_id, search).await
    }

    pub async fn get_customer(
        &self,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<StoreCustomer, AppError> {
        self.customer_repo
            .get_for_store(&self.pool, store_id, customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }

    pub async fn update_customer(
        &self,
        store_id: Uuid,
        customer_id: Uuid,
        payload: &UpdateCustomerPayload,
    ) -> Result<StoreCustomer, AppError> {
        let mut tx = self.pool.begin().await?;

        let relation = self
            .customer_repo
            .find_relation(&mut *tx, store_id, customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        self.customer_repo
            .update_profile(&mut *tx, customer_id, &payload.full_name, payload.email.as_deref())
            .await?;
        self.customer_repo
            .set_notes(&mut *tx, relation.id, payload.notes.as_deref())
            .await?;

        let view = self
            .customer_repo
            .get_for_store(&mut *tx, store_id, customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        tx.commit().await?;
        Ok(view)
    }

    /// Desfaz o vínculo. Recusado enquanto houver saldo ou dívida na loja.
    pub async fn remove_customer(
        &self,
        user: &User,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let relation = self
            .customer_repo
            .lock_relation(&mut *tx, store_id, customer_id)
            .await
            .map_err(|e| match e {
                AppError::CustomerNotInStore => AppError::CustomerNotFound,
                other => other,
            })?;

        let open_due = self.ledger_repo.open_due_total(&mut *tx, store_id, customer_id).await?;
        if !relation.balance.is_zero() || open_due > Decimal::ZERO {
            return Err(AppError::CustomerHasOpenBalance);
        }

        self.customer_repo.unlink(&mut *tx, relation.id).await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "customer.remove",
                    entity: "customer",
                    entity_id: Some(customer_id),
                    details: json!({}),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
