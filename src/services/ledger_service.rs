// src/services/ledger_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditEntry, ledger_repo::NewTransaction, AuditRepository, CustomerRepository,
        LedgerRepository,
    },
    models::{
        auth::User,
        customer::CustomerStoreRelation,
        ledger::{
            AdjustBalancePayload, BalanceRequest, CustomerTransaction, DepositPayload, LedgerKind,
            RequestStatus,
        },
    },
};

/// Saldo depois do lançamento. Nenhum lançamento deixa o saldo negativo.
pub fn next_balance(current: Decimal, amount: Decimal) -> Result<Decimal, AppError> {
    let next = current + amount;
    if next < Decimal::ZERO {
        return Err(AppError::InsufficientBalance);
    }
    Ok(next)
}

/// Lança no livro-razão e atualiza o saldo do vínculo, que já deve estar travado
/// (`lock_relation`) na mesma transação.
pub async fn post_to_ledger(
    customer_repo: &CustomerRepository,
    ledger_repo: &LedgerRepository,
    conn: &mut PgConnection,
    relation: &mut CustomerStoreRelation,
    mut entry: NewTransaction<'_>,
) -> Result<CustomerTransaction, AppError> {
    entry.balance_after = next_balance(relation.balance, entry.amount)?;

    customer_repo.set_balance(&mut *conn, relation.id, entry.balance_after).await?;
    let tx = ledger_repo.insert_transaction(&mut *conn, &entry).await?;

    relation.balance = entry.balance_after;
    Ok(tx)
}

#[derive(Clone)]
pub struct LedgerService {
    ledger_repo: LedgerRepository,
    customer_repo: CustomerRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl LedgerService {
    pub fn new(
        ledger_repo: LedgerRepository,
        customer_repo: CustomerRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { ledger_repo, customer_repo, audit_repo, pool }
    }

    /// Depósito no balcão.
    pub async fn deposit(
        &self,
        user: &User,
        store_id: Uuid,
        customer_id: Uuid,
        payload: &DepositPayload,
    ) -> Result<CustomerTransaction, AppError> {
        if payload.amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;
        let mut relation = self.customer_repo.lock_relation(&mut *tx, store_id, customer_id).await?;

        let mut entry = NewTransaction::new(
            store_id,
            customer_id,
            LedgerKind::Deposit,
            payload.amount,
        );
        entry.description = payload.note.as_deref();
        entry.created_by = Some(user.id);

        let posted = post_to_ledger(
            &self.customer_repo,
            &self.ledger_repo,
            &mut *tx,
            &mut relation,
            entry,
        ).await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "balance.deposit",
                    entity: "customer",
                    entity_id: Some(customer_id),
                    details: json!({
                        "amount": payload.amount,
                        "balanceAfter": posted.balance_after
                    }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(posted)
    }

    /// Ajuste manual (sinalizado).
    pub async fn adjust(
        &self,
        user: &User,
        store_id: Uuid,
        customer_id: Uuid,
        payload: &AdjustBalancePayload,
    ) -> Result<CustomerTransaction, AppError> {
        if payload.amount.is_zero() {
            return Err(AppError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;
        let mut relation = self.customer_repo.lock_relation(&mut *tx, store_id, customer_id).await?;

        let mut entry = NewTransaction::new(
            store_id,
            customer_id,
            LedgerKind::Adjustment,
            payload.amount,
        );
        entry.description = Some(payload.reason.as_str());
        entry.created_by = Some(user.id);

        let posted = post_to_ledger(
            &self.customer_repo,
            &self.ledger_repo,
            &mut *tx,
            &mut relation,
            entry,
        ).await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "balance.adjust",
                    entity: "customer",
                    entity_id: Some(customer_id),
                    details: json!({ "amount": payload.amount, "reason": payload.reason }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(posted)
    }

    pub async fn list_transactions(
        &self,
        store_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerTransaction>, AppError> {
        self.customer_repo
            .find_relation(&self.pool, store_id, customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;

        self.ledger_repo.list_transactions(store_id, customer_id).await
    }

    pub async fn list_requests(
        &self,
        store_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<BalanceRequest>, AppError> {
        self.ledger_repo.list_requests(store_id, status).await
    }

    /// Aprova um depósito pedido pelo portal: credita o saldo e fecha a solicitação.
    pub async fn approve_request(
        &self,
        user: &User,
        store_id: Uuid,
        request_id: Uuid,
    ) -> Result<BalanceRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Trava a solicitação (duas aprovações simultâneas não creditam duas vezes)
        let request = self.ledger_repo.lock_request(&mut *tx, store_id, request_id).await?;
        if request.status != RequestStatus::Pending {
            return Err(AppError::RequestAlreadyProcessed);
        }

        // 2. Trava o saldo e lança o depósito
        let mut relation = self
            .customer_repo
            .lock_relation(&mut *tx, store_id, request.customer_id)
            .await?;

        let mut entry = NewTransaction::new(
            store_id,
            request.customer_id,
            LedgerKind::Deposit,
            request.amount,
        );
        entry.request_id = Some(request.id);
        entry.description = request.reference.as_deref();
        entry.created_by = Some(user.id);

        post_to_ledger(
            &self.customer_repo,
            &self.ledger_repo,
            &mut *tx,
            &mut relation,
            entry,
        ).await?;

        // 3. Fecha a solicitação
        let approved = self
            .ledger_repo
            .review_request(&mut *tx, request.id, RequestStatus::Approved, user.id, None)
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "balance_request.approve",
                    entity: "balance_request",
                    entity_id: Some(request.id),
                    details: json!({ "amount": request.amount, "customerId": request.customer_id }),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!("💰 Depósito {} aprovado ({})", request.id, request.amount);
        Ok(approved)
    }

    pub async fn reject_request(
        &self,
        user: &User,
        store_id: Uuid,
        request_id: Uuid,
        reason: &str,
    ) -> Result<BalanceRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self.ledger_repo.lock_request(&mut *tx, store_id, request_id).await?;
        if request.status != RequestStatus::Pending {
            return Err(AppError::RequestAlreadyProcessed);
        }

        let rejected = self
            .ledger_repo
            .review_request(&mut *tx, request.id, RequestStatus::Rejected, user.id, Some(reason))
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "balance_request.reject",
                    entity: "balance_request",
                    entity_id: Some(request.id),
                    details: json!({ "reason": reason }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn credits_and_debits_move_the_running_balance() {
        assert_eq!(next_balance(dec("10.00"), dec("5.50")).unwrap(), dec("15.50"));
        assert_eq!(next_balance(dec("10.00"), dec("-10.00")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn balance_never_goes_negative() {
        assert!(matches!(
            next_balance(dec("10.00"), dec("-10.01")),
            Err(AppError::InsufficientBalance)
        ));
    }

    #[test]
    fn running_balance_equals_sum_of_amounts() {
        let amounts = ["100", "-45.90", "20", "-74.10", "3.33"].map(dec);
        let mut balance = Decimal::ZERO;
        for amount in amounts {
            balance = next_balance(balance, amount).unwrap();
        }
        assert_eq!(balance, amounts.iter().copied().sum::<Decimal>());
    }
}
