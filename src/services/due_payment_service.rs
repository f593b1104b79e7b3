// src/services/due_payment_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditEntry,
        ledger_repo::NewTransaction,
        AuditRepository,
        CustomerRepository,
        LedgerRepository,
    },
    models::{
        auth::User,
        due_payment::{DuePayment, DueQuery, DueSettlementMethod, DueStatus, PayDuePayload},
        ledger::LedgerKind,
    },
    services::ledger_service::post_to_ledger,
};

/// Novo valor pago e novo status depois de receber `payment`.
pub fn apply_payment(
    amount: Decimal,
    paid_amount: Decimal,
    status: DueStatus,
    payment: Decimal,
) -> Result<(Decimal, DueStatus), AppError> {
    if !status.is_open() {
        return Err(AppError::DuePaymentSettled);
    }
    if payment <= Decimal::ZERO {
        return Err(AppError::InvalidAmount);
    }
    if payment > amount - paid_amount {
        return Err(AppError::PaymentExceedsDue);
    }

    let new_paid = paid_amount + payment;
    let new_status = if new_paid >= amount { DueStatus::Paid } else { DueStatus::Partial };
    Ok((new_paid, new_status))
}

#[derive(Clone)]
pub struct DuePaymentService {
    ledger_repo: LedgerRepository,
    customer_repo: CustomerRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl DuePaymentService {
    pub fn new(
        ledger_repo: LedgerRepository,
        customer_repo: CustomerRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { ledger_repo, customer_repo, audit_repo, pool }
    }

    pub async fn list_due_payments(
        &self,
        store_id: Uuid,
        query: &DueQuery,
    ) -> Result<Vec<DuePayment>, AppError> {
        self.ledger_repo.list_dues(store_id, query).await
    }

    pub async fn pay_due(
        &self,
        user: &User,
        store_id: Uuid,
        due_id: Uuid,
        payload: &PayDuePayload,
    ) -> Result<DuePayment, AppError> {
        let mut tx = self.pool.begin().await?;

        let due = self.ledger_repo.lock_due(&mut *tx, store_id, due_id).await?;
        let (new_paid, new_status) = apply_payment(
            due.amount,
            due.paid_amount,
            due.status,
            payload.amount,
        )?;

        // Pago com saldo: débito no livro-razão, amarrado à venda de origem
        if payload.method == DueSettlementMethod::Balance {
            let mut relation = self
                .customer_repo
                .lock_relation(&mut *tx, store_id, due.customer_id)
                .await?;

            let mut entry = NewTransaction::new(
                store_id,
                due.customer_id,
                LedgerKind::Payment,
                -payload.amount,
            );
            entry.due_payment_id = Some(due.id);
            entry.sale_id = due.sale_id;
            entry.created_by = Some(user.id);

            post_to_ledger(
                &self.customer_repo,
                &self.ledger_repo,
                &mut *tx,
                &mut relation,
                entry,
            ).await?;
        }

        let updated = self
            .ledger_repo
            .record_due_payment(&mut *tx, due.id, new_paid, new_status)
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "due_payment.pay",
                    entity: "due_payment",
                    entity_id: Some(due.id),
                    details: json!({
                        "amount": payload.amount,
                        "method": payload.method,
                        "status": updated.status,
                    }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn partial_then_full_payment() {
        let (paid, status) = apply_payment(
            dec("100"),
            Decimal::ZERO,
            DueStatus::Pending,
            dec("40"),
        ).unwrap();
        assert_eq!((paid, status), (dec("40"), DueStatus::Partial));

        let (paid, status) = apply_payment(dec("100"), paid, status, dec("60")).unwrap();
        assert_eq!((paid, status), (dec("100"), DueStatus::Paid));
    }

    #[test]
    fn cannot_pay_more_than_remaining() {
        assert!(matches!(
            apply_payment(dec("100"), dec("70"), DueStatus::Partial, dec("30.01")),
            Err(AppError::PaymentExceedsDue)
        ));
    }

    #[test]
    fn settled_dues_refuse_payments() {
        for status in [DueStatus::Paid, DueStatus::Cancelled] {
            assert!(matches!(
                apply_payment(dec("100"), dec("0"), status, dec("1")),
                Err(AppError::DuePaymentSettled)
            ));
        }
    }

    #[test]
    fn zero_payment_is_invalid() {
        assert!(matches!(
            apply_payment(dec("100"), dec("0"), DueStatus::Pending, Decimal::ZERO),
            Err(AppError::InvalidAmount)
        ));
    }
}
