// src/services/purchase_service.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{audit_repo::AuditEntry, AuditRepository, ProductRepository, PurchaseRepository},
    models::{
        auth::User,
        product::Product,
        purchase::{CreatePurchasePayload, Purchase, PurchaseDetail, Supplier, SupplierPayload},
    },
};

/// Custo médio ponderado depois de uma entrada.
/// Estoque negativo conta como zero; sem quantidade nenhuma, o custo é zero.
pub fn weighted_average_cost(
    current_stock: Decimal,
    current_cost: Decimal,
    incoming_qty: Decimal,
    incoming_cost: Decimal,
) -> Decimal {
    let base_qty = current_stock.max(Decimal::ZERO);
    let new_total_qty = base_qty + incoming_qty;

    if new_total_qty <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ((base_qty * current_cost + incoming_qty * incoming_cost) / new_total_qty).round_dp(4)
}

#[derive(Clone)]
pub struct PurchaseService {
    purchase_repo: PurchaseRepository,
    product_repo: ProductRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl PurchaseService {
    pub fn new(
        purchase_repo: PurchaseRepository,
        product_repo: ProductRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { purchase_repo, product_repo, audit_repo, pool }
    }

    // ---
    // Fornecedores
    // ---

    pub async fn list_suppliers(&self, store_id: Uuid) -> Result<Vec<Supplier>, AppError> {
        self.purchase_repo.list_suppliers(store_id).await
    }

    pub async fn get_supplier(
        &self,
        store_id: Uuid,
        supplier_id: Uuid,
    ) -> Result<Supplier, AppError> {
        self.purchase_repo
            .find_supplier(&self.pool, store_id, supplier_id)
            .await?
            .ok_or(AppError::SupplierNotFound)
    }

    pub async fn create_supplier(
        &self,
        store_id: Uuid,
        payload: &SupplierPayload,
    ) -> Result<Supplier, AppError> {
        self.purchase_repo.create_supplier(&self.pool, store_id, payload).await
    }

    pub async fn update_supplier(
        &self,
        store_id: Uuid,
        supplier_id: Uuid,
        payload: &SupplierPayload,
    ) -> Result<Supplier, AppError> {
        self.purchase_repo.update_supplier(&self.pool, store_id, supplier_id, payload).await
    }

    pub async fn delete_supplier(&self, store_id: Uuid, supplier_id: Uuid) -> Result<(), AppError> {
        if !self.purchase_repo.soft_delete_supplier(&self.pool, store_id, supplier_id).await? {
            return Err(AppError::SupplierNotFound);
        }
        Ok(())
    }

    // ---
    // Compras
    // ---

    /// Entrada de mercadoria: estoque, custo médio e saldo do fornecedor numa transação só.
    pub async fn create_purchase(
        &self,
        user: &User,
        store_id: Uuid,
        payload: &CreatePurchasePayload,
    ) -> Result<PurchaseDetail, AppError> {
        if payload.items.is_empty() {
            return Err(AppError::InvalidQuantity);
        }
        for item in &payload.items {
            if item.quantity <= Decimal::ZERO {
                return Err(AppError::InvalidQuantity);
            }
            if item.unit_cost < Decimal::ZERO {
                return Err(AppError::InvalidAmount);
            }
        }

        let line_totals: Vec<Decimal> = payload
            .items
            .iter()
            .map(|item| (item.quantity * item.unit_cost).round_dp(2))
            .collect();
        let total: Decimal = line_totals.iter().copied().sum();

        let paid = payload.paid_amount.unwrap_or(total);
        if paid < Decimal::ZERO || paid > total {
            return Err(AppError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;

        // 1. Fornecedor (opcional) precisa ser da loja
        let supplier = match payload.supplier_id {
            Some(supplier_id) => Some(
                self.purchase_repo
                    .find_supplier(&mut *tx, store_id, supplier_id)
                    .await?
                    .ok_or(AppError::SupplierNotFound)?,
            ),
            None => None,
        };

        // 2. Trava os produtos (uma vez cada, em ordem de id)
        let mut product_ids: Vec<Uuid> = payload.items.iter().map(|i| i.product_id).collect();
        product_ids.sort();
        product_ids.dedup();

        let mut products: HashMap<Uuid, Product> = self
            .product_repo
            .lock_many(&mut *tx, store_id, &product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // 3. Cabeçalho
        let purchase = self
            .purchase_repo
            .insert_purchase(
                &mut *tx,
                store_id,
                payload.supplier_id,
                payload.reference.as_deref(),
                total,
                paid,
                payload.notes.as_deref(),
                user.id,
            )
            .await?;

        // 4. Linhas: cada uma recalcula o custo médio sobre o estado deixado pela anterior
        let mut items = Vec::with_capacity(payload.items.len());
        for (item, line_total) in payload.items.iter().zip(line_totals) {
            let product = products.get_mut(&item.product_id).ok_or(AppError::ProductNotFound)?;

            let new_cost = weighted_average_cost(
                product.stock,
                product.cost_price,
                item.quantity,
                item.unit_cost,
            );
            let new_stock = product.stock + item.quantity;

            *product = self
                .product_repo
                .receive_stock(&mut *tx, product.id, new_stock, new_cost)
                .await?;

            items.push(
                self.purchase_repo
                    .insert_item(
                        &mut *tx,
                        purchase.id,
                        store_id,
                        item.product_id,
                        item.quantity,
                        item.unit_cost,
                        line_total,
                    )
                    .await?,
            );
        }

        // 5. O que não foi pago fica devendo ao fornecedor
        let owed = total - paid;
        if let Some(supplier) = &supplier {
            if owed > Decimal::ZERO {
                self.purchase_repo.add_supplier_balance(&mut *tx, supplier.id, owed).await?;
            }
        }

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "purchase.create",
                    entity: "purchase",
                    entity_id: Some(purchase.id),
                    details: json!({ "total": total, "paid": paid, "lines": items.len() }),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!("📦 Compra {} registrada na loja {} ({})", purchase.id, store_id, total);
        Ok(PurchaseDetail {
            header: purchase,
            supplier_name: supplier.map(|s| s.name),
            items,
        })
    }

    pub async fn list_purchases(&self, store_id: Uuid) -> Result<Vec<Purchase>, AppError> {
        self.purchase_repo.list_purchases(store_id).await
    }

    pub async fn get_purchase(
        &self,
        store_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<PurchaseDetail, AppError> {
        let purchase = self
            .purchase_repo
            .find_purchase(store_id, purchase_id)
            .await?
            .ok_or(AppError::PurchaseNotFound)?;

        let items = self.purchase_repo.items(purchase.id).await?;
        let supplier_name = match purchase.supplier_id {
            Some(supplier_id) => self.purchase_repo.supplier_name(supplier_id).await?,
            None => None,
        };

        Ok(PurchaseDetail { header: purchase, supplier_name, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn average_is_quantity_weighted() {
        // 10 un a 4,00 + 30 un a 8,00 = 280 / 40
        assert_eq!(weighted_average_cost(dec("10"), dec("4"), dec("30"), dec("8")), dec("7"));
    }

    #[test]
    fn first_entry_takes_the_incoming_cost() {
        assert_eq!(
            weighted_average_cost(Decimal::ZERO, Decimal::ZERO, dec("5"), dec("3.50")),
            dec("3.50"),
        );
    }

    #[test]
    fn negative_stock_counts_as_zero() {
        assert_eq!(weighted_average_cost(dec("-4"), dec("100"), dec("2"), dec("6")), dec("6"));
    }

    #[test]
    fn no_quantity_means_zero_cost() {
        assert_eq!(
            weighted_average_cost(Decimal::ZERO, dec("9"), Decimal::ZERO, dec("9")),
            Decimal::ZERO,
        );
    }

    #[test]
    fn result_is_kept_to_four_places() {
        // (1 × 1 + 2 × 2) / 3 = 1.6666...
        assert_eq!(weighted_average_cost(dec("1"), dec("1"), dec("2"), dec("2")), dec("1.6667"));
    }
}
