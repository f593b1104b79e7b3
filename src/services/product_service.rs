// src/services/product_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditEntry,
        AuditRepository,
        ProductRepository,
        StoreRepository,
        SubscriptionRepository,
    },
    models::{
        auth::User,
        product::{
            AdjustStockPayload,
            CreateProductPayload,
            Product,
            ProductQuery,
            UpdateProductPayload,
        },
    },
    services::subscription_service::limit_reached,
};

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    store_repo: StoreRepository,
    subscription_repo: SubscriptionRepository,
    audit_repo: AuditRepository,
    pool: PgPool,
}

impl ProductService {
    pub fn new(
        product_repo: ProductRepository,
        store_repo: StoreRepository,
        subscription_repo: SubscriptionRepository,
        audit_repo: AuditRepository,
        pool: PgPool,
    ) -> Self {
        Self { product_repo, store_repo, subscription_repo, audit_repo, pool }
    }

    pub async fn list_products(
        &self,
        store_id: Uuid,
        query: &ProductQuery,
    ) -> Result<Vec<Product>, AppError> {
        self.product_repo.list(store_id, query).await
    }

    pub async fn low_stock(&self, store_id: Uuid) -> Result<Vec<Product>, AppError> {
        let query = ProductQuery { low_stock_only: true, ..Default::default() };
        self.product_repo.list(store_id, &query).await
    }

    pub async fn get_product(&self, store_id: Uuid, product_id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .find(&self.pool, store_id, product_id)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn create_product(
        &self,
        user: &User,
        store_id: Uuid,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        // Loja travada: duas criações simultâneas não furam o limite do plano
        let store = self.store_repo.lock(&mut *tx, store_id).await?;
        if let Some(plan_id) = store.subscription_plan_id {
            if let Some(plan) = self.subscription_repo.find_plan(&mut *tx, plan_id).await? {
                let current = self.product_repo.count_live(&mut *tx, store_id).await?;
                if limit_reached(plan.max_products, current) {
                    return Err(AppError::PlanLimitReached("max_products".into()));
                }
            }
        }

        let product = self.product_repo.create(&mut *tx, store_id, payload).await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "product.create",
                    entity: "product",
                    entity_id: Some(product.id),
                    details: json!({ "sku": product.sku, "stock": product.stock }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        store_id: Uuid,
        product_id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Product, AppError> {
        self.product_repo.update(&self.pool, store_id, product_id, payload).await
    }

    pub async fn delete_product(
        &self,
        user: &User,
        store_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.product_repo.soft_delete(&mut *tx, store_id, product_id).await? {
            return Err(AppError::ProductNotFound);
        }

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "product.delete",
                    entity: "product",
                    entity_id: Some(product_id),
                    details: json!({}),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Ajuste manual. O resultado nunca fica negativo.
    pub async fn adjust_stock(
        &self,
        user: &User,
        store_id: Uuid,
        product_id: Uuid,
        payload: &AdjustStockPayload,
    ) -> Result<Product, AppError> {
        if payload.delta.is_zero() {
            return Err(AppError::InvalidQuantity);
        }

        let mut tx = self.pool.begin().await?;

        let product = self
            .product_repo
            .lock_many(&mut *tx, store_id, &[product_id])
            .await?
            .pop()
            .ok_or(AppError::ProductNotFound)?;

        if product.stock + payload.delta < Decimal::ZERO {
            return Err(AppError::InsufficientStock(product.name));
        }

        let updated = self
            .product_repo
            .add_stock(&mut *tx, store_id, product.id, payload.delta)
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "product.adjust_stock",
                    entity: "product",
                    entity_id: Some(product.id),
                    details: json!({
                        "delta": payload.delta,
                        "reason": payload.reason,
                        "stockBefore": product.stock,
                        "stockAfter": updated.stock,
                    }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }
}
