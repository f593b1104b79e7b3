// src/services/portal_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditEntry, AuditRepository, CustomerRepository, LedgerRepository,
        ProductRepository, SaleRepository, StoreRepository,
    },
    models::{
        auth::TokenKind,
        customer::{Customer, CustomerMembership},
        ledger::{BalanceRequest, CustomerTransaction},
        portal::{
            PortalDepositPayload,
            PortalLoginPayload,
            PortalOrderPayload,
            PortalRegisterPayload,
        },
        product::{LineItemPayload, Product, ProductQuery},
        sale::{PaymentMethod, Sale, SaleDetail, SaleSource},
        store::Store,
    },
    services::{
        auth::{decode_token, hash_password, issue_token, verify_password},
        sale_service::{Checkout, SaleService},
    },
};

// O portal do cliente: o mesmo cliente enxerga todas as lojas onde tem cadastro
#[derive(Clone)]
pub struct PortalService {
    customer_repo: CustomerRepository,
    product_repo: ProductRepository,
    sale_repo: SaleRepository,
    ledger_repo: LedgerRepository,
    store_repo: StoreRepository,
    audit_repo: AuditRepository,
    sale_service: SaleService,
    jwt_secret: String,
    pool: PgPool,
}

impl PortalService {
    pub fn new(
        customer_repo: CustomerRepository,
        product_repo: ProductRepository,
        sale_repo: SaleRepository,
        ledger_repo: LedgerRepository,
        store_repo: StoreRepository,
        audit_repo: AuditRepository,
        sale_service: SaleService,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            customer_repo,
            product_repo,
            sale_repo,
            ledger_repo,
            store_repo,
            audit_repo,
            sale_service,
            jwt_secret,
            pool,
        }
    }

    // ---
    // Identidade do cliente
    // ---

    /// Cria o cliente ou, se a loja já o cadastrou sem senha, ativa o acesso ao portal.
    pub async fn register(&self, payload: &PortalRegisterPayload) -> Result<String, AppError> {
        let phone = payload.phone.trim();
        let hashed = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let customer = match self.customer_repo.find_by_phone(&mut *tx, phone).await? {
            Some(existing) if existing.password_hash.is_some() => {
                return Err(AppError::PhoneAlreadyExists)
            }
            Some(existing) => {
                self.customer_repo
                    .claim_account(&mut *tx, existing.id, &payload.full_name, &hashed)
                    .await?
            }
            None => {
                self.customer_repo
                    .create_customer(&mut *tx, &payload.full_name, phone, None, Some(&hashed))
                    .await?
            }
        };

        tx.commit().await?;

        tracing::info!("🙋 Cliente {} ativou o portal", customer.id);
        issue_token(&self.jwt_secret, customer.id, TokenKind::Customer)
    }

    pub async fn login(&self, payload: &PortalLoginPayload) -> Result<String, AppError> {
        let customer = self
            .customer_repo
            .find_by_phone(&self.pool, payload.phone.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let Some(password_hash) = customer.password_hash.as_deref() else {
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(&payload.password, password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        issue_token(&self.jwt_secret, customer.id, TokenKind::Customer)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Customer, AppError> {
        let claims = decode_token(&self.jwt_secret, token, TokenKind::Customer)?;

        self.customer_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn stores(&self, customer: &Customer) -> Result<Vec<CustomerMembership>, AppError> {
        self.customer_repo.memberships(customer.id).await
    }

    /// A loja, se o cliente tiver cadastro nela e ela estiver ativa.
    async fn member_store(&self, customer: &Customer, store_id: Uuid) -> Result<Store, AppError> {
        self.customer_repo
            .find_relation(&self.pool, store_id, customer.id)
            .await?
            .ok_or(AppError::StoreNotFound)?;

        let store = self
            .store_repo
            .find_by_id(store_id)
            .await?
            .ok_or(AppError::StoreNotFound)?;

        if !store.is_active {
            return Err(AppError::StoreSuspended);
        }
        Ok(store)
    }

    // ---
    // Loja vista pelo cliente
    // ---

    pub async fn products(
        &self,
        customer: &Customer,
        store_id: Uuid,
    ) -> Result<Vec<Product>, AppError> {
        let store = self.member_store(customer, store_id).await?;
        self.product_repo.list(store.id, &ProductQuery::default()).await
    }

    /// Pedido pago inteiro com o saldo. Preço e desconto vêm sempre do cadastro.
    pub async fn create_order(
        &self,
        customer: &Customer,
        store_id: Uuid,
        payload: &PortalOrderPayload,
    ) -> Result<SaleDetail, AppError> {
        let store = self.member_store(customer, store_id).await?;

        let items: Vec<LineItemPayload> = payload
            .items
            .iter()
            .map(|item| LineItemPayload { unit_price: None, discount: None, ..item.clone() })
            .collect();

        self.sale_service
            .checkout(
                &store,
                Checkout {
                    items: &items,
                    customer_id: Some(customer.id),
                    discount: Decimal::ZERO,
                    payment_method: PaymentMethod::Balance,
                    paid_amount: None,
                    due_date: None,
                    notes: payload.notes.as_deref(),
                    cashier_id: None,
                    source: SaleSource::Portal,
                },
            )
            .await
    }

    pub async fn orders(&self, customer: &Customer, store_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let store = self.member_store(customer, store_id).await?;
        self.sale_repo.list_for_customer(store.id, customer.id).await
    }

    pub async fn transactions(
        &self,
        customer: &Customer,
        store_id: Uuid,
    ) -> Result<Vec<CustomerTransaction>, AppError> {
        let store = self.member_store(customer, store_id).await?;
        self.ledger_repo.list_transactions(store.id, customer.id).await
    }

    pub async fn request_deposit(
        &self,
        customer: &Customer,
        store_id: Uuid,
        payload: &PortalDepositPayload,
    ) -> Result<BalanceRequest, AppError> {
        if payload.amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let store = self.member_store(customer, store_id).await?;

        let mut tx = self.pool.begin().await?;

        if let Some(account_id) = payload.bank_account_id {
            self.store_repo
                .find_bank_account(&mut *tx, store.id, account_id)
                .await?
                .ok_or(AppError::BankAccountNotFound)?;
        }

        let request = self
            .ledger_repo
            .create_request(
                &mut *tx,
                store.id,
                customer.id,
                payload.amount,
                payload.bank_account_id,
                payload.reference.as_deref(),
            )
            .await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store.id),
                    user_id: None,
                    action: "balance_request.create",
                    entity: "balance_request",
                    entity_id: Some(request.id),
                    details: json!({ "customerId": customer.id, "amount": payload.amount }),
                },
            )
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    pub async fn requests(
        &self,
        customer: &Customer,
        store_id: Uuid,
    ) -> Result<Vec<BalanceRequest>, AppError> {
        let store = self.member_store(customer, store_id).await?;
        self.ledger_repo.list_requests_for_customer(store.id, customer.id).await
    }
}
