// src/handlers/portal.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedCustomer, i18n::Locale},
    models::{
        auth::AuthResponse,
        customer::{Customer, CustomerMembership},
        ledger::{BalanceRequest, CustomerTransaction},
        portal::{
            PortalDepositPayload,
            PortalLoginPayload,
            PortalOrderPayload,
            PortalRegisterPayload,
        },
        product::Product,
        sale::{Sale, SaleDetail},
    },
};

// POST /api/portal/register
#[utoipa::path(
    post,
    path = "/api/portal/register",
    tag = "Portal",
    request_body = PortalRegisterPayload,
    responses(
        (status = 201, description = "Acesso ao portal criado", body = AuthResponse),
        (status = 409, description = "Telefone já tem acesso")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<PortalRegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .portal_service
        .register(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

// POST /api/portal/login
#[utoipa::path(
    post,
    path = "/api/portal/login",
    tag = "Portal",
    request_body = PortalLoginPayload,
    responses((status = 200, description = "Token do cliente", body = AuthResponse))
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<PortalLoginPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .portal_service
        .login(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(AuthResponse { token }))
}

// GET /api/portal/me
#[utoipa::path(
    get,
    path = "/api/portal/me",
    tag = "Portal",
    responses((status = 200, description = "Cliente logado", body = Customer)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedCustomer(customer): AuthenticatedCustomer) -> Json<Customer> {
    Json(customer)
}

// GET /api/portal/stores
#[utoipa::path(
    get,
    path = "/api/portal/stores",
    tag = "Portal",
    responses(
        (status = 200, description = "Lojas do cliente com saldo", body = Vec<CustomerMembership>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_stores(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<Json<Vec<CustomerMembership>>, ApiError> {
    let stores = app_state
        .portal_service
        .stores(&customer)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(stores))
}

// GET /api/portal/stores/{store_id}/products
#[utoipa::path(
    get,
    path = "/api/portal/stores/{store_id}/products",
    tag = "Portal",
    responses((status = 200, description = "Produtos ativos da loja", body = Vec<Product>)),
    params(("store_id" = Uuid, Path, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    Path(store_id): Path<Uuid>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = app_state
        .portal_service
        .products(&customer, store_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(products))
}

// POST /api/portal/stores/{store_id}/orders
#[utoipa::path(
    post,
    path = "/api/portal/stores/{store_id}/orders",
    tag = "Portal",
    request_body = PortalOrderPayload,
    responses(
        (status = 201, description = "Pedido pago com saldo", body = SaleDetail),
        (status = 409, description = "Saldo ou estoque insuficiente")
    ),
    params(("store_id" = Uuid, Path, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<PortalOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .portal_service
        .create_order(&customer, store_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/portal/stores/{store_id}/orders
#[utoipa::path(
    get,
    path = "/api/portal/stores/{store_id}/orders",
    tag = "Portal",
    responses((status = 200, description = "Compras do cliente na loja", body = Vec<Sale>)),
    params(("store_id" = Uuid, Path, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    Path(store_id): Path<Uuid>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let orders = app_state
        .portal_service
        .orders(&customer, store_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(orders))
}

// GET /api/portal/stores/{store_id}/transactions
#[utoipa::path(
    get,
    path = "/api/portal/stores/{store_id}/transactions",
    tag = "Portal",
    responses(
        (status = 200, description = "Extrato do cliente na loja", body = Vec<CustomerTransaction>)
    ),
    params(("store_id" = Uuid, Path, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    Path(store_id): Path<Uuid>,
) -> Result<Json<Vec<CustomerTransaction>>, ApiError> {
    let transactions = app_state
        .portal_service
        .transactions(&customer, store_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(transactions))
}

// POST /api/portal/stores/{store_id}/deposit-requests
#[utoipa::path(
    post,
    path = "/api/portal/stores/{store_id}/deposit-requests",
    tag = "Portal",
    request_body = PortalDepositPayload,
    responses((status = 201, description = "Pedido de depósito enviado", body = BalanceRequest)),
    params(("store_id" = Uuid, Path, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn request_deposit(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<PortalDepositPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .portal_service
        .request_deposit(&customer, store_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/portal/stores/{store_id}/deposit-requests
#[utoipa::path(
    get,
    path = "/api/portal/stores/{store_id}/deposit-requests",
    tag = "Portal",
    responses(
        (status = 200, description = "Pedidos de depósito do cliente", body = Vec<BalanceRequest>)
    ),
    params(("store_id" = Uuid, Path, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
    Path(store_id): Path<Uuid>,
) -> Result<Json<Vec<BalanceRequest>>, ApiError> {
    let requests = app_state
        .portal_service
        .requests(&customer, store_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requests))
}
