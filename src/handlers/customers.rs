// src/handlers/customers.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{MerchantOnly, RequireRole},
        tenancy::StoreContext,
    },
    models::{
        customer::{CreateCustomerPayload, CustomerQuery, StoreCustomer, UpdateCustomerPayload},
        ledger::{AdjustBalancePayload, CustomerTransaction, DepositPayload},
    },
};

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses(
        (status = 200, description = "Clientes da loja com saldo", body = Vec<StoreCustomer>)
    ),
    params(CustomerQuery, ("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    Query(query): Query<CustomerQuery>,
) -> Result<Json<Vec<StoreCustomer>>, ApiError> {
    let customers = app_state
        .customer_service
        .list_customers(store.id, &query)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customers))
}

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente cadastrado ou vinculado", body = StoreCustomer),
        (status = 409, description = "Cliente já vinculado")
    ),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    StoreContext(store): StoreContext,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .customer_service
        .create_customer(&user, store.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    responses(
        (status = 200, description = "Cliente", body = StoreCustomer),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<StoreCustomer>, ApiError> {
    let customer = app_state
        .customer_service
        .get_customer(store.id, customer_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customer))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    request_body = UpdateCustomerPayload,
    responses((status = 200, description = "Cliente atualizado", body = StoreCustomer)),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerPayload>,
) -> Result<Json<StoreCustomer>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let customer = app_state
        .customer_service
        .update_customer(store.id, customer_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(customer))
}

// DELETE /api/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "Customers",
    responses(
        (status = 204, description = "Cliente desvinculado da loja"),
        (status = 409, description = "Saldo ou dívidas em aberto")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Path(customer_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .customer_service
        .remove_customer(&user, store.id, customer_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  SALDO DO CLIENTE
// =============================================================================

// GET /api/customers/{id}/transactions
#[utoipa::path(
    get,
    path = "/api/customers/{id}/transactions",
    tag = "Customer Balance",
    responses(
        (status = 200, description = "Extrato do cliente", body = Vec<CustomerTransaction>)
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Vec<CustomerTransaction>>, ApiError> {
    let transactions = app_state
        .ledger_service
        .list_transactions(store.id, customer_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(transactions))
}

// POST /api/customers/{id}/deposit
#[utoipa::path(
    post,
    path = "/api/customers/{id}/deposit",
    tag = "Customer Balance",
    request_body = DepositPayload,
    responses((status = 201, description = "Depósito lançado", body = CustomerTransaction)),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn deposit(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<DepositPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let transaction = app_state
        .ledger_service
        .deposit(&user, store.id, customer_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

// POST /api/customers/{id}/adjust
#[utoipa::path(
    post,
    path = "/api/customers/{id}/adjust",
    tag = "Customer Balance",
    request_body = AdjustBalancePayload,
    responses(
        (status = 201, description = "Ajuste lançado", body = CustomerTransaction),
        (status = 409, description = "Saldo ficaria negativo")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_balance(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<AdjustBalancePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let transaction = app_state
        .ledger_service
        .adjust(&user, store.id, customer_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
