// src/handlers/stores.rs

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
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{MerchantOnly, RequireRole},
        tenancy::StoreContext,
    },
    models::store::{
        BankAccount,
        CreateBankAccountPayload,
        CreateStorePayload,
        Store,
        UpdateStorePayload,
    },
};

// POST /api/stores
#[utoipa::path(
    post,
    path = "/api/stores",
    tag = "Stores",
    request_body = CreateStorePayload,
    responses((status = 201, description = "Loja criada em período de teste", body = Store)),
    security(("api_jwt" = []))
)]
pub async fn create_store(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<MerchantOnly>,
    Json(payload): Json<CreateStorePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let store = app_state
        .store_service
        .create_store(&user, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(store)))
}

// GET /api/store
#[utoipa::path(
    get,
    path = "/api/store",
    tag = "Stores",
    responses((status = 200, description = "Loja do contexto", body = Store)),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn get_store(StoreContext(store): StoreContext) -> Json<Store> {
    Json(store)
}

// PUT /api/store
#[utoipa::path(
    put,
    path = "/api/store",
    tag = "Stores",
    request_body = UpdateStorePayload,
    responses((status = 200, description = "Configurações atualizadas", body = Store)),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn update_store(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Json(payload): Json<UpdateStorePayload>,
) -> Result<Json<Store>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let store = app_state
        .store_service
        .update_store(&user, store.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(store))
}

// GET /api/store/bank-accounts
#[utoipa::path(
    get,
    path = "/api/store/bank-accounts",
    tag = "Stores",
    responses((status = 200, description = "Contas para depósito", body = Vec<BankAccount>)),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_bank_accounts(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
) -> Result<Json<Vec<BankAccount>>, ApiError> {
    let accounts = app_state
        .store_service
        .list_bank_accounts(store.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(accounts))
}

// POST /api/store/bank-accounts
#[utoipa::path(
    post,
    path = "/api/store/bank-accounts",
    tag = "Stores",
    request_body = CreateBankAccountPayload,
    responses((status = 201, description = "Conta cadastrada", body = BankAccount)),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn add_bank_account(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Json(payload): Json<CreateBankAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let account = app_state
        .store_service
        .add_bank_account(store.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(account)))
}

// DELETE /api/store/bank-accounts/{id}
#[utoipa::path(
    delete,
    path = "/api/store/bank-accounts/{id}",
    tag = "Stores",
    responses(
        (status = 204, description = "Conta removida"),
        (status = 404, description = "Conta não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conta"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_bank_account(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Path(account_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .store_service
        .remove_bank_account(store.id, account_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
