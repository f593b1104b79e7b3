// src/handlers/purchases.rs

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
    models::purchase::{CreatePurchasePayload, Purchase, PurchaseDetail, Supplier, SupplierPayload},
};

// =============================================================================
//  FORNECEDORES
// =============================================================================

// GET /api/suppliers
#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Purchasing",
    responses((status = 200, description = "Fornecedores", body = Vec<Supplier>)),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
) -> Result<Json<Vec<Supplier>>, ApiError> {
    let suppliers = app_state
        .purchase_service
        .list_suppliers(store.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(suppliers))
}

// GET /api/suppliers/{id}
#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    tag = "Purchasing",
    responses(
        (status = 200, description = "Fornecedor", body = Supplier),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do fornecedor"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<Supplier>, ApiError> {
    let supplier = app_state
        .purchase_service
        .get_supplier(store.id, supplier_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(supplier))
}

// POST /api/suppliers
#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Purchasing",
    request_body = SupplierPayload,
    responses((status = 201, description = "Fornecedor criado", body = Supplier)),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let supplier = app_state
        .purchase_service
        .create_supplier(store.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

// PUT /api/suppliers/{id}
#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    tag = "Purchasing",
    request_body = SupplierPayload,
    responses((status = 200, description = "Fornecedor atualizado", body = Supplier)),
    params(
        ("id" = Uuid, Path, description = "ID do fornecedor"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<SupplierPayload>,
) -> Result<Json<Supplier>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let supplier = app_state
        .purchase_service
        .update_supplier(store.id, supplier_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(supplier))
}

// DELETE /api/suppliers/{id}
#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "Purchasing",
    responses((status = 204, description = "Fornecedor removido")),
    params(
        ("id" = Uuid, Path, description = "ID do fornecedor"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Path(supplier_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .purchase_service
        .delete_supplier(store.id, supplier_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  COMPRAS (ENTRADA DE ESTOQUE)
// =============================================================================

// POST /api/purchases
#[utoipa::path(
    post,
    path = "/api/purchases",
    tag = "Purchasing",
    request_body = CreatePurchasePayload,
    responses(
        (status = 201, description = "Compra registrada", body = PurchaseDetail)
    ),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn create_purchase(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Json(payload): Json<CreatePurchasePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let purchase = app_state
        .purchase_service
        .create_purchase(&user, store.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(purchase)))
}

// GET /api/purchases
#[utoipa::path(
    get,
    path = "/api/purchases",
    tag = "Purchasing",
    responses((status = 200, description = "Compras", body = Vec<Purchase>)),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_purchases(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
) -> Result<Json<Vec<Purchase>>, ApiError> {
    let purchases = app_state
        .purchase_service
        .list_purchases(store.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(purchases))
}

// GET /api/purchases/{id}
#[utoipa::path(
    get,
    path = "/api/purchases/{id}",
    tag = "Purchasing",
    responses(
        (status = 200, description = "Compra com itens", body = PurchaseDetail),
        (status = 404, description = "Compra não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da compra"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_purchase(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    Path(purchase_id): Path<Uuid>,
) -> Result<Json<PurchaseDetail>, ApiError> {
    let purchase = app_state
        .purchase_service
        .get_purchase(store.id, purchase_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(purchase))
}
