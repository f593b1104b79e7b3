// src/handlers/balance_requests.rs

use axum::{
    extract::{Path, Query, State},
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
    models::ledger::{BalanceRequest, RejectPayload, RequestQuery},
};

// GET /api/balance-requests
#[utoipa::path(
    get,
    path = "/api/balance-requests",
    tag = "Customer Balance",
    responses((status = 200, description = "Pedidos de depósito", body = Vec<BalanceRequest>)),
    params(RequestQuery, ("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Vec<BalanceRequest>>, ApiError> {
    let requests = app_state
        .ledger_service
        .list_requests(store.id, query.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requests))
}

// POST /api/balance-requests/{id}/approve
#[utoipa::path(
    post,
    path = "/api/balance-requests/{id}/approve",
    tag = "Customer Balance",
    responses(
        (status = 200, description = "Depósito aprovado e creditado", body = BalanceRequest),
        (status = 409, description = "Pedido já processado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<BalanceRequest>, ApiError> {
    let request = app_state
        .ledger_service
        .approve_request(&user, store.id, request_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(request))
}

// POST /api/balance-requests/{id}/reject
#[utoipa::path(
    post,
    path = "/api/balance-requests/{id}/reject",
    tag = "Customer Balance",
    request_body = RejectPayload,
    responses((status = 200, description = "Pedido rejeitado", body = BalanceRequest)),
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<RejectPayload>,
) -> Result<Json<BalanceRequest>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .ledger_service
        .reject_request(&user, store.id, request_id, &payload.reason)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(request))
}
