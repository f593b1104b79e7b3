// src/handlers/admin.rs

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
        rbac::{AdminOnly, RequireRole},
    },
    models::{
        audit::{AuditLog, AuditQuery},
        auth::User,
        ledger::RejectPayload,
        store::{Store, StoreStatusPayload},
        subscription::{
            PlanPayload,
            SubscriptionPlan,
            SubscriptionRequest,
            SubscriptionRequestQuery,
        },
    },
};

// =============================================================================
//  LOJAS E USUÁRIOS
// =============================================================================

// GET /api/admin/stores
#[utoipa::path(
    get,
    path = "/api/admin/stores",
    tag = "Admin",
    responses((status = 200, description = "Todas as lojas", body = Vec<Store>)),
    security(("api_jwt" = []))
)]
pub async fn list_stores(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<Json<Vec<Store>>, ApiError> {
    let stores = app_state
        .admin_service
        .list_stores()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(stores))
}

// PUT /api/admin/stores/{id}/status
#[utoipa::path(
    put,
    path = "/api/admin/stores/{id}/status",
    tag = "Admin",
    request_body = StoreStatusPayload,
    responses((status = 200, description = "Loja suspensa ou reativada", body = Store)),
    params(("id" = Uuid, Path, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn set_store_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<StoreStatusPayload>,
) -> Result<Json<Store>, ApiError> {
    let store = app_state
        .admin_service
        .set_store_status(&admin, store_id, payload.is_active)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(store))
}

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses((status = 200, description = "Todos os usuários", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = app_state
        .admin_service
        .list_users()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(users))
}

// GET /api/admin/audit-logs
#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    tag = "Admin",
    responses((status = 200, description = "Log de auditoria da plataforma", body = Vec<AuditLog>)),
    params(AuditQuery),
    security(("api_jwt" = []))
)]
pub async fn list_audit_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditLog>>, ApiError> {
    let logs = app_state
        .admin_service
        .list_audit_logs(query.store_id, query.limit)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(logs))
}

// =============================================================================
//  PLANOS
// =============================================================================

// GET /api/admin/plans
#[utoipa::path(
    get,
    path = "/api/admin/plans",
    tag = "Admin",
    responses(
        (status = 200, description = "Planos, inclusive inativos", body = Vec<SubscriptionPlan>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_plans(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<Json<Vec<SubscriptionPlan>>, ApiError> {
    let plans = app_state
        .subscription_service
        .list_all_plans()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(plans))
}

// POST /api/admin/plans
#[utoipa::path(
    post,
    path = "/api/admin/plans",
    tag = "Admin",
    request_body = PlanPayload,
    responses((status = 201, description = "Plano criado", body = SubscriptionPlan)),
    security(("api_jwt" = []))
)]
pub async fn create_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<PlanPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let plan = app_state
        .subscription_service
        .create_plan(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(plan)))
}

// PUT /api/admin/plans/{id}
#[utoipa::path(
    put,
    path = "/api/admin/plans/{id}",
    tag = "Admin",
    request_body = PlanPayload,
    responses((status = 200, description = "Plano atualizado", body = SubscriptionPlan)),
    params(("id" = Uuid, Path, description = "ID do plano")),
    security(("api_jwt" = []))
)]
pub async fn update_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<PlanPayload>,
) -> Result<Json<SubscriptionPlan>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let plan = app_state
        .subscription_service
        .update_plan(plan_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(plan))
}

// DELETE /api/admin/plans/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/plans/{id}",
    tag = "Admin",
    responses((status = 204, description = "Plano removido")),
    params(("id" = Uuid, Path, description = "ID do plano")),
    security(("api_jwt" = []))
)]
pub async fn delete_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(plan_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .subscription_service
        .delete_plan(plan_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  PEDIDOS DE ASSINATURA
// =============================================================================

// GET /api/admin/subscription-requests
#[utoipa::path(
    get,
    path = "/api/admin/subscription-requests",
    tag = "Admin",
    responses(
        (status = 200, description = "Pedidos de assinatura", body = Vec<SubscriptionRequest>)
    ),
    params(SubscriptionRequestQuery),
    security(("api_jwt" = []))
)]
pub async fn list_subscription_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Query(query): Query<SubscriptionRequestQuery>,
) -> Result<Json<Vec<SubscriptionRequest>>, ApiError> {
    let requests = app_state
        .subscription_service
        .list_requests(query.status)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requests))
}

// POST /api/admin/subscription-requests/{id}/approve
#[utoipa::path(
    post,
    path = "/api/admin/subscription-requests/{id}/approve",
    tag = "Admin",
    responses(
        (status = 200, description = "Assinatura ativada; devolve a loja atualizada", body = Store),
        (status = 409, description = "Pedido já processado")
    ),
    params(("id" = Uuid, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn approve_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Store>, ApiError> {
    let store = app_state
        .subscription_service
        .approve(&admin, request_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(store))
}

// POST /api/admin/subscription-requests/{id}/reject
#[utoipa::path(
    post,
    path = "/api/admin/subscription-requests/{id}/reject",
    tag = "Admin",
    request_body = RejectPayload,
    responses((status = 200, description = "Pedido rejeitado", body = SubscriptionRequest)),
    params(("id" = Uuid, Path, description = "ID do pedido")),
    security(("api_jwt" = []))
)]
pub async fn reject_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<RejectPayload>,
) -> Result<Json<SubscriptionRequest>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .subscription_service
        .reject(&admin, request_id, &payload.reason)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(request))
}
