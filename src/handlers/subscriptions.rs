// src/handlers/subscriptions.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
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
    models::subscription::{
        SubscriptionInfo,
        SubscriptionPlan,
        SubscriptionRequest,
        SubscriptionRequestPayload,
    },
};

// GET /api/plans (pública)
#[utoipa::path(
    get,
    path = "/api/plans",
    tag = "Subscriptions",
    responses((status = 200, description = "Planos disponíveis", body = Vec<SubscriptionPlan>))
)]
pub async fn list_plans(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<SubscriptionPlan>>, ApiError> {
    let plans = app_state
        .subscription_service
        .list_active_plans()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(plans))
}

// GET /api/subscription
#[utoipa::path(
    get,
    path = "/api/subscription",
    tag = "Subscriptions",
    responses((status = 200, description = "Assinatura da loja", body = SubscriptionInfo)),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn current_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
) -> Result<Json<SubscriptionInfo>, ApiError> {
    let info = app_state
        .subscription_service
        .current(&store)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(info))
}

// GET /api/subscription/requests
#[utoipa::path(
    get,
    path = "/api/subscription/requests",
    tag = "Subscriptions",
    responses(
        (status = 200, description = "Pedidos da loja", body = Vec<SubscriptionRequest>)
    ),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_store_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
) -> Result<Json<Vec<SubscriptionRequest>>, ApiError> {
    let requests = app_state
        .subscription_service
        .list_store_requests(store.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requests))
}

// POST /api/subscription/requests
#[utoipa::path(
    post,
    path = "/api/subscription/requests",
    tag = "Subscriptions",
    request_body = SubscriptionRequestPayload,
    responses(
        (status = 201, description = "Pedido enviado para análise", body = SubscriptionRequest),
        (status = 409, description = "Plano inativo ou pedido pendente")
    ),
    params(("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn request_subscription(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Json(payload): Json<SubscriptionRequestPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .subscription_service
        .request(&user, store.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}
