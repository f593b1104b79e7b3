// src/handlers/due_payments.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::StoreContext},
    models::due_payment::{DuePayment, DueQuery, PayDuePayload},
};

// GET /api/due-payments
#[utoipa::path(
    get,
    path = "/api/due-payments",
    tag = "Due Payments",
    responses((status = 200, description = "Contas a receber", body = Vec<DuePayment>)),
    params(DueQuery, ("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_due_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    Query(query): Query<DueQuery>,
) -> Result<Json<Vec<DuePayment>>, ApiError> {
    let dues = app_state
        .due_payment_service
        .list_due_payments(store.id, &query)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(dues))
}

// POST /api/due-payments/{id}/pay
#[utoipa::path(
    post,
    path = "/api/due-payments/{id}/pay",
    tag = "Due Payments",
    request_body = PayDuePayload,
    responses(
        (status = 200, description = "Pagamento registrado", body = DuePayment),
        (status = 409, description = "Valor maior que o devido ou conta liquidada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conta"),
        ("x-store-id" = Uuid, Header, description = "ID da Loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn pay_due(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    StoreContext(store): StoreContext,
    Path(due_id): Path<Uuid>,
    Json(payload): Json<PayDuePayload>,
) -> Result<Json<DuePayment>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let due = app_state
        .due_payment_service
        .pay_due(&user, store.id, due_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(due))
}
