// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{MerchantOnly, RequireRole},
        tenancy::StoreContext,
    },
    models::audit::{AuditLog, AuditQuery},
};

// GET /api/audit-logs
// O storeId da query é ignorado aqui: vale sempre a loja do contexto.
#[utoipa::path(
    get,
    path = "/api/audit-logs",
    tag = "Audit",
    responses((status = 200, description = "Ações registradas na loja", body = Vec<AuditLog>)),
    params(AuditQuery, ("x-store-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn list_store_audit_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    StoreContext(store): StoreContext,
    _guard: RequireRole<MerchantOnly>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditLog>>, ApiError> {
    let logs = app_state
        .audit_service
        .list_for_store(store.id, query.limit)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(logs))
}
