// src/handlers/ipc.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use axum_extra::{headers::Authorization, TypedHeader};
use serde_json::Value;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    ipc::{self, ChannelInfo},
    middleware::{auth::BearerHeader, i18n::Locale, tenancy::store_id_from_headers},
};

// GET /api/ipc
#[utoipa::path(
    get,
    path = "/api/ipc",
    tag = "IPC",
    responses((status = 200, description = "Canais registrados e o acesso exigido por cada um"))
)]
pub async fn list_channels() -> Json<Vec<ChannelInfo>> {
    Json(ipc::list())
}

// POST /api/ipc/{channel}
// Corpo vazio vale como payload nulo. O token e o x-store-id são exigidos conforme o canal.
#[utoipa::path(
    post,
    path = "/api/ipc/{channel}",
    tag = "IPC",
    request_body(content = Option<serde_json::Value>, description = "Payload JSON do canal"),
    responses(
        (status = 200, description = "Resultado JSON do canal"),
        (status = 404, description = "Canal desconhecido")
    ),
    params(
        ("channel" = String, Path, description = "Nome do canal, ex.: sales:create"),
        ("x-store-id" = Option<String>, Header, description = "ID da Loja, para canais de loja")
    ),
    security(("api_jwt" = []))
)]
pub async fn call_channel(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: BearerHeader,
    Path(channel): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let token = bearer.ok().map(|TypedHeader(Authorization(bearer))| bearer.token().to_string());

    let value = run_channel(&app_state, &channel, token.as_deref(), &headers, &body)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(value))
}

// O nome do canal é conferido antes do corpo
async fn run_channel(
    app_state: &AppState,
    channel: &str,
    token: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Value, AppError> {
    if ipc::find(channel).is_none() {
        return Err(AppError::ChannelNotFound(channel.to_string()));
    }

    let payload = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(body).map_err(|e| AppError::InvalidPayload(e.to_string()))?
    };

    ipc::dispatch(app_state, channel, token, store_id_from_headers(headers), payload).await
}
