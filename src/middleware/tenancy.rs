// src/middleware/tenancy.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{authenticate_user, AuthenticatedUser, BearerHeader},
        i18n::Locale,
    },
    models::{auth::User, store::Store},
};

// O nome do nosso cabeçalho HTTP customizado
pub const STORE_ID_HEADER: &str = "x-store-id";

// A loja da requisição, já conferida contra o usuário
#[derive(Debug, Clone)]
pub struct StoreContext(pub Store);

pub fn store_id_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let value = headers.get(STORE_ID_HEADER).ok_or(AppError::StoreContextMissing)?;

    value
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .ok_or_else(|| AppError::InvalidPayload(STORE_ID_HEADER.to_string()))
}

async fn resolve(
    app_state: &AppState,
    bearer: BearerHeader,
    requested: Result<Uuid, AppError>,
) -> Result<(User, Store), AppError> {
    let user = authenticate_user(app_state, bearer).await?;
    let store = app_state.store_service.resolve_context(&user, requested?).await?;
    Ok((user, store))
}

/// Autentica e resolve a loja do `x-store-id` num passo só.
pub async fn store_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: BearerHeader,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let requested = store_id_from_headers(request.headers());

    let (user, store) = resolve(&app_state, bearer, requested)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    request.extensions_mut().insert(StoreContext(store));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for StoreContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<StoreContext>().cloned().ok_or_else(|| {
            let app_state = AppState::from_ref(state);
            AppError::StoreContextMissing.to_api_error(
                &Locale::from_headers(&parts.headers),
                &app_state.i18n_store,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_reported() {
        let err = store_id_from_headers(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::StoreContextMissing));
    }

    #[test]
    fn header_must_be_a_uuid() {
        let mut headers = HeaderMap::new();
        headers.insert(STORE_ID_HEADER, HeaderValue::from_static("loja-1"));
        assert!(matches!(store_id_from_headers(&headers), Err(AppError::InvalidPayload(_))));

        let id = Uuid::new_v4();
        headers.insert(STORE_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(store_id_from_headers(&headers).unwrap(), id);
    }
}
