// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{auth::User, customer::Customer},
};

pub type BearerHeader = Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>;

// Usuário (funcionário) autenticado, inserido nos extensions pelo guard
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

// Cliente do portal autenticado
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer(pub Customer);

/// Valida o bearer de funcionário. Também usado pelo guard de loja.
pub async fn authenticate_user(
    app_state: &AppState,
    bearer: BearerHeader,
) -> Result<User, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| AppError::InvalidToken)?;
    app_state.auth_service.validate_token(bearer.token()).await
}

pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: BearerHeader,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate_user(&app_state, bearer)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

pub async fn customer_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: BearerHeader,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let result = match bearer {
        Ok(TypedHeader(Authorization(bearer))) => {
            app_state.portal_service.validate_token(bearer.token()).await
        }
        Err(_) => Err(AppError::InvalidToken),
    };

    let customer = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedCustomer(customer));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthenticatedUser>().cloned().ok_or_else(|| {
            let app_state = AppState::from_ref(state);
            AppError::InvalidToken.to_api_error(
                &Locale::from_headers(&parts.headers),
                &app_state.i18n_store,
            )
        })
    }
}

impl<S> FromRequestParts<S> for AuthenticatedCustomer
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthenticatedCustomer>().cloned().ok_or_else(|| {
            let app_state = AppState::from_ref(state);
            AppError::InvalidToken.to_api_error(
                &Locale::from_headers(&parts.headers),
                &app_state.i18n_store,
            )
        })
    }
}
