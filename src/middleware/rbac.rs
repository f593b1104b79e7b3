// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// O que cada guardião aceita.
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
}

/// Guardião de papel. Depende de um guard ter inserido o `AuthenticatedUser`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let Some(AuthenticatedUser(user)) = parts.extensions.get::<AuthenticatedUser>() else {
            return Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store));
        };

        if !T::allows(user.role) {
            tracing::warn!("⛔ {:?} {} barrado em {}", user.role, user.id, parts.uri.path());
            return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

// Lojista (o admin da plataforma também passa)
pub struct MerchantOnly;
impl RoleDef for MerchantOnly {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Merchant | UserRole::PlatformAdmin)
    }
}

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allows(role: UserRole) -> bool {
        role == UserRole::PlatformAdmin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cashiers_are_not_merchants() {
        assert!(MerchantOnly::allows(UserRole::Merchant));
        assert!(MerchantOnly::allows(UserRole::PlatformAdmin));
        assert!(!MerchantOnly::allows(UserRole::Cashier));
    }

    #[test]
    fn only_admins_pass_admin_guard() {
        assert!(AdminOnly::allows(UserRole::PlatformAdmin));
        assert!(!AdminOnly::allows(UserRole::Merchant));
        assert!(!AdminOnly::allows(UserRole::Cashier));
    }
}
