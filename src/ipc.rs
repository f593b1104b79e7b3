// src/ipc.rs
//
// Tabela de canais: nome -> handler. Cada canal espelha uma rota HTTP e recebe o
// mesmo JSON. O registro é montado em tempo de link pelo `inventory`.

pub mod channels;

use std::{future::Future, pin::Pin};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminOnly, MerchantOnly, RoleDef},
    models::{auth::User, customer::Customer, store::Store},
};

pub type ChannelFuture = Pin<Box<dyn Future<Output = Result<Value, AppError>> + Send>>;
pub type ChannelHandler = fn(AppState, CallContext, Value) -> ChannelFuture;

/// Quem pode chamar o canal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    User,
    Store,
    Merchant,
    Admin,
    Customer,
}

pub struct Channel {
    pub name: &'static str,
    pub access: Access,
    pub handler: ChannelHandler,
}

inventory::collect!(Channel);

#[derive(Debug, Serialize)]
pub struct ChannelInfo {
    pub name: &'static str,
    pub access: Access,
}

/// Identidade já conferida de acordo com o `Access` do canal.
#[derive(Debug, Default)]
pub struct CallContext {
    pub user: Option<User>,
    pub store: Option<Store>,
    pub customer: Option<Customer>,
}

impl CallContext {
    pub fn user(&self) -> Result<&User, AppError> {
        self.user.as_ref().ok_or(AppError::InvalidToken)
    }

    pub fn store(&self) -> Result<&Store, AppError> {
        self.store.as_ref().ok_or(AppError::StoreContextMissing)
    }

    pub fn customer(&self) -> Result<&Customer, AppError> {
        self.customer.as_ref().ok_or(AppError::InvalidToken)
    }
}

pub fn find(name: &str) -> Option<&'static Channel> {
    inventory::iter::<Channel>.into_iter().find(|channel| channel.name == name)
}

pub fn list() -> Vec<ChannelInfo> {
    let mut channels: Vec<ChannelInfo> = inventory::iter::<Channel>
        .into_iter()
        .map(|channel| ChannelInfo { name: channel.name, access: channel.access })
        .collect();
    channels.sort_by_key(|channel| channel.name);
    channels
}

async fn authorize(
    app_state: &AppState,
    access: Access,
    token: Option<&str>,
    store_id: Result<Uuid, AppError>,
) -> Result<CallContext, AppError> {
    let mut ctx = CallContext::default();

    match access {
        Access::Public => {}
        Access::Customer => {
            let token = token.ok_or(AppError::InvalidToken)?;
            ctx.customer = Some(app_state.portal_service.validate_token(token).await?);
        }
        Access::User | Access::Store | Access::Merchant | Access::Admin => {
            let token = token.ok_or(AppError::InvalidToken)?;
            let user = app_state.auth_service.validate_token(token).await?;

            let allowed = match access {
                Access::Admin => AdminOnly::allows(user.role),
                Access::Merchant => MerchantOnly::allows(user.role),
                _ => true,
            };
            if !allowed {
                tracing::warn!("⛔ {:?} {} barrado no canal IPC", user.role, user.id);
                return Err(AppError::Forbidden);
            }

            if matches!(access, Access::Store | Access::Merchant) {
                ctx.store = Some(app_state.store_service.resolve_context(&user, store_id?).await?);
            }
            ctx.user = Some(user);
        }
    }

    Ok(ctx)
}

/// Resolve o canal, confere o acesso e executa.
pub async fn dispatch(
    app_state: &AppState,
    name: &str,
    token: Option<&str>,
    store_id: Result<Uuid, AppError>,
    payload: Value,
) -> Result<Value, AppError> {
    let channel = find(name).ok_or_else(|| AppError::ChannelNotFound(name.to_string()))?;
    let ctx = authorize(app_state, channel.access, token, store_id).await?;

    tracing::debug!("📨 Canal IPC {}", channel.name);
    (channel.handler)(app_state.clone(), ctx, payload).await
}

// ---
// Auxiliares usados pelos canais
// ---

pub fn boxed<F>(future: F) -> ChannelFuture
where
    F: Future<Output = Result<Value, AppError>> + Send + 'static,
{
    Box::pin(future)
}

/// Payload ausente conta como objeto vazio.
pub fn parse<T: DeserializeOwned>(payload: Value) -> Result<T, AppError> {
    let payload = if payload.is_null() { Value::Object(Default::default()) } else { payload };
    serde_json::from_value(payload).map_err(|e| AppError::InvalidPayload(e.to_string()))
}

pub fn parse_valid<T: DeserializeOwned + Validate>(payload: Value) -> Result<T, AppError> {
    let parsed: T = parse(payload)?;
    parsed.validate()?;
    Ok(parsed)
}

/// Retira um id do payload; o resto segue para o `parse` do corpo.
pub fn take_id(payload: &mut Value, field: &str) -> Result<Uuid, AppError> {
    let raw = payload
        .as_object_mut()
        .and_then(|object| object.remove(field))
        .ok_or_else(|| AppError::InvalidPayload(format!("{} ausente", field)))?;

    serde_json::from_value(raw).map_err(|e| AppError::InvalidPayload(e.to_string()))
}

pub fn reply<T: Serialize>(value: T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::InternalServerError(e.into()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;
    use crate::models::product::ProductQuery;

    #[test]
    fn channel_names_are_unique() {
        let names: Vec<&str> = list().iter().map(|c| c.name).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn core_channels_are_registered() {
        for name in [
            "auth:login",
            "products:list",
            "sales:create",
            "sales:void",
            "customer-balance:approve",
            "due-payments:pay",
            "purchases:create",
            "portal:create-order",
            "admin:set-store-status",
        ] {
            assert!(find(name).is_some(), "canal {} não registrado", name);
        }
        assert!(find("nao:existe").is_none());
    }

    #[test]
    fn access_levels_match_the_channel_kind() {
        assert_eq!(find("plans:list").map(|c| c.access), Some(Access::Public));
        assert_eq!(find("sales:void").map(|c| c.access), Some(Access::Merchant));
        assert_eq!(find("admin:users").map(|c| c.access), Some(Access::Admin));
        assert_eq!(find("portal:stores").map(|c| c.access), Some(Access::Customer));
    }

    #[test]
    fn null_payload_parses_as_empty_object() {
        let query: ProductQuery = parse(Value::Null).unwrap();
        assert!(query.search.is_none());
        assert!(!query.low_stock_only);
    }

    #[test]
    fn take_id_removes_the_field() {
        let id = Uuid::new_v4();
        let mut payload = json!({ "id": id, "reason": "quebra" });

        assert_eq!(take_id(&mut payload, "id").unwrap(), id);
        assert_eq!(payload, json!({ "reason": "quebra" }));
        assert!(matches!(take_id(&mut payload, "id"), Err(AppError::InvalidPayload(_))));
    }
}
