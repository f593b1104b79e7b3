// src/models/portal.rs

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::validation::validate_amount, models::product::LineItemPayload};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalRegisterPayload {
    #[validate(length(min = 1, message = "required"))]
    pub full_name: String,
    #[validate(length(min = 5, message = "required"))]
    pub phone: String,
    #[validate(length(min = 6, message = "password_length"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalLoginPayload {
    #[validate(length(min = 5, message = "required"))]
    pub phone: String,
    #[validate(length(min = 6, message = "password_length"))]
    pub password: String,
}

// Pedido do portal: sempre pago com o saldo do cliente na loja
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalOrderPayload {
    #[validate(length(min = 1, message = "items_required"), nested)]
    pub items: Vec<LineItemPayload>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalDepositPayload {
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    pub bank_account_id: Option<Uuid>,
    pub reference: Option<String>,
}
