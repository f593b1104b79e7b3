// src/models/store.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_percentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subscription_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
}

// ---
// Store (o "Tenant")
// ---
// Raiz de todos os dados com store_id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Mercadinho Central")]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,

    // Configurações da loja
    #[schema(example = "BRL")]
    pub currency: String,
    #[schema(example = "5.00")]
    pub tax_rate: Decimal,
    pub receipt_footer: Option<String>,

    pub is_active: bool,

    // Estado da assinatura
    pub subscription_plan_id: Option<Uuid>,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: Uuid,
    #[schema(ignore)]
    pub store_id: Uuid,
    #[schema(example = "Banco do Brasil")]
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub iban: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStorePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStorePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 3, max = 3, message = "length"))]
    #[schema(example = "BRL")]
    pub currency: String,
    #[validate(custom(function = "validate_percentage"))]
    pub tax_rate: Decimal,
    pub receipt_footer: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBankAccountPayload {
    #[validate(length(min = 1, message = "required"))]
    pub bank_name: String,
    #[validate(length(min = 1, message = "required"))]
    pub account_name: String,
    #[validate(length(min = 1, message = "required"))]
    pub account_number: String,
    pub iban: Option<String>,
}

// Suspende ou reativa uma loja (admin da plataforma)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatusPayload {
    pub is_active: bool,
}
