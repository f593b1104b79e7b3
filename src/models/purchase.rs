// src/models/purchase.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_money, validate_quantity, validate_unit_cost};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    #[schema(ignore)]
    pub store_id: Uuid,
    #[schema(example = "Distribuidora Sul")]
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    // Quanto a loja ainda deve a este fornecedor
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub phone: Option<String>,
    #[validate(email(message = "email"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

// --- Compra (entrada de estoque) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    #[schema(ignore)]
    pub store_id: Uuid,
    pub supplier_id: Option<Uuid>,
    #[schema(example = "NF-12345")]
    pub reference: Option<String>,
    pub total: Decimal,
    pub paid_amount: Decimal,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub id: Uuid,
    pub purchase_id: Uuid,
    #[schema(ignore)]
    pub store_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub header: Purchase,
    pub supplier_name: Option<String>,
    pub items: Vec<PurchaseItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLinePayload {
    pub product_id: Uuid,
    #[validate(custom(function = "validate_quantity"))]
    pub quantity: Decimal,
    #[validate(custom(function = "validate_unit_cost"))]
    pub unit_cost: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchasePayload {
    pub supplier_id: Option<Uuid>,
    #[validate(length(min = 1, message = "items_required"), nested)]
    pub items: Vec<PurchaseLinePayload>,
    // Se não vier, considera a compra paga à vista
    #[validate(custom(function = "validate_money"))]
    pub paid_amount: Option<Decimal>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}
