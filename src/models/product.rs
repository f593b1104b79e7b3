// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{
    validate_money, validate_quantity, validate_stock, validate_stock_delta, validate_unit_cost,
};

// --- Produto (catálogo + saldo da loja) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub store_id: Uuid,
    #[schema(example = "CAFE-500")]
    pub sku: String,
    #[schema(example = "Café 500g")]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[schema(example = "un")]
    pub unit: String,

    #[schema(example = "18.90")]
    pub price: Decimal,
    // Custo médio ponderado, recalculado a cada compra
    #[schema(example = "11.2500")]
    pub cost_price: Decimal,
    pub stock: Decimal,
    pub low_stock_threshold: Decimal,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "required"))]
    pub sku: String,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,

    #[validate(custom(function = "validate_money"))]
    pub price: Decimal,

    #[validate(custom(function = "validate_unit_cost"))]
    #[serde(default)] // Se o JSON não tiver esse campo, assume 0
    pub cost_price: Decimal,

    #[validate(custom(function = "validate_stock"))]
    #[serde(default)]
    pub stock: Decimal,

    #[validate(custom(function = "validate_stock"))]
    #[serde(default)]
    pub low_stock_threshold: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "required"))]
    pub sku: String,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub unit: String,
    #[validate(custom(function = "validate_money"))]
    pub price: Decimal,
    #[validate(custom(function = "validate_stock"))]
    pub low_stock_threshold: Decimal,
    pub is_active: bool,
}

// Ajuste manual (inventário, perda, quebra). O estoque nunca fica negativo.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    #[validate(custom(function = "validate_stock_delta"))]
    #[schema(example = "-2")]
    pub delta: Decimal,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Quebra")]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub low_stock_only: bool,
    #[serde(default)]
    pub include_inactive: bool,
}

// Linha de um pedido/venda: o mesmo formato no PDV e no portal
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    pub product_id: Uuid,
    #[validate(custom(function = "validate_quantity"))]
    pub quantity: Decimal,
    // Se não vier, usa o preço de cadastro do produto
    #[validate(custom(function = "validate_money"))]
    pub unit_price: Option<Decimal>,
    #[validate(custom(function = "validate_money"))]
    pub discount: Option<Decimal>,
}
