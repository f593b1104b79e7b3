// src/models/customer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- CLIENTE (identidade global, compartilhada entre lojas) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "João da Silva")]
    pub full_name: String,
    #[schema(example = "+5511999998888")]
    pub phone: String,
    pub email: Option<String>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Vínculo cliente <-> loja, com o saldo daquela loja ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStoreRelation {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub store_id: Uuid,
    pub balance: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O que a loja enxerga: cliente + saldo na loja (JOIN)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreCustomer {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    #[schema(example = "150.00")]
    pub balance: Decimal,
    pub notes: Option<String>,
    // Soma do que ainda falta receber (contas a receber abertas)
    pub open_due: Decimal,
    pub joined_at: DateTime<Utc>,
}

// O que o cliente enxerga no portal: as lojas onde tem cadastro
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMembership {
    pub store_id: Uuid,
    pub store_name: String,
    pub currency: String,
    pub balance: Decimal,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    pub full_name: String,
    #[validate(length(min = 5, message = "required"))]
    pub phone: String,
    #[validate(email(message = "email"))]
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    #[validate(length(min = 1, message = "required"))]
    pub full_name: String,
    #[validate(email(message = "email"))]
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerQuery {
    pub search: Option<String>,
}
