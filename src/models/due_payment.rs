// src/models/due_payment.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "due_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DueStatus {
    Pending,   // Aberto
    Partial,   // Pago Parcialmente
    Paid,      // Quitado
    Cancelled, // Cancelado (venda estornada)
}

impl DueStatus {
    /// Situações que ainda cobram o cliente (e que o estorno cancela).
    pub const OPEN: [DueStatus; 2] = [DueStatus::Pending, DueStatus::Partial];

    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuePayment {
    pub id: Uuid,
    #[schema(ignore)]
    pub store_id: Uuid,
    pub customer_id: Uuid,
    pub sale_id: Option<Uuid>,
    #[schema(example = "500.00")]
    pub amount: Decimal,
    #[schema(example = "120.00")]
    pub paid_amount: Decimal,
    pub status: DueStatus,
    #[schema(value_type = Option<String>, format = Date, example = "2025-02-28")]
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Como a conta a receber foi paga
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DueSettlementMethod {
    Cash,
    Balance,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayDuePayload {
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    pub method: DueSettlementMethod,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DueQuery {
    pub status: Option<DueStatus>,
    pub customer_id: Option<Uuid>,
}
