// src/models/ledger.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_amount, validate_cents};

// Tipos de lançamento no livro-razão do cliente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ledger_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerKind {
    Deposit,    // Crédito (depósito aprovado ou no balcão)
    Invoice,    // Débito por compra paga com saldo
    Payment,    // Débito para quitar conta a receber
    Refund,     // Estorno de venda cancelada
    Adjustment, // Ajuste manual (positivo ou negativo)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

// --- Lançamento (Histórico) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTransaction {
    pub id: Uuid,
    #[schema(ignore)]
    pub store_id: Uuid,
    pub customer_id: Uuid,
    pub kind: LedgerKind,
    // Positivo = crédito, Negativo = débito
    #[schema(example = "-45.90")]
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub sale_id: Option<Uuid>,
    pub request_id: Option<Uuid>,
    pub due_payment_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// --- Solicitação de depósito (feita pelo cliente no portal) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    pub id: Uuid,
    #[schema(ignore)]
    pub store_id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub bank_account_id: Option<Uuid>,
    pub reference: Option<String>,
    pub status: RequestStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Depósito feito no balcão pelo lojista.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepositPayload {
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustBalancePayload {
    // Sinalizado: positivo soma, negativo subtrai
    #[validate(custom(function = "validate_cents"))]
    pub amount: Decimal,
    #[validate(length(min = 1, message = "required"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectPayload {
    #[validate(length(min = 1, message = "required"))]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
}
