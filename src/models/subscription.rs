// src/models/subscription.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::validation::validate_money,
    models::{ledger::RequestStatus, store::SubscriptionStatus},
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: Uuid,
    #[schema(example = "Pro")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "24.99")]
    pub price: Decimal,
    #[schema(example = 30)]
    pub duration_days: i32,
    // None = ilimitado
    pub max_products: Option<i32>,
    pub max_cashiers: Option<i32>,
    #[schema(example = json!(["pos", "inventory"]))]
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub price: Decimal,
    #[validate(range(min = 1, message = "positive"))]
    pub duration_days: i32,
    #[validate(range(min = 0, message = "not_negative"))]
    pub max_products: Option<i32>,
    #[validate(range(min = 0, message = "not_negative"))]
    pub max_cashiers: Option<i32>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub id: Uuid,
    pub store_id: Uuid,
    pub plan_id: Uuid,
    pub status: RequestStatus,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub requested_by: Uuid,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequestPayload {
    pub plan_id: Uuid,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

// Situação atual da assinatura de uma loja
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub store_id: Uuid,
    pub status: SubscriptionStatus,
    pub expires_at: DateTime<Utc>,
    pub is_usable: bool,
    pub plan: Option<SubscriptionPlan>,
    pub pending_request: Option<SubscriptionRequest>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SubscriptionRequestQuery {
    pub status: Option<RequestStatus>,
}
