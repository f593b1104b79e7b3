// src/models/sale.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{common::validation::validate_money, models::product::LineItemPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Balance, // Debita o saldo do cliente na loja
    Credit,  // "Fiado": gera conta a receber
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Completed,
    Voided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_source", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleSource {
    Pos,
    Portal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    #[schema(ignore)]
    pub store_id: Uuid,
    #[schema(example = 1024)]
    pub invoice_number: i64,
    pub customer_id: Option<Uuid>,
    pub cashier_id: Option<Uuid>,
    pub source: SaleSource,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    #[schema(example = "150.50")]
    pub total: Decimal,
    pub paid_amount: Decimal,
    pub due_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub notes: Option<String>,
    pub void_reason: Option<String>,
    pub voided_by: Option<Uuid>,
    pub voided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    #[schema(ignore)]
    pub store_id: Uuid,
    pub product_id: Uuid,
    // Nome e custo "congelados" no momento da venda
    pub product_name: String,
    #[schema(example = "2.0")]
    pub quantity: Decimal,
    #[schema(example = "50.00")]
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
    pub discount: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub header: Sale,
    pub customer_name: Option<String>,
    pub items: Vec<SaleItem>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    #[validate(length(min = 1, message = "items_required"), nested)]
    pub items: Vec<LineItemPayload>,
    pub customer_id: Option<Uuid>,
    // Desconto no total (além dos descontos por linha)
    #[validate(custom(function = "validate_money"))]
    pub discount: Option<Decimal>,
    pub payment_method: PaymentMethod,
    // Se não vier: total para CASH/CARD/BALANCE, zero para CREDIT
    #[validate(custom(function = "validate_money"))]
    pub paid_amount: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date, example = "2025-02-28")]
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoidSalePayload {
    #[validate(length(min = 1, message = "required"))]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SaleQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub customer_id: Option<Uuid>,
    pub status: Option<SaleStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationErrorsKind;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    fn line(quantity: &str) -> LineItemPayload {
        LineItemPayload {
            product_id: Uuid::new_v4(),
            quantity: dec(quantity),
            unit_price: None,
            discount: None,
        }
    }

    fn cash_sale(items: Vec<LineItemPayload>) -> CreateSalePayload {
        CreateSalePayload {
            items,
            customer_id: None,
            discount: None,
            payment_method: PaymentMethod::Cash,
            paid_amount: None,
            due_date: None,
            notes: None,
        }
    }

    #[test]
    fn quantity_below_three_decimals_is_a_validation_error() {
        let errors = cash_sale(vec![line("1"), line("0.0004")]).validate().unwrap_err();

        assert!(matches!(errors.errors().get("items"), Some(ValidationErrorsKind::List(_))));
    }

    #[test]
    fn sub_cent_paid_amount_is_a_validation_error() {
        let mut payload = cash_sale(vec![line("2")]);
        payload.paid_amount = Some(dec("10.005"));

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("paid_amount"));
    }

    #[test]
    fn regular_sale_passes() {
        let mut payload = cash_sale(vec![line("1.250"), line("3")]);
        payload.discount = Some(dec("1.50"));

        assert!(payload.validate().is_ok());
    }
}
