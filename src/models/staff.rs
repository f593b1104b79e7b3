// src/models/staff.rs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCashierPayload {
    #[validate(email(message = "email"))]
    pub email: String,
    #[validate(length(min = 6, message = "password_length"))]
    pub password: String,
    #[validate(length(min = 1, message = "required"))]
    pub full_name: String,
}

// Tudo opcional: só altera o que vier
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCashierPayload {
    #[validate(length(min = 1, message = "required"))]
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    #[validate(length(min = 6, message = "password_length"))]
    pub password: Option<String>,
}
