// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// O erro "interno" que circula entre repositórios, serviços e handlers.
// A mensagem do `#[error]` é só para log; o que vai para o cliente é a chave traduzida.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Payload inválido: {0}")]
    InvalidPayload(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Telefone já cadastrado")]
    PhoneAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Cabeçalho x-store-id ausente")]
    StoreContextMissing,

    #[error("Loja não encontrada")]
    StoreNotFound,

    #[error("Loja suspensa")]
    StoreSuspended,

    #[error("Assinatura inativa")]
    SubscriptionInactive,

    #[error("Limite do plano atingido: {0}")]
    PlanLimitReached(String),

    #[error("Conta bancária não encontrada")]
    BankAccountNotFound,

    #[error("Funcionário não encontrado")]
    StaffNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("SKU já existe: {0}")]
    SkuAlreadyExists(String),

    #[error("Estoque insuficiente: {0}")]
    InsufficientStock(String),

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Cliente já vinculado à loja")]
    CustomerAlreadyInStore,

    #[error("Cliente não pertence à loja")]
    CustomerNotInStore,

    #[error("Cliente com saldo ou dívidas em aberto")]
    CustomerHasOpenBalance,

    #[error("Cliente obrigatório para venda a prazo")]
    CustomerRequiredForCredit,

    #[error("Saldo insuficiente")]
    InsufficientBalance,

    #[error("Valor inválido")]
    InvalidAmount,

    #[error("Quantidade inválida")]
    InvalidQuantity,

    #[error("Venda não encontrada")]
    SaleNotFound,

    #[error("Venda já cancelada")]
    SaleAlreadyVoided,

    #[error("Conta a receber não encontrada")]
    DuePaymentNotFound,

    #[error("Conta a receber já liquidada")]
    DuePaymentSettled,

    #[error("Pagamento maior que o saldo devedor")]
    PaymentExceedsDue,

    #[error("Fornecedor não encontrado")]
    SupplierNotFound,

    #[error("Compra não encontrada")]
    PurchaseNotFound,

    #[error("Solicitação não encontrada")]
    RequestNotFound,

    #[error("Solicitação já processada")]
    RequestAlreadyProcessed,

    #[error("Já existe uma solicitação pendente")]
    PendingRequestExists,

    #[error("Plano não encontrado")]
    PlanNotFound,

    #[error("Plano inativo")]
    PlanInactive,

    #[error("Canal IPC desconhecido: {0}")]
    ChannelNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro "externo": já traduzido, pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    /// Status HTTP, chave de tradução e argumentos de interpolação.
    fn describe(&self) -> (StatusCode, &'static str, Vec<(&'static str, String)>) {
        use AppError::*;

        match self {
            ValidationError(_) => (StatusCode::BAD_REQUEST, "error.validation", vec![]),
            InvalidPayload(reason) => {
                (StatusCode::BAD_REQUEST, "error.invalid_payload", vec![("reason", reason.clone())])
            }
            InvalidAmount => (StatusCode::BAD_REQUEST, "error.invalid_amount", vec![]),
            InvalidQuantity => (StatusCode::BAD_REQUEST, "error.invalid_quantity", vec![]),
            StoreContextMissing => (StatusCode::BAD_REQUEST, "error.store_context_missing", vec![]),
            CustomerRequiredForCredit => {
                (StatusCode::BAD_REQUEST, "error.customer_required_for_credit", vec![])
            }

            InvalidCredentials => (StatusCode::UNAUTHORIZED, "error.invalid_credentials", vec![]),
            InvalidToken => (StatusCode::UNAUTHORIZED, "error.invalid_token", vec![]),

            Forbidden => (StatusCode::FORBIDDEN, "error.forbidden", vec![]),
            StoreSuspended => (StatusCode::FORBIDDEN, "error.store_suspended", vec![]),
            SubscriptionInactive => (StatusCode::FORBIDDEN, "error.subscription_inactive", vec![]),
            PlanLimitReached(limit) => {
                (StatusCode::FORBIDDEN, "error.plan_limit_reached", vec![("limit", limit.clone())])
            }

            UserNotFound => (StatusCode::NOT_FOUND, "error.user_not_found", vec![]),
            StoreNotFound => (StatusCode::NOT_FOUND, "error.store_not_found", vec![]),
            BankAccountNotFound => (StatusCode::NOT_FOUND, "error.bank_account_not_found", vec![]),
            StaffNotFound => (StatusCode::NOT_FOUND, "error.staff_not_found", vec![]),
            ProductNotFound => (StatusCode::NOT_FOUND, "error.product_not_found", vec![]),
            CustomerNotFound => (StatusCode::NOT_FOUND, "error.customer_not_found", vec![]),
            SaleNotFound => (StatusCode::NOT_FOUND, "error.sale_not_found", vec![]),
            DuePaymentNotFound => (StatusCode::NOT_FOUND, "error.due_payment_not_found", vec![]),
            SupplierNotFound => (StatusCode::NOT_FOUND, "error.supplier_not_found", vec![]),
            PurchaseNotFound => (StatusCode::NOT_FOUND, "error.purchase_not_found", vec![]),
            RequestNotFound => (StatusCode::NOT_FOUND, "error.request_not_found", vec![]),
            PlanNotFound => (StatusCode::NOT_FOUND, "error.plan_not_found", vec![]),
            ChannelNotFound(name) => {
                (StatusCode::NOT_FOUND, "error.channel_not_found", vec![("channel", name.clone())])
            }

            EmailAlreadyExists => (StatusCode::CONFLICT, "error.email_exists", vec![]),
            PhoneAlreadyExists => (StatusCode::CONFLICT, "error.phone_exists", vec![]),
            SkuAlreadyExists(sku) => {
                (StatusCode::CONFLICT, "error.sku_exists", vec![("sku", sku.clone())])
            }
            InsufficientStock(product) => (
                StatusCode::CONFLICT,
                "error.insufficient_stock",
                vec![("product", product.clone())],
            ),
            CustomerAlreadyInStore => {
                (StatusCode::CONFLICT, "error.customer_already_in_store", vec![])
            }
            CustomerNotInStore => (StatusCode::CONFLICT, "error.customer_not_in_store", vec![]),
            CustomerHasOpenBalance => (StatusCode::CONFLICT, "error.customer_open_balance", vec![]),
            InsufficientBalance => (StatusCode::CONFLICT, "error.insufficient_balance", vec![]),
            SaleAlreadyVoided => (StatusCode::CONFLICT, "error.sale_already_voided", vec![]),
            DuePaymentSettled => (StatusCode::CONFLICT, "error.due_payment_settled", vec![]),
            PaymentExceedsDue => (StatusCode::CONFLICT, "error.payment_exceeds_due", vec![]),
            RequestAlreadyProcessed => (StatusCode::CONFLICT, "error.request_processed", vec![]),
            PendingRequestExists => (StatusCode::CONFLICT, "error.pending_request_exists", vec![]),
            PlanInactive => (StatusCode::CONFLICT, "error.plan_inactive", vec![]),

            // Todos os outros erros (banco, bcrypt, jwt, anyhow) viram 500.
            DatabaseError(_) | InternalServerError(_) | BcryptError(_) | JwtError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "error.internal", vec![])
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.describe().0
    }

    /// Converte o erro interno na resposta traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let (status, key, args) = self.describe();

        if status.is_server_error() {
            // O detalhe fica só no log, o cliente recebe a mensagem genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            // A mensagem do validator é uma chave ("required", "min_length"...)
                            let code = e.message.as_deref().unwrap_or(&e.code);
                            i18n.translate(&locale.0, &format!("validation.{}", code), &[])
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
                Some(json!(fields))
            }
            _ => None,
        };

        let args: Vec<(&str, &str)> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();

        ApiError {
            status,
            error: i18n.translate(&locale.0, key, &args),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn locale(lang: &str) -> Locale {
        Locale(lang.to_string())
    }

    #[test]
    fn business_refusals_are_conflicts() {
        assert_eq!(AppError::InsufficientStock("Café".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InsufficientBalance.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::RequestAlreadyProcessed.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::ProductNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn translates_with_arguments() {
        let i18n = I18nStore::load();
        let api = AppError::InsufficientStock("Café".into()).to_api_error(&locale("en"), &i18n);

        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.error.contains("Café"), "{}", api.error);
        assert!(api.details.is_none());
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let i18n = I18nStore::load();
        let err = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"));
        let api = err.to_api_error(&locale("pt"), &i18n);

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("hunter2"));
    }

    #[test]
    fn validation_errors_are_listed_per_field() {
        let i18n = I18nStore::load();
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("required".into());
        errors.add("name", err);

        let api = AppError::ValidationError(errors).to_api_error(&locale("en"), &i18n);
        let details = api.details.expect("details");

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(details["name"][0], i18n.translate("en", "validation.required", &[]));
    }
}
