// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth / Users ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::get_my_stores,

        // --- Stores ---
        handlers::stores::create_store,
        handlers::stores::get_store,
        handlers::stores::update_store,
        handlers::stores::list_bank_accounts,
        handlers::stores::add_bank_account,
        handlers::stores::remove_bank_account,

        // --- Staff ---
        handlers::staff::list_staff,
        handlers::staff::create_cashier,
        handlers::staff::update_cashier,
        handlers::staff::delete_cashier,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::low_stock,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::adjust_stock,

        // --- Customers / Balance ---
        handlers::customers::list_customers,
        handlers::customers::create_customer,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::remove_customer,
        handlers::customers::list_transactions,
        handlers::customers::deposit,
        handlers::customers::adjust_balance,
        handlers::balance_requests::list_requests,
        handlers::balance_requests::approve_request,
        handlers::balance_requests::reject_request,

        // --- Sales ---
        handlers::sales::create_sale,
        handlers::sales::list_sales,
        handlers::sales::get_sale,
        handlers::sales::void_sale,
        handlers::due_payments::list_due_payments,
        handlers::due_payments::pay_due,

        // --- Purchasing ---
        handlers::purchases::list_suppliers,
        handlers::purchases::get_supplier,
        handlers::purchases::create_supplier,
        handlers::purchases::update_supplier,
        handlers::purchases::delete_supplier,
        handlers::purchases::create_purchase,
        handlers::purchases::list_purchases,
        handlers::purchases::get_purchase,

        // --- Subscriptions / Audit ---
        handlers::subscriptions::list_plans,
        handlers::subscriptions::current_subscription,
        handlers::subscriptions::list_store_requests,
        handlers::subscriptions::request_subscription,
        handlers::audit::list_store_audit_logs,

        // --- Portal ---
        handlers::portal::register,
        handlers::portal::login,
        handlers::portal::get_me,
        handlers::portal::list_stores,
        handlers::portal::list_products,
        handlers::portal::create_order,
        handlers::portal::list_orders,
        handlers::portal::list_transactions,
        handlers::portal::request_deposit,
        handlers::portal::list_requests,

        // --- Admin ---
        handlers::admin::list_stores,
        handlers::admin::set_store_status,
        handlers::admin::list_users,
        handlers::admin::list_audit_logs,
        handlers::admin::list_plans,
        handlers::admin::create_plan,
        handlers::admin::update_plan,
        handlers::admin::delete_plan,
        handlers::admin::list_subscription_requests,
        handlers::admin::approve_subscription,
        handlers::admin::reject_subscription,

        // --- IPC ---
        handlers::ipc::list_channels,
        handlers::ipc::call_channel,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterMerchantPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Stores ---
            models::store::SubscriptionStatus,
            models::store::Store,
            models::store::BankAccount,
            models::store::CreateStorePayload,
            models::store::UpdateStorePayload,
            models::store::CreateBankAccountPayload,
            models::store::StoreStatusPayload,
            models::staff::CreateCashierPayload,
            models::staff::UpdateCashierPayload,

            // --- Products ---
            models::product::Product,
            models::product::CreateProductPayload,
            models::product::UpdateProductPayload,
            models::product::AdjustStockPayload,
            models::product::LineItemPayload,

            // --- Customers / Balance ---
            models::customer::Customer,
            models::customer::CustomerStoreRelation,
            models::customer::StoreCustomer,
            models::customer::CustomerMembership,
            models::customer::CreateCustomerPayload,
            models::customer::UpdateCustomerPayload,
            models::ledger::LedgerKind,
            models::ledger::RequestStatus,
            models::ledger::CustomerTransaction,
            models::ledger::BalanceRequest,
            models::ledger::DepositPayload,
            models::ledger::AdjustBalancePayload,
            models::ledger::RejectPayload,

            // --- Sales ---
            models::sale::PaymentMethod,
            models::sale::SaleStatus,
            models::sale::SaleSource,
            models::sale::Sale,
            models::sale::SaleItem,
            models::sale::SaleDetail,
            models::sale::CreateSalePayload,
            models::sale::VoidSalePayload,
            models::due_payment::DueStatus,
            models::due_payment::DuePayment,
            models::due_payment::DueSettlementMethod,
            models::due_payment::PayDuePayload,

            // --- Purchasing ---
            models::purchase::Supplier,
            models::purchase::SupplierPayload,
            models::purchase::Purchase,
            models::purchase::PurchaseItem,
            models::purchase::PurchaseDetail,
            models::purchase::PurchaseLinePayload,
            models::purchase::CreatePurchasePayload,

            // --- Subscriptions / Audit ---
            models::subscription::SubscriptionPlan,
            models::subscription::PlanPayload,
            models::subscription::SubscriptionRequest,
            models::subscription::SubscriptionRequestPayload,
            models::subscription::SubscriptionInfo,
            models::audit::AuditLog,

            // --- Portal ---
            models::portal::PortalRegisterPayload,
            models::portal::PortalLoginPayload,
            models::portal::PortalOrderPayload,
            models::portal::PortalDepositPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro do lojista e login"),
        (name = "Users", description = "Dados do usuário logado"),
        (name = "Stores", description = "Loja, configurações e contas bancárias"),
        (name = "Staff", description = "Caixas da loja"),
        (name = "Products", description = "Catálogo e estoque"),
        (name = "Customers", description = "Clientes da loja"),
        (name = "Customer Balance", description = "Saldo, extrato e pedidos de depósito"),
        (name = "Sales", description = "Vendas do PDV"),
        (name = "Due Payments", description = "Contas a receber"),
        (name = "Purchasing", description = "Fornecedores e compras"),
        (name = "Subscriptions", description = "Planos e assinatura da loja"),
        (name = "Audit", description = "Log de auditoria"),
        (name = "Portal", description = "Portal do cliente"),
        (name = "Admin", description = "Administração da plataforma"),
        (name = "IPC", description = "Tabela de canais do app desktop")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/sales",
            "/api/customers/{id}/deposit",
            "/api/portal/stores/{store_id}/orders",
        ] {
            assert!(doc.paths.paths.contains_key(path), "rota {} ausente", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
