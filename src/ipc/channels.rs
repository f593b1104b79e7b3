// src/ipc/channels.rs
//
// Os canais "dominio:acao" usados pelo app desktop.

use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    ipc::{boxed, parse, parse_valid, reply, take_id, Access, CallContext, Channel, ChannelFuture},
    middleware::rbac::{MerchantOnly, RoleDef},
    models::{
        audit::AuditQuery,
        auth::{AuthResponse, LoginPayload, RegisterMerchantPayload},
        customer::{CreateCustomerPayload, CustomerQuery, UpdateCustomerPayload},
        due_payment::{DueQuery, PayDuePayload},
        ledger::{AdjustBalancePayload, DepositPayload, RejectPayload, RequestQuery},
        portal::{
            PortalDepositPayload,
            PortalLoginPayload,
            PortalOrderPayload,
            PortalRegisterPayload,
        },
        product::{AdjustStockPayload, CreateProductPayload, ProductQuery, UpdateProductPayload},
        purchase::{CreatePurchasePayload, SupplierPayload},
        sale::{CreateSalePayload, SaleQuery, VoidSalePayload},
        staff::{CreateCashierPayload, UpdateCashierPayload},
        store::{
            CreateBankAccountPayload,
            CreateStorePayload,
            StoreStatusPayload,
            UpdateStorePayload,
        },
        subscription::SubscriptionRequestPayload,
    },
};

macro_rules! channel {
    (
        $name:literal,
        $access:ident,
        fn $fn_name:ident($state:ident, $ctx:ident, $payload:ident) $body:block
    ) => {
        #[allow(unused_variables)]
        fn $fn_name($state: AppState, $ctx: CallContext, $payload: Value) -> ChannelFuture {
            boxed(async move $body)
        }

        inventory::submit! {
            Channel { name: $name, access: Access::$access, handler: $fn_name }
        }
    };
}

fn done() -> Result<Value, AppError> {
    Ok(json!({ "success": true }))
}

// Canais do portal levam a loja no payload
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalStore {
    store_id: Uuid,
}

// =============================================================================
//  AUTH, PLANOS E LOJAS
// =============================================================================

channel!("auth:register", Public, fn auth_register(state, _ctx, payload) {
    let payload: RegisterMerchantPayload = parse_valid(payload)?;
    let token = state.auth_service.register_merchant(&payload).await?;
    reply(AuthResponse { token })
});

channel!("auth:login", Public, fn auth_login(state, _ctx, payload) {
    let payload: LoginPayload = parse_valid(payload)?;
    let token = state.auth_service.login(&payload).await?;
    reply(AuthResponse { token })
});

channel!("auth:me", User, fn auth_me(_state, ctx, _payload) {
    reply(ctx.user()?)
});

channel!("plans:list", Public, fn plans_list(state, _ctx, _payload) {
    reply(state.subscription_service.list_active_plans().await?)
});

channel!("stores:mine", User, fn stores_mine(state, ctx, _payload) {
    reply(state.auth_service.my_stores(ctx.user()?).await?)
});

channel!("stores:create", User, fn stores_create(state, ctx, payload) {
    let user = ctx.user()?;
    if !MerchantOnly::allows(user.role) {
        return Err(AppError::Forbidden);
    }
    let payload: CreateStorePayload = parse_valid(payload)?;
    reply(state.store_service.create_store(user, &payload).await?)
});

channel!("store:get", Store, fn store_get(_state, ctx, _payload) {
    reply(ctx.store()?)
});

channel!("store:update", Merchant, fn store_update(state, ctx, payload) {
    let payload: UpdateStorePayload = parse_valid(payload)?;
    reply(state.store_service.update_store(ctx.user()?, ctx.store()?.id, &payload).await?)
});

channel!("store:bank-accounts", Store, fn store_bank_accounts(state, ctx, _payload) {
    reply(state.store_service.list_bank_accounts(ctx.store()?.id).await?)
});

channel!("store:add-bank-account", Merchant, fn store_add_bank_account(state, ctx, payload) {
    let payload: CreateBankAccountPayload = parse_valid(payload)?;
    reply(state.store_service.add_bank_account(ctx.store()?.id, &payload).await?)
});

channel!("store:remove-bank-account", Merchant, fn store_remove_bank_account(state, ctx, payload) {
    let mut payload = payload;
    let account_id = take_id(&mut payload, "id")?;
    state.store_service.remove_bank_account(ctx.store()?.id, account_id).await?;
    done()
});

// =============================================================================
//  RH
// =============================================================================

channel!("staff:list", Merchant, fn staff_list(state, ctx, _payload) {
    reply(state.staff_service.list_staff(ctx.store()?.id).await?)
});

channel!("staff:create", Merchant, fn staff_create(state, ctx, payload) {
    let payload: CreateCashierPayload = parse_valid(payload)?;
    reply(state.staff_service.create_cashier(ctx.user()?, ctx.store()?.id, &payload).await?)
});

channel!("staff:update", Merchant, fn staff_update(state, ctx, payload) {
    let mut payload = payload;
    let cashier_id = take_id(&mut payload, "id")?;
    let payload: UpdateCashierPayload = parse_valid(payload)?;
    let store_id = ctx.store()?.id;
    reply(state.staff_service.update_cashier(ctx.user()?, store_id, cashier_id, &payload).await?)
});

channel!("staff:delete", Merchant, fn staff_delete(state, ctx, payload) {
    let mut payload = payload;
    let cashier_id = take_id(&mut payload, "id")?;
    state.staff_service.delete_cashier(ctx.user()?, ctx.store()?.id, cashier_id).await?;
    done()
});

// =============================================================================
//  PRODUTOS
// =============================================================================

channel!("products:list", Store, fn products_list(state, ctx, payload) {
    let query: ProductQuery = parse(payload)?;
    reply(state.product_service.list_products(ctx.store()?.id, &query).await?)
});

channel!("products:low-stock", Store, fn products_low_stock(state, ctx, _payload) {
    reply(state.product_service.low_stock(ctx.store()?.id).await?)
});

channel!("products:get", Store, fn products_get(state, ctx, payload) {
    let mut payload = payload;
    let product_id = take_id(&mut payload, "id")?;
    reply(state.product_service.get_product(ctx.store()?.id, product_id).await?)
});

channel!("products:create", Merchant, fn products_create(state, ctx, payload) {
    let payload: CreateProductPayload = parse_valid(payload)?;
    reply(state.product_service.create_product(ctx.user()?, ctx.store()?.id, &payload).await?)
});

channel!("products:update", Merchant, fn products_update(state, ctx, payload) {
    let mut payload = payload;
    let product_id = take_id(&mut payload, "id")?;
    let payload: UpdateProductPayload = parse_valid(payload)?;
    reply(state.product_service.update_product(ctx.store()?.id, product_id, &payload).await?)
});

channel!("products:delete", Merchant, fn products_delete(state, ctx, payload) {
    let mut payload = payload;
    let product_id = take_id(&mut payload, "id")?;
    state.product_service.delete_product(ctx.user()?, ctx.store()?.id, product_id).await?;
    done()
});

channel!("products:adjust-stock", Store, fn products_adjust_stock(state, ctx, payload) {
    let mut payload = payload;
    let product_id = take_id(&mut payload, "id")?;
    let payload: AdjustStockPayload = parse_valid(payload)?;
    let store_id = ctx.store()?.id;
    reply(state.product_service.adjust_stock(ctx.user()?, store_id, product_id, &payload).await?)
});

// =============================================================================
//  CLIENTES E SALDO
// =============================================================================

channel!("customers:list", Store, fn customers_list(state, ctx, payload) {
    let query: CustomerQuery = parse(payload)?;
    reply(state.customer_service.list_customers(ctx.store()?.id, &query).await?)
});

channel!("customers:get", Store, fn customers_get(state, ctx, payload) {
    let mut payload = payload;
    let customer_id = take_id(&mut payload, "id")?;
    reply(state.customer_service.get_customer(ctx.store()?.id, customer_id).await?)
});

channel!("customers:create", Store, fn customers_create(state, ctx, payload) {
    let payload: CreateCustomerPayload = parse_valid(payload)?;
    reply(state.customer_service.create_customer(ctx.user()?, ctx.store()?.id, &payload).await?)
});

channel!("customers:update", Store, fn customers_update(state, ctx, payload) {
    let mut payload = payload;
    let customer_id = take_id(&mut payload, "id")?;
    let payload: UpdateCustomerPayload = parse_valid(payload)?;
    reply(state.customer_service.update_customer(ctx.store()?.id, customer_id, &payload).await?)
});

channel!("customers:remove", Merchant, fn customers_remove(state, ctx, payload) {
    let mut payload = payload;
    let customer_id = take_id(&mut payload, "id")?;
    state.customer_service.remove_customer(ctx.user()?, ctx.store()?.id, customer_id).await?;
    done()
});

channel!("customer-balance:transactions", Store, fn balance_transactions(state, ctx, payload) {
    let mut payload = payload;
    let customer_id = take_id(&mut payload, "customerId")?;
    reply(state.ledger_service.list_transactions(ctx.store()?.id, customer_id).await?)
});

channel!("customer-balance:deposit", Merchant, fn balance_deposit(state, ctx, payload) {
    let mut payload = payload;
    let customer_id = take_id(&mut payload, "customerId")?;
    let payload: DepositPayload = parse_valid(payload)?;
    reply(state.ledger_service.deposit(ctx.user()?, ctx.store()?.id, customer_id, &payload).await?)
});

channel!("customer-balance:adjust", Merchant, fn balance_adjust(state, ctx, payload) {
    let mut payload = payload;
    let customer_id = take_id(&mut payload, "customerId")?;
    let payload: AdjustBalancePayload = parse_valid(payload)?;
    reply(state.ledger_service.adjust(ctx.user()?, ctx.store()?.id, customer_id, &payload).await?)
});

channel!("customer-balance:requests", Store, fn balance_requests(state, ctx, payload) {
    let query: RequestQuery = parse(payload)?;
    reply(state.ledger_service.list_requests(ctx.store()?.id, query.status).await?)
});

channel!("customer-balance:approve", Merchant, fn balance_approve(state, ctx, payload) {
    let mut payload = payload;
    let request_id = take_id(&mut payload, "id")?;
    reply(state.ledger_service.approve_request(ctx.user()?, ctx.store()?.id, request_id).await?)
});

channel!("customer-balance:reject", Merchant, fn balance_reject(state, ctx, payload) {
    let mut payload = payload;
    let request_id = take_id(&mut payload, "id")?;
    let payload: RejectPayload = parse_valid(payload)?;
    let store_id = ctx.store()?.id;
    let request = state
        .ledger_service
        .reject_request(ctx.user()?, store_id, request_id, &payload.reason)
        .await?;
    reply(request)
});

// =============================================================================
//  VENDAS E CONTAS A RECEBER
// =============================================================================

channel!("sales:create", Store, fn sales_create(state, ctx, payload) {
    let payload: CreateSalePayload = parse_valid(payload)?;
    reply(state.sale_service.create_sale(ctx.user()?, ctx.store()?, &payload).await?)
});

channel!("sales:list", Store, fn sales_list(state, ctx, payload) {
    let query: SaleQuery = parse(payload)?;
    reply(state.sale_service.list_sales(ctx.store()?.id, &query).await?)
});

channel!("sales:get", Store, fn sales_get(state, ctx, payload) {
    let mut payload = payload;
    let sale_id = take_id(&mut payload, "id")?;
    reply(state.sale_service.get_sale(ctx.store()?.id, sale_id).await?)
});

channel!("sales:void", Merchant, fn sales_void(state, ctx, payload) {
    let mut payload = payload;
    let sale_id = take_id(&mut payload, "id")?;
    let payload: VoidSalePayload = parse_valid(payload)?;
    let store_id = ctx.store()?.id;
    reply(state.sale_service.void_sale(ctx.user()?, store_id, sale_id, &payload.reason).await?)
});

channel!("due-payments:list", Store, fn due_payments_list(state, ctx, payload) {
    let query: DueQuery = parse(payload)?;
    reply(state.due_payment_service.list_due_payments(ctx.store()?.id, &query).await?)
});

channel!("due-payments:pay", Store, fn due_payments_pay(state, ctx, payload) {
    let mut payload = payload;
    let due_id = take_id(&mut payload, "id")?;
    let payload: PayDuePayload = parse_valid(payload)?;
    reply(state.due_payment_service.pay_due(ctx.user()?, ctx.store()?.id, due_id, &payload).await?)
});

// =============================================================================
//  FORNECEDORES E COMPRAS
// =============================================================================

channel!("suppliers:list", Store, fn suppliers_list(state, ctx, _payload) {
    reply(state.purchase_service.list_suppliers(ctx.store()?.id).await?)
});

channel!("suppliers:create", Merchant, fn suppliers_create(state, ctx, payload) {
    let payload: SupplierPayload = parse_valid(payload)?;
    reply(state.purchase_service.create_supplier(ctx.store()?.id, &payload).await?)
});

channel!("suppliers:update", Merchant, fn suppliers_update(state, ctx, payload) {
    let mut payload = payload;
    let supplier_id = take_id(&mut payload, "id")?;
    let payload: SupplierPayload = parse_valid(payload)?;
    reply(state.purchase_service.update_supplier(ctx.store()?.id, supplier_id, &payload).await?)
});

channel!("suppliers:delete", Merchant, fn suppliers_delete(state, ctx, payload) {
    let mut payload = payload;
    let supplier_id = take_id(&mut payload, "id")?;
    state.purchase_service.delete_supplier(ctx.store()?.id, supplier_id).await?;
    done()
});

channel!("purchases:create", Merchant, fn purchases_create(state, ctx, payload) {
    let payload: CreatePurchasePayload = parse_valid(payload)?;
    reply(state.purchase_service.create_purchase(ctx.user()?, ctx.store()?.id, &payload).await?)
});

channel!("purchases:list", Store, fn purchases_list(state, ctx, _payload) {
    reply(state.purchase_service.list_purchases(ctx.store()?.id).await?)
});

channel!("purchases:get", Store, fn purchases_get(state, ctx, payload) {
    let mut payload = payload;
    let purchase_id = take_id(&mut payload, "id")?;
    reply(state.purchase_service.get_purchase(ctx.store()?.id, purchase_id).await?)
});

// =============================================================================
//  ASSINATURA E AUDITORIA
// =============================================================================

channel!("subscription:current", Store, fn subscription_current(state, ctx, _payload) {
    reply(state.subscription_service.current(ctx.store()?).await?)
});

channel!("subscription:request", Merchant, fn subscription_request(state, ctx, payload) {
    let payload: SubscriptionRequestPayload = parse_valid(payload)?;
    reply(state.subscription_service.request(ctx.user()?, ctx.store()?.id, &payload).await?)
});

channel!("audit:list", Merchant, fn audit_list(state, ctx, payload) {
    let query: AuditQuery = parse(payload)?;
    reply(state.audit_service.list_for_store(ctx.store()?.id, query.limit).await?)
});

// =============================================================================
//  ADMIN DA PLATAFORMA
// =============================================================================

channel!("admin:stores", Admin, fn admin_stores(state, _ctx, _payload) {
    reply(state.admin_service.list_stores().await?)
});

channel!("admin:set-store-status", Admin, fn admin_set_store_status(state, ctx, payload) {
    let mut payload = payload;
    let store_id = take_id(&mut payload, "storeId")?;
    let payload: StoreStatusPayload = parse(payload)?;
    reply(state.admin_service.set_store_status(ctx.user()?, store_id, payload.is_active).await?)
});

channel!("admin:users", Admin, fn admin_users(state, _ctx, _payload) {
    reply(state.admin_service.list_users().await?)
});

channel!("admin:audit-logs", Admin, fn admin_audit_logs(state, _ctx, payload) {
    let query: AuditQuery = parse(payload)?;
    reply(state.admin_service.list_audit_logs(query.store_id, query.limit).await?)
});

// =============================================================================
//  PORTAL DO CLIENTE
// =============================================================================

channel!("portal:register", Public, fn portal_register(state, _ctx, payload) {
    let payload: PortalRegisterPayload = parse_valid(payload)?;
    let token = state.portal_service.register(&payload).await?;
    reply(AuthResponse { token })
});

channel!("portal:login", Public, fn portal_login(state, _ctx, payload) {
    let payload: PortalLoginPayload = parse_valid(payload)?;
    let token = state.portal_service.login(&payload).await?;
    reply(AuthResponse { token })
});

channel!("portal:stores", Customer, fn portal_stores(state, ctx, _payload) {
    reply(state.portal_service.stores(ctx.customer()?).await?)
});

channel!("portal:products", Customer, fn portal_products(state, ctx, payload) {
    let PortalStore { store_id } = parse(payload)?;
    reply(state.portal_service.products(ctx.customer()?, store_id).await?)
});

channel!("portal:create-order", Customer, fn portal_create_order(state, ctx, payload) {
    let mut payload = payload;
    let store_id = take_id(&mut payload, "storeId")?;
    let payload: PortalOrderPayload = parse_valid(payload)?;
    reply(state.portal_service.create_order(ctx.customer()?, store_id, &payload).await?)
});

channel!("portal:orders", Customer, fn portal_orders(state, ctx, payload) {
    let PortalStore { store_id } = parse(payload)?;
    reply(state.portal_service.orders(ctx.customer()?, store_id).await?)
});

channel!("portal:transactions", Customer, fn portal_transactions(state, ctx, payload) {
    let PortalStore { store_id } = parse(payload)?;
    reply(state.portal_service.transactions(ctx.customer()?, store_id).await?)
});

channel!("portal:request-deposit", Customer, fn portal_request_deposit(state, ctx, payload) {
    let mut payload = payload;
    let store_id = take_id(&mut payload, "storeId")?;
    let payload: PortalDepositPayload = parse_valid(payload)?;
    reply(state.portal_service.request_deposit(ctx.customer()?, store_id, &payload).await?)
});

channel!("portal:requests", Customer, fn portal_requests(state, ctx, payload) {
    let PortalStore { store_id } = parse(payload)?;
    reply(state.portal_service.requests(ctx.customer()?, store_id).await?)
});
