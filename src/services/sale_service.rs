// src/services/sale_service.rs

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AuditEntry,
        ledger_repo::NewTransaction,
        sale_repo::{NewSale, NewSaleItem},
        AuditRepository, CustomerRepository, LedgerRepository, ProductRepository, SaleRepository,
        StoreRepository,
    },
    models::{
        auth::User,
        ledger::LedgerKind,
        product::{LineItemPayload, Product},
        sale::{
            CreateSalePayload, PaymentMethod, Sale, SaleDetail, SaleItem, SaleQuery, SaleSource,
            SaleStatus,
        },
        store::Store,
    },
    services::{ledger_service::post_to_ledger, subscription_service::SubscriptionService},
};

// ---
// Aritmética da venda (sem banco)
// ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub paid: Decimal,
    pub due: Decimal,
}

/// qty × preço − desconto da linha, nunca abaixo de zero.
pub fn line_total(quantity: Decimal, unit_price: Decimal, discount: Decimal) -> Decimal {
    (quantity * unit_price - discount).max(Decimal::ZERO).round_dp(2)
}

/// O desconto geral incide antes do imposto; o imposto é arredondado em 2 casas.
pub fn compute_totals(line_totals: &[Decimal], discount: Decimal, tax_rate: Decimal) -> SaleTotals {
    let subtotal: Decimal = line_totals.iter().copied().sum();
    let taxable = (subtotal - discount).max(Decimal::ZERO);
    let tax = (taxable * tax_rate / Decimal::ONE_HUNDRED).round_dp(2);

    SaleTotals {
        subtotal,
        // O desconto efetivo não passa do subtotal
        discount: subtotal - taxable,
        tax,
        total: taxable + tax,
    }
}

/// Quanto entra agora e quanto vira conta a receber.
pub fn settle(
    method: PaymentMethod,
    total: Decimal,
    requested_paid: Option<Decimal>,
    has_customer: bool,
) -> Result<Settlement, AppError> {
    let paid = match method {
        PaymentMethod::Cash | PaymentMethod::Card => requested_paid.unwrap_or(total),
        PaymentMethod::Balance => {
            if !has_customer {
                return Err(AppError::CustomerRequiredForCredit);
            }
            total
        }
        PaymentMethod::Credit => {
            if !has_customer {
                return Err(AppError::CustomerRequiredForCredit);
            }
            requested_paid.unwrap_or(Decimal::ZERO)
        }
    };

    if paid < Decimal::ZERO || paid > total {
        return Err(AppError::InvalidAmount);
    }

    let due = total - paid;
    if due > Decimal::ZERO && !has_customer {
        return Err(AppError::CustomerRequiredForCredit);
    }

    Ok(Settlement { paid, due })
}

/// Quantidade pedida por produto, somando linhas repetidas.
pub fn required_quantities(items: &[LineItemPayload]) -> BTreeMap<Uuid, Decimal> {
    let mut required = BTreeMap::new();
    for item in items {
        *required.entry(item.product_id).or_insert(Decimal::ZERO) += item.quantity;
    }
    required
}

/// Estoque a devolver no estorno, por produto. A ordem do mapa é a mesma do `lock_many`.
pub fn restock_quantities(items: &[SaleItem]) -> BTreeMap<Uuid, Decimal> {
    let mut restock = BTreeMap::new();
    for item in items {
        *restock.entry(item.product_id).or_insert(Decimal::ZERO) += item.quantity;
    }
    restock
}

/// Quanto a venda ainda deve ao saldo do cliente: débitos da nota e das contas
/// quitadas com saldo, menos estornos já lançados. Depósitos e ajustes não entram.
pub fn refund_amount(postings: &[(LedgerKind, Decimal)]) -> Decimal {
    let net: Decimal = postings
        .iter()
        .filter(|(kind, _)| {
            matches!(kind, LedgerKind::Invoice | LedgerKind::Payment | LedgerKind::Refund)
        })
        .map(|(_, amount)| *amount)
        .sum();
    (-net).max(Decimal::ZERO)
}

/// Todos os produtos existem, estão ativos e têm estoque para o total pedido.
pub fn check_stock(
    items: &[LineItemPayload],
    products: &HashMap<Uuid, Product>,
) -> Result<(), AppError> {
    for (product_id, quantity) in required_quantities(items) {
        let product = products
            .get(&product_id)
            .filter(|p| p.is_active)
            .ok_or(AppError::ProductNotFound)?;

        if product.stock < quantity {
            return Err(AppError::InsufficientStock(product.name.clone()));
        }
    }
    Ok(())
}

// ---
// O checkout: comum ao PDV e ao portal
// ---

#[derive(Debug)]
pub struct Checkout<'a> {
    pub items: &'a [LineItemPayload],
    pub customer_id: Option<Uuid>,
    pub discount: Decimal,
    pub payment_method: PaymentMethod,
    pub paid_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<&'a str>,
    pub cashier_id: Option<Uuid>,
    pub source: SaleSource,
}

#[derive(Clone)]
pub struct SaleService {
    sale_repo: SaleRepository,
    product_repo: ProductRepository,
    customer_repo: CustomerRepository,
    ledger_repo: LedgerRepository,
    store_repo: StoreRepository,
    audit_repo: AuditRepository,
    subscription_service: SubscriptionService,
    pool: PgPool,
}

impl SaleService {
    pub fn new(
        sale_repo: SaleRepository,
        product_repo: ProductRepository,
        customer_repo: CustomerRepository,
        ledger_repo: LedgerRepository,
        store_repo: StoreRepository,
        audit_repo: AuditRepository,
        subscription_service: SubscriptionService,
        pool: PgPool,
    ) -> Self {
        Self {
            sale_repo,
            product_repo,
            customer_repo,
            ledger_repo,
            store_repo,
            audit_repo,
            subscription_service,
            pool,
        }
    }

    pub async fn create_sale(
        &self,
        cashier: &User,
        store: &Store,
        payload: &CreateSalePayload,
    ) -> Result<SaleDetail, AppError> {
        let checkout = Checkout {
            items: &payload.items,
            customer_id: payload.customer_id,
            discount: payload.discount.unwrap_or(Decimal::ZERO),
            payment_method: payload.payment_method,
            paid_amount: payload.paid_amount,
            due_date: payload.due_date,
            notes: payload.notes.as_deref(),
            cashier_id: Some(cashier.id),
            source: SaleSource::Pos,
        };
        self.checkout(store, checkout).await
    }

    /// Uma única transação: numeração, estoque, saldo, conta a receber e auditoria.
    pub async fn checkout(
        &self,
        store: &Store,
        order: Checkout<'_>,
    ) -> Result<SaleDetail, AppError> {
        // 1. Assinatura (fora da transação: a marcação de EXPIRED precisa persistir)
        self.subscription_service.ensure_usable(store).await?;

        if order.items.is_empty() {
            return Err(AppError::InvalidQuantity);
        }
        if order.discount < Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }
        for item in order.items {
            if item.quantity <= Decimal::ZERO {
                return Err(AppError::InvalidQuantity);
            }
            let negative_price = item.unit_price.is_some_and(|p| p < Decimal::ZERO);
            let negative_discount = item.discount.is_some_and(|d| d < Decimal::ZERO);
            if negative_price || negative_discount {
                return Err(AppError::InvalidAmount);
            }
        }

        let mut tx = self.pool.begin().await?;

        // 2. Trava a loja e reserva o número da nota
        let store = self.store_repo.lock(&mut *tx, store.id).await?;
        let invoice_number = self.sale_repo.next_invoice_number(&mut *tx, store.id).await?;

        // 3. Trava os produtos e confere o estoque somando linhas repetidas
        let product_ids: Vec<Uuid> = required_quantities(order.items).into_keys().collect();
        let products: HashMap<Uuid, Product> = self
            .product_repo
            .lock_many(&mut *tx, store.id, &product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        check_stock(order.items, &products)?;

        // 4. Preço das linhas e totais
        let mut lines = Vec::with_capacity(order.items.len());
        for item in order.items {
            let product = products.get(&item.product_id).ok_or(AppError::ProductNotFound)?;
            let unit_price = item.unit_price.unwrap_or(product.price);
            let discount = item.discount.unwrap_or(Decimal::ZERO);
            let total = line_total(item.quantity, unit_price, discount);
            lines.push((item, product, unit_price, discount, total));
        }

        let line_totals: Vec<Decimal> = lines.iter().map(|(.., total)| *total).collect();
        let totals = compute_totals(&line_totals, order.discount, store.tax_rate);

        // 5. Pagamento
        let settlement = settle(
            order.payment_method,
            totals.total,
            order.paid_amount,
            order.customer_id.is_some(),
        )?;

        // 6. O cliente precisa ser da loja (o vínculo fica travado para o débito)
        let mut relation = match order.customer_id {
            Some(customer_id) => Some(
                self.customer_repo
                    .lock_relation(&mut *tx, store.id, customer_id)
                    .await?,
            ),
            None => None,
        };

        if order.payment_method == PaymentMethod::Balance {
            let balance = relation.as_ref().map(|r| r.balance).unwrap_or(Decimal::ZERO);
            if balance < totals.total {
                return Err(AppError::InsufficientBalance);
            }
        }

        // 7. Grava cabeçalho e linhas, baixa o estoque
        let sale = self
            .sale_repo
            .insert_sale(
                &mut *tx,
                &NewSale {
                    store_id: store.id,
                    invoice_number,
                    customer_id: order.customer_id,
                    cashier_id: order.cashier_id,
                    source: order.source,
                    subtotal: totals.subtotal,
                    discount: totals.discount,
                    tax: totals.tax,
                    total: totals.total,
                    paid_amount: settlement.paid,
                    due_amount: settlement.due,
                    payment_method: order.payment_method,
                    notes: order.notes,
                },
            )
            .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (item, product, unit_price, discount, total) in &lines {
            let row = self
                .sale_repo
                .insert_item(
                    &mut *tx,
                    &NewSaleItem {
                        sale_id: sale.id,
                        store_id: store.id,
                        product_id: product.id,
                        product_name: &product.name,
                        quantity: item.quantity,
                        unit_price: *unit_price,
                        unit_cost: product.cost_price,
                        discount: *discount,
                        line_total: *total,
                    },
                )
                .await?;
            items.push(row);

            self.product_repo.add_stock(&mut *tx, store.id, product.id, -item.quantity).await?;
        }

        // 8. Débito no saldo do cliente
        if let (PaymentMethod::Balance, Some(relation)) =
            (order.payment_method, relation.as_mut())
        {
            let mut entry = NewTransaction::new(
                store.id,
                relation.customer_id,
                LedgerKind::Invoice,
                -totals.total,
            );
            entry.sale_id = Some(sale.id);
            entry.created_by = order.cashier_id;
            post_to_ledger(
                &self.customer_repo,
                &self.ledger_repo,
                &mut *tx,
                relation,
                entry,
            ).await?;
        }

        // 9. O que faltou pagar vira conta a receber
        if settlement.due > Decimal::ZERO {
            let customer_id = order.customer_id.ok_or(AppError::CustomerRequiredForCredit)?;
            self.ledger_repo
                .create_due(
                    &mut *tx,
                    store.id,
                    customer_id,
                    Some(sale.id),
                    settlement.due,
                    order.due_date,
                    order.notes,
                )
                .await?;
        }

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store.id),
                    user_id: order.cashier_id,
                    action: "sale.create",
                    entity: "sale",
                    entity_id: Some(sale.id),
                    details: json!({
                        "invoiceNumber": sale.invoice_number,
                        "total": sale.total,
                        "paymentMethod": sale.payment_method,
                        "source": sale.source,
                    }),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!("🧾 Venda #{} da loja {} ({})", sale.invoice_number, store.id, sale.total);
        self.with_customer_name(sale, items).await
    }

    pub async fn list_sales(
        &self,
        store_id: Uuid,
        query: &SaleQuery,
    ) -> Result<Vec<Sale>, AppError> {
        self.sale_repo.list(store_id, query).await
    }

    pub async fn get_sale(&self, store_id: Uuid, sale_id: Uuid) -> Result<SaleDetail, AppError> {
        let sale = self
            .sale_repo
            .find(&self.pool, store_id, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;
        let items = self.sale_repo.items(&self.pool, sale.id).await?;

        self.with_customer_name(sale, items).await
    }

    /// Estorno: devolve estoque e saldo, cancela o que estava em aberto.
    pub async fn void_sale(
        &self,
        user: &User,
        store_id: Uuid,
        sale_id: Uuid,
        reason: &str,
    ) -> Result<Sale, AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = self.sale_repo.lock(&mut *tx, store_id, sale_id).await?;
        if sale.status == SaleStatus::Voided {
            return Err(AppError::SaleAlreadyVoided);
        }

        // 1. Estoque de volta, travando os produtos na mesma ordem do checkout
        let items = self.sale_repo.items(&mut *tx, sale.id).await?;
        let restock = restock_quantities(&items);
        let product_ids: Vec<Uuid> = restock.keys().copied().collect();
        self.product_repo.lock_many(&mut *tx, store_id, &product_ids).await?;

        for (product_id, quantity) in &restock {
            self.product_repo.add_stock(&mut *tx, store_id, *product_id, *quantity).await?;
        }

        // 2. Saldo de volta (tudo o que foi debitado do saldo por esta venda)
        if let Some(customer_id) = sale.customer_id {
            let postings = self.ledger_repo.sale_postings(&mut *tx, sale.id).await?;
            let debited = refund_amount(&postings);
            if debited > Decimal::ZERO {
                let mut relation = self
                    .customer_repo
                    .lock_relation(&mut *tx, store_id, customer_id)
                    .await?;
                let mut entry = NewTransaction::new(
                    store_id,
                    customer_id,
                    LedgerKind::Refund,
                    debited,
                );
                entry.sale_id = Some(sale.id);
                entry.description = Some(reason);
                entry.created_by = Some(user.id);
                post_to_ledger(
                    &self.customer_repo,
                    &self.ledger_repo,
                    &mut *tx,
                    &mut relation,
                    entry,
                ).await?;
            }
        }

        // 3. Contas a receber abertas desta venda
        self.ledger_repo.cancel_dues_for_sale(&mut *tx, sale.id).await?;

        let voided = self.sale_repo.mark_voided(&mut *tx, sale.id, user.id, reason).await?;

        self.audit_repo
            .record(
                &mut *tx,
                AuditEntry {
                    store_id: Some(store_id),
                    user_id: Some(user.id),
                    action: "sale.void",
                    entity: "sale",
                    entity_id: Some(sale.id),
                    details: json!({ "invoiceNumber": sale.invoice_number, "reason": reason }),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!("↩️ Venda #{} da loja {} estornada", sale.invoice_number, store_id);
        Ok(voided)
    }

    async fn with_customer_name(
        &self,
        sale: Sale,
        items: Vec<SaleItem>,
    ) -> Result<SaleDetail, AppError> {
        let customer_name = match sale.customer_id {
            Some(customer_id) => self
                .customer_repo
                .find_by_id(customer_id)
                .await?
                .map(|c| c.full_name),
            None => None,
        };

        Ok(SaleDetail { header: sale, customer_name, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    fn product(stock: &str, is_active: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            sku: "CAFE-500".into(),
            name: "Café 500g".into(),
            description: None,
            category: None,
            unit: "un".into(),
            price: dec("18.90"),
            cost_price: dec("11.25"),
            stock: dec(stock),
            low_stock_threshold: Decimal::ZERO,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(product_id: Uuid, quantity: &str) -> LineItemPayload {
        LineItemPayload { product_id, quantity: dec(quantity), unit_price: None, discount: None }
    }

    #[test]
    fn line_discount_never_makes_a_negative_line() {
        assert_eq!(line_total(dec("2"), dec("50.00"), dec("10")), dec("90.00"));
        assert_eq!(line_total(dec("1"), dec("5.00"), dec("8")), Decimal::ZERO);
        assert_eq!(line_total(dec("0.333"), dec("10.00"), Decimal::ZERO), dec("3.33"));
    }

    #[test]
    fn totals_apply_discount_before_tax() {
        let totals = compute_totals(&[dec("100.00"), dec("50.00")], dec("10.00"), dec("5"));
        assert_eq!(totals.subtotal, dec("150.00"));
        assert_eq!(totals.discount, dec("10.00"));
        assert_eq!(totals.tax, dec("7.00"));
        assert_eq!(totals.total, dec("147.00"));
    }

    #[test]
    fn tax_is_rounded_to_cents() {
        let totals = compute_totals(&[dec("9.99")], Decimal::ZERO, dec("7.5"));
        assert_eq!(totals.tax, dec("0.75"));
        assert_eq!(totals.total, dec("10.74"));
    }

    #[test]
    fn discount_larger_than_subtotal_zeroes_the_sale() {
        let totals = compute_totals(&[dec("20.00")], dec("35.00"), dec("10"));
        assert_eq!(totals.discount, dec("20.00"));
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn cash_defaults_to_full_payment() {
        let s = settle(PaymentMethod::Cash, dec("80.00"), None, false).unwrap();
        assert_eq!(s, Settlement { paid: dec("80.00"), due: Decimal::ZERO });
    }

    #[test]
    fn partial_cash_needs_a_customer_for_the_rest() {
        assert!(matches!(
            settle(PaymentMethod::Cash, dec("80.00"), Some(dec("50.00")), false),
            Err(AppError::CustomerRequiredForCredit)
        ));
        let s = settle(PaymentMethod::Cash, dec("80.00"), Some(dec("50.00")), true).unwrap();
        assert_eq!(s.due, dec("30.00"));
    }

    #[test]
    fn credit_defaults_to_nothing_paid() {
        let s = settle(PaymentMethod::Credit, dec("80.00"), None, true).unwrap();
        assert_eq!(s, Settlement { paid: Decimal::ZERO, due: dec("80.00") });
        assert!(matches!(
            settle(PaymentMethod::Credit, dec("80.00"), None, false),
            Err(AppError::CustomerRequiredForCredit)
        ));
    }

    #[test]
    fn balance_always_pays_in_full() {
        let s = settle(PaymentMethod::Balance, dec("80.00"), Some(dec("1.00")), true).unwrap();
        assert_eq!(s, Settlement { paid: dec("80.00"), due: Decimal::ZERO });
    }

    #[test]
    fn paid_outside_zero_to_total_is_invalid() {
        assert!(matches!(
            settle(PaymentMethod::Card, dec("80.00"), Some(dec("80.01")), true),
            Err(AppError::InvalidAmount)
        ));
        assert!(matches!(
            settle(PaymentMethod::Credit, dec("80.00"), Some(dec("-1")), true),
            Err(AppError::InvalidAmount)
        ));
    }

    #[test]
    fn repeated_lines_are_checked_together() {
        let coffee = product("3", true);
        let products = HashMap::from([(coffee.id, coffee.clone())]);

        assert!(check_stock(&[line(coffee.id, "2"), line(coffee.id, "1")], &products).is_ok());
        assert!(matches!(
            check_stock(&[line(coffee.id, "2"), line(coffee.id, "2")], &products),
            Err(AppError::InsufficientStock(name)) if name == "Café 500g"
        ));
    }

    #[test]
    fn missing_or_inactive_products_are_not_found() {
        let inactive = product("10", false);
        let products = HashMap::from([(inactive.id, inactive.clone())]);

        assert!(matches!(
            check_stock(&[line(inactive.id, "1")], &products),
            Err(AppError::ProductNotFound)
        ));
        assert!(matches!(
            check_stock(&[line(Uuid::new_v4(), "1")], &products),
            Err(AppError::ProductNotFound)
        ));
    }

    fn sold(product_id: Uuid, quantity: &str) -> SaleItem {
        SaleItem {
            id: Uuid::new_v4(),
            sale_id: Uuid::nil(),
            store_id: Uuid::nil(),
            product_id,
            product_name: "Café 500g".into(),
            quantity: dec(quantity),
            unit_price: dec("18.90"),
            unit_cost: dec("11.25"),
            discount: Decimal::ZERO,
            line_total: Decimal::ZERO,
        }
    }

    #[test]
    fn void_restocks_each_product_once_in_lock_order() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        // Linhas gravadas com o produto "maior" primeiro
        let items = [sold(high, "2"), sold(low, "1.5"), sold(high, "0.5")];

        let restock = restock_quantities(&items);

        assert_eq!(restock.keys().copied().collect::<Vec<_>>(), vec![low, high]);
        assert_eq!(restock[&low], dec("1.5"));
        assert_eq!(restock[&high], dec("2.5"));
    }

    #[test]
    fn refund_covers_invoice_and_balance_payments_of_dues() {
        let postings = [
            (LedgerKind::Invoice, dec("-40.00")),
            (LedgerKind::Payment, dec("-15.00")),
            (LedgerKind::Payment, dec("-5.00")),
        ];
        assert_eq!(refund_amount(&postings), dec("60.00"));
    }

    #[test]
    fn refund_ignores_deposits_and_adjustments() {
        let postings = [
            (LedgerKind::Deposit, dec("100.00")),
            (LedgerKind::Adjustment, dec("-7.00")),
            (LedgerKind::Invoice, dec("-30.00")),
        ];
        assert_eq!(refund_amount(&postings), dec("30.00"));
    }

    #[test]
    fn cash_sale_has_nothing_to_refund() {
        assert_eq!(refund_amount(&[]), Decimal::ZERO);
        // Estorno já lançado zera o que faltava
        let postings = [(LedgerKind::Invoice, dec("-30.00")), (LedgerKind::Refund, dec("30.00"))];
        assert_eq!(refund_amount(&postings), Decimal::ZERO);
    }

    #[test]
    fn void_cancels_only_dues_still_open() {
        use crate::models::due_payment::DueStatus;

        assert!(DueStatus::Pending.is_open());
        assert!(DueStatus::Partial.is_open());
        assert!(!DueStatus::Paid.is_open());
        assert!(!DueStatus::Cancelled.is_open());
    }
}
