// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        AuditRepository, CustomerRepository, LedgerRepository, ProductRepository,
        PurchaseRepository, SaleRepository, StoreRepository, SubscriptionRepository,
        UserRepository,
    },
    services::{
        admin_service::AdminService, audit_service::AuditService, auth::AuthService,
        customer_service::CustomerService, due_payment_service::DuePaymentService,
        ledger_service::LedgerService, portal_service::PortalService,
        product_service::ProductService, purchase_service::PurchaseService,
        sale_service::SaleService, staff_service::StaffService, store_service::StoreService,
        subscription_service::SubscriptionService,
    },
};

/// Variáveis de ambiente lidas na inicialização.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// `DB_ENV=local` aponta para o banco local; qualquer outro valor usa o remoto.
pub fn select_database_url(
    db_env: Option<&str>,
    remote: Option<String>,
    local: Option<String>,
) -> anyhow::Result<String> {
    match db_env.map(str::trim) {
        Some(e) if e.eq_ignore_ascii_case("local") => {
            local.context("DB_ENV=local exige DATABASE_URL_LOCAL")
        }
        _ => remote.context("DATABASE_URL deve ser definida"),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = select_database_url(
            env::var("DB_ENV").ok().as_deref(),
            env::var("DATABASE_URL").ok(),
            env::var("DATABASE_URL_LOCAL").ok(),
        )?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            max_connections,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub store_service: StoreService,
    pub staff_service: StaffService,
    pub product_service: ProductService,
    pub customer_service: CustomerService,
    pub ledger_service: LedgerService,
    pub sale_service: SaleService,
    pub due_payment_service: DuePaymentService,
    pub purchase_service: PurchaseService,
    pub portal_service: PortalService,
    pub subscription_service: SubscriptionService,
    pub admin_service: AdminService,
    pub audit_service: AuditService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::build(db_pool, &config.jwt_secret))
    }

    // --- Monta o gráfico de dependências ---
    pub fn build(db_pool: PgPool, jwt_secret: &str) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let store_repo = StoreRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let ledger_repo = LedgerRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new(db_pool.clone());
        let purchase_repo = PurchaseRepository::new(db_pool.clone());
        let subscription_repo = SubscriptionRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());

        let audit_service = AuditService::new(audit_repo.clone());
        let ledger_service = LedgerService::new(
            ledger_repo.clone(),
            customer_repo.clone(),
            audit_repo.clone(),
            db_pool.clone(),
        );
        let subscription_service = SubscriptionService::new(
            subscription_repo.clone(),
            store_repo.clone(),
            audit_repo.clone(),
            db_pool.clone(),
        );

        let sale_service = SaleService::new(
            sale_repo.clone(),
            product_repo.clone(),
            customer_repo.clone(),
            ledger_repo.clone(),
            store_repo.clone(),
            audit_repo.clone(),
            subscription_service.clone(),
            db_pool.clone(),
        );

        Self {
            auth_service: AuthService::new(
                user_repo.clone(),
                store_repo.clone(),
                audit_repo.clone(),
                jwt_secret.to_string(),
                db_pool.clone(),
            ),
            store_service: StoreService::new(
                store_repo.clone(),
                audit_repo.clone(),
                db_pool.clone(),
            ),
            staff_service: StaffService::new(
                user_repo.clone(),
                store_repo.clone(),
                subscription_repo.clone(),
                audit_repo.clone(),
                db_pool.clone(),
            ),
            product_service: ProductService::new(
                product_repo.clone(),
                store_repo.clone(),
                subscription_repo,
                audit_repo.clone(),
                db_pool.clone(),
            ),
            customer_service: CustomerService::new(
                customer_repo.clone(),
                ledger_repo.clone(),
                audit_repo.clone(),
                db_pool.clone(),
            ),
            due_payment_service: DuePaymentService::new(
                ledger_repo.clone(),
                customer_repo.clone(),
                audit_repo.clone(),
                db_pool.clone(),
            ),
            purchase_service: PurchaseService::new(
                purchase_repo,
                product_repo.clone(),
                audit_repo.clone(),
                db_pool.clone(),
            ),
            portal_service: PortalService::new(
                customer_repo,
                product_repo,
                sale_repo,
                ledger_repo,
                store_repo.clone(),
                audit_repo.clone(),
                sale_service.clone(),
                jwt_secret.to_string(),
                db_pool.clone(),
            ),
            admin_service: AdminService::new(store_repo, user_repo, audit_repo, db_pool.clone()),
            sale_service,
            ledger_service,
            subscription_service,
            audit_service,
            i18n_store: I18nStore::load(),
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_env_selects_local_url() {
        let url = select_database_url(
            Some("local"),
            Some("postgres://remoto".into()),
            Some("postgres://local".into()),
        )
        .unwrap();
        assert_eq!(url, "postgres://local");
    }

    #[test]
    fn any_other_env_selects_remote_url() {
        for env in [None, Some("production"), Some("")] {
            let url = select_database_url(env, Some("postgres://remoto".into()), None).unwrap();
            assert_eq!(url, "postgres://remoto");
        }
    }

    #[test]
    fn missing_url_is_an_error() {
        let remote = Some("postgres://remoto".into());
        assert!(select_database_url(Some("LOCAL"), remote, None).is_err());
        assert!(select_database_url(None, None, Some("postgres://local".into())).is_err());
    }
}
