pub mod user_repo;
pub use user_repo::UserRepository;
pub mod store_repo;
pub use store_repo::StoreRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod purchase_repo;
pub use purchase_repo::PurchaseRepository;
pub mod subscription_repo;
pub use subscription_repo::SubscriptionRepository;
pub mod audit_repo;

pub use audit_repo::AuditRepository;
