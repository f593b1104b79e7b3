pub mod admin_service;
pub mod audit_service;
pub mod auth;
pub mod customer_service;
pub mod due_payment_service;
pub mod ledger_service;
pub mod portal_service;
pub mod product_service;
pub mod purchase_service;
pub mod sale_service;
pub mod staff_service;
pub mod store_service;
pub mod subscription_service;
