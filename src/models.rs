pub mod audit;
pub mod auth;
pub mod customer;
pub mod due_payment;
pub mod ledger;
pub mod portal;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod staff;
pub mod store;
pub mod subscription;
