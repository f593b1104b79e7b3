pub mod admin;
pub mod audit;
pub mod auth;
pub mod balance_requests;
pub mod customers;
pub mod due_payments;
pub mod ipc;
pub mod portal;
pub mod products;
pub mod purchases;
pub mod sales;
pub mod staff;
pub mod stores;
pub mod subscriptions;
