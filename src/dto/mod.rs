pub mod auth;
pub mod bills;
pub mod catalogue;
pub mod clients;
pub mod orders;
pub mod pending_orders;
