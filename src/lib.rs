pub mod audit;
pub mod cache;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod pdf;
pub mod pricing;
pub mod response;
pub mod routes;
pub mod sequence;
pub mod services;
pub mod state;
