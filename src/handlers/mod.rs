//! HTTP handlers, one module per route group.

pub mod auth;
pub mod categories;
pub mod health;
pub mod products;
pub mod suppliers;
