// storefront/src/lib.rs

//! Storefront order and inventory service.
//!
//! Catalog reads, per-user carts, order creation from the cart, the order
//! status lifecycle with deferred stock commit, and payment settlement. Write
//! workflows run as `storeflow` pipelines over a pluggable [`store::Store`].

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
pub mod web;
