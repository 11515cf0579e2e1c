// storefront/src/services/mod.rs

//! Read-side operations and external collaborators. Multi-step writes live in
//! `crate::pipelines`.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod payment_gateway;
