//! CopyGo
//!
//! Cart model for the CopyGo print-shop ordering app: line items, quantity management,
//! service and delivery fees, and the snapshot handed to checkout.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod fixtures;
pub mod items;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod summary;
