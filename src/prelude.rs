//! CopyGo prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, DeliveryOption},
    checkout::{CheckoutError, Eta, Fulfilment, OrderSnapshot, SnapshotLine},
    fixtures::{Fixture, FixtureError},
    items::{InvalidLineItem, LineItem, LineItemDraft, LineItemKey},
    pricing::{FeeSchedule, PriceBreakdown, PricingError},
    summary::{SummaryError, write_summary},
};
