//! Checkout
//!
//! Fulfilment preferences captured next to the cart, and the owned snapshot handed to the
//! payment step once the customer confirms the order.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use slotmap::Key;
use thiserror::Error;

use crate::{cart::Cart, cart::DeliveryOption, pricing::PricingError};

/// Errors that stop a cart from being checked out.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// Delivery was selected but no address was given.
    #[error("delivery selected without a delivery address")]
    MissingDeliveryAddress,

    /// The totals could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// When the order should be ready.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Eta {
    /// As soon as possible
    #[default]
    Asap,

    /// At a time arranged with the store
    Scheduled,
}

/// How and when the order reaches the customer.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfilment {
    /// Pickup or delivery
    pub delivery: DeliveryOption,

    /// Delivery address, only used for delivery
    pub address: Option<String>,

    /// Requested timing
    pub eta: Eta,

    /// Pay in cash on receipt
    pub pay_on_delivery: bool,
}

/// One line of an [`OrderSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotLine {
    /// Line item key, rendered as a string
    pub key: String,

    /// Display label
    pub name: String,

    /// Configuration description
    pub config: String,

    /// Thumbnail reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Unit price in minor units
    pub unit_price_minor: i64,

    /// Quantity
    pub quantity: u32,

    /// Line total in minor units
    pub line_total_minor: i64,
}

/// Read-only copy of a cart at the moment of checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSnapshot {
    /// ISO currency code for every amount
    pub currency: &'static str,

    /// Items in display order
    pub items: Vec<SnapshotLine>,

    /// Fulfilment details; pickup orders never carry an address
    pub fulfilment: Fulfilment,

    /// Sum of line totals
    pub subtotal_minor: i64,

    /// Service fee
    pub service_fee_minor: i64,

    /// Delivery fee
    pub delivery_fee_minor: i64,

    /// Amount due
    pub total_minor: i64,
}

impl OrderSnapshot {
    /// Snapshot a cart.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: there is nothing to order.
    /// - [`CheckoutError::MissingDeliveryAddress`]: delivery is selected without an address.
    /// - [`CheckoutError::Pricing`]: the totals could not be calculated.
    pub fn from_cart(cart: &Cart<'_>) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut fulfilment = cart.fulfilment().clone();

        match fulfilment.delivery {
            DeliveryOption::Pickup => fulfilment.address = None,
            DeliveryOption::Delivery => {
                let address = fulfilment
                    .address
                    .as_deref()
                    .map(str::trim)
                    .filter(|address| !address.is_empty())
                    .ok_or(CheckoutError::MissingDeliveryAddress)?;

                fulfilment.address = Some(address.to_string());
            }
        }

        let items = cart
            .iter()
            .map(|item| -> Result<SnapshotLine, PricingError> {
                Ok(SnapshotLine {
                    key: format!("{:?}", item.key().data()),
                    name: item.name().to_string(),
                    config: item.config().to_string(),
                    thumbnail: item.thumbnail().map(str::to_string),
                    unit_price_minor: item.unit_price().to_minor_units(),
                    quantity: item.quantity(),
                    line_total_minor: item.line_total()?.to_minor_units(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let breakdown = cart.breakdown()?;

        Ok(Self {
            currency: cart.currency().iso_alpha_code,
            items,
            fulfilment,
            subtotal_minor: breakdown.subtotal.to_minor_units(),
            service_fee_minor: breakdown.service_fee.to_minor_units(),
            delivery_fee_minor: breakdown.delivery_fee.to_minor_units(),
            total_minor: breakdown.total.to_minor_units(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::BOB};
    use testresult::TestResult;

    use crate::items::LineItemDraft;

    use super::*;

    fn demo_cart<'a>() -> Result<Cart<'a>, crate::items::InvalidLineItem> {
        let mut cart = Cart::new(BOB);

        cart.add_item(
            LineItemDraft::new("Fotocopias", Money::from_minor(50, BOB))
                .with_quantity(10)
                .with_config("50 pág · B/N · Carta · Anillado")
                .with_thumbnail("thumbnail1.png"),
        )?;

        cart.add_item(
            LineItemDraft::new("Impresión Color", Money::from_minor(100, BOB))
                .with_quantity(5)
                .with_config("20 pág · Color · A4"),
        )?;

        Ok(cart)
    }

    #[test]
    fn empty_cart_cannot_check_out() {
        let cart = Cart::new(BOB);

        assert_eq!(
            OrderSnapshot::from_cart(&cart),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn pickup_snapshot_has_totals_and_no_address() -> TestResult {
        let mut cart = demo_cart()?;
        cart.set_delivery_address("Calle 21 de Calacoto");

        let snapshot = cart.checkout()?;

        assert_eq!(snapshot.currency, "BOB");
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.fulfilment.delivery, DeliveryOption::Pickup);
        assert!(snapshot.fulfilment.address.is_none());
        assert_eq!(snapshot.subtotal_minor, 10_00);
        assert_eq!(snapshot.service_fee_minor, 50);
        assert_eq!(snapshot.delivery_fee_minor, 0);
        assert_eq!(snapshot.total_minor, 10_50);

        Ok(())
    }

    #[test]
    fn snapshot_lines_follow_cart_order() -> TestResult {
        let cart = demo_cart()?;
        let snapshot = cart.checkout()?;

        let names: Vec<_> = snapshot.items.iter().map(|line| line.name.as_str()).collect();

        assert_eq!(names, ["Fotocopias", "Impresión Color"]);

        let first = snapshot.items.first().ok_or("missing first line")?;

        assert_eq!(first.unit_price_minor, 50);
        assert_eq!(first.quantity, 10);
        assert_eq!(first.line_total_minor, 5_00);
        assert_eq!(first.thumbnail.as_deref(), Some("thumbnail1.png"));

        Ok(())
    }

    #[test]
    fn delivery_requires_address() -> TestResult {
        let mut cart = demo_cart()?;
        cart.set_delivery_option(DeliveryOption::Delivery);

        assert_eq!(cart.checkout(), Err(CheckoutError::MissingDeliveryAddress));

        cart.set_delivery_address("   ");

        assert_eq!(cart.checkout(), Err(CheckoutError::MissingDeliveryAddress));

        Ok(())
    }

    #[test]
    fn delivery_snapshot_includes_fee_and_trimmed_address() -> TestResult {
        let mut cart = demo_cart()?;
        cart.set_delivery_option(DeliveryOption::Delivery);
        cart.set_delivery_address("  Av. 6 de Agosto 2170 ");
        cart.set_eta(Eta::Scheduled);
        cart.set_pay_on_delivery(true);

        let snapshot = cart.checkout()?;

        assert_eq!(
            snapshot.fulfilment.address.as_deref(),
            Some("Av. 6 de Agosto 2170")
        );
        assert_eq!(snapshot.fulfilment.eta, Eta::Scheduled);
        assert!(snapshot.fulfilment.pay_on_delivery);
        assert_eq!(snapshot.delivery_fee_minor, 2_50);
        assert_eq!(snapshot.total_minor, 13_00);

        Ok(())
    }

    #[test]
    fn snapshot_does_not_track_later_changes() -> TestResult {
        let mut cart = demo_cart()?;
        let snapshot = cart.checkout()?;

        let key = cart.iter().next().map(crate::items::LineItem::key).ok_or("empty cart")?;
        cart.remove_item(key);

        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.total_minor, 10_50);

        Ok(())
    }

    #[test]
    fn snapshot_serializes_to_yaml() -> TestResult {
        let snapshot = demo_cart()?.checkout()?;
        let yaml = serde_norway::to_string(&snapshot)?;

        assert!(yaml.contains("currency: BOB"));
        assert!(yaml.contains("delivery: pickup"));
        assert!(yaml.contains("total_minor: 1050"));

        Ok(())
    }
}
