//! Line Items
//!
//! A line item is one configured product in a cart, such as a photocopy job with its paper,
//! size and colour options. Items are created from a [`LineItemDraft`] by the cart, which
//! assigns the key and validates the draft at the boundary.

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use thiserror::Error;

use crate::pricing::{PricingError, line_total};

new_key_type! {
    /// Line Item Key
    pub struct LineItemKey;
}

/// Reasons a draft is rejected before it reaches the cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidLineItem {
    /// Unit price is below zero (in minor units).
    #[error("unit price must not be negative, got {0} minor units")]
    NegativeUnitPrice(i64),

    /// Quantity is below one.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// Quantity does not fit the supported range.
    #[error("quantity {0} exceeds the maximum of {max}", max = u32::MAX)]
    QuantityTooLarge(i64),

    /// The unit price currency differs from the cart currency (item currency, cart currency).
    #[error("item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),
}

/// A line item that has not been added to a cart yet.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemDraft<'a> {
    /// Display label
    pub name: String,

    /// Price per unit
    pub unit_price: Money<'a, Currency>,

    /// Number of units, defaults to 1
    pub quantity: i64,

    /// Free-form description of the chosen options
    pub config: String,

    /// Optional thumbnail reference
    pub thumbnail: Option<String>,
}

impl<'a> LineItemDraft<'a> {
    /// Create a draft for a single unit with no configuration.
    pub fn new(name: impl Into<String>, unit_price: Money<'a, Currency>) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity: 1,
            config: String::new(),
            thumbnail: None,
        }
    }

    /// Set the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the configuration description.
    #[must_use]
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = config.into();
        self
    }

    /// Set the thumbnail reference.
    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Validate the draft against the cart currency and build the line item.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidLineItem`] if the price is negative, the quantity is out of range,
    /// or the price currency differs from `currency`.
    pub(crate) fn validate(
        self,
        key: LineItemKey,
        currency: &'static Currency,
    ) -> Result<LineItem<'a>, InvalidLineItem> {
        let item_currency = self.unit_price.currency();

        if item_currency != currency {
            return Err(InvalidLineItem::CurrencyMismatch(
                item_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        let minor = self.unit_price.to_minor_units();

        if minor < 0 {
            return Err(InvalidLineItem::NegativeUnitPrice(minor));
        }

        if self.quantity < 1 {
            return Err(InvalidLineItem::InvalidQuantity(self.quantity));
        }

        let quantity = u32::try_from(self.quantity)
            .map_err(|_err| InvalidLineItem::QuantityTooLarge(self.quantity))?;

        Ok(LineItem {
            key,
            name: self.name,
            unit_price: self.unit_price,
            quantity,
            config: self.config,
            thumbnail: self.thumbnail,
        })
    }
}

/// A line item owned by a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    key: LineItemKey,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    config: String,
    thumbnail: Option<String>,
}

impl<'a> LineItem<'a> {
    /// Returns the key assigned by the cart
    pub fn key(&self) -> LineItemKey {
        self.key
    }

    /// Returns the display label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the price per unit
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the quantity, always at least 1
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the configuration description
    pub fn config(&self) -> &str {
        &self.config
    }

    /// Returns the thumbnail reference, if any
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    /// Calculates `unit_price × quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the product does not fit in minor units.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, PricingError> {
        line_total(&self.unit_price, self.quantity)
    }

    /// Set the quantity, clamping to the `1..=u32::MAX` range.
    pub(crate) fn set_quantity(&mut self, quantity: i64) {
        self.quantity = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);
    }
}
