//! Cart Fixtures

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{BOB, Currency, EUR, GBP, JPY, USD},
};
use serde::Deserialize;

use crate::{
    cart::{Cart, DeliveryOption},
    fixtures::FixtureError,
    items::LineItemDraft,
};

/// Cart fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// ISO currency code of the cart
    pub currency: String,

    /// Delivery option, pickup when omitted
    #[serde(default)]
    pub delivery: DeliveryOption,

    /// Items in display order
    #[serde(default)]
    pub items: Vec<LineItemFixture>,
}

/// Line item fixture
#[derive(Debug, Deserialize)]
pub struct LineItemFixture {
    /// Item name
    pub name: String,

    /// Unit price (e.g., "0.50 BOB")
    pub price: String,

    /// Quantity, 1 when omitted
    #[serde(default = "default_quantity")]
    pub quantity: i64,

    /// Configuration description
    #[serde(default)]
    pub config: String,

    /// Thumbnail reference
    #[serde(default)]
    pub thumbnail: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

impl<'a> TryFrom<CartFixture> for Cart<'a> {
    type Error = FixtureError;

    fn try_from(fixture: CartFixture) -> Result<Self, Self::Error> {
        let currency = parse_currency(&fixture.currency)?;
        let mut cart = Cart::new(currency);

        cart.set_delivery_option(fixture.delivery);

        for item in fixture.items {
            let (minor_units, item_currency) = parse_price(&item.price)?;

            let mut draft =
                LineItemDraft::new(item.name.clone(), Money::from_minor(minor_units, item_currency))
                    .with_quantity(item.quantity)
                    .with_config(item.config);

            if let Some(thumbnail) = item.thumbnail {
                draft = draft.with_thumbnail(thumbnail);
            }

            cart.add_item(draft)
                .map_err(|err| FixtureError::InvalidItem(item.name, err))?;
        }

        Ok(cart)
    }
}

/// Parse price string (e.g., "0.50 BOB") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(currency_code)?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| amount.checked_mul(Decimal::from(scale)))
        .and_then(|value| {
            value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a supported ISO currency code
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for codes other than BOB, USD, EUR, GBP and JPY.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "BOB" => Ok(BOB),
        "JPY" => Ok(JPY),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        "GBP" => Ok(GBP),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
