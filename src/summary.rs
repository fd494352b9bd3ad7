//! Summary
//!
//! Renders the cart summary panel for a terminal: the item table followed by the
//! subtotal, fees and total.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::Cart, cart::DeliveryOption, pricing::PricingError};

/// Errors that can occur when rendering a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The totals could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    Io(#[from] io::Error),
}

/// Write the summary panel for `cart` to `out`.
///
/// # Errors
///
/// Returns a [`SummaryError`] if the totals cannot be calculated or writing fails.
pub fn write_summary(mut out: impl io::Write, cart: &Cart<'_>) -> Result<(), SummaryError> {
    if cart.is_empty() {
        writeln!(out, "\nYour cart is empty. Add copies from a store.\n")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["", "Item", "Config", "Unit Price", "Qty", "Line Total"]);

    for (idx, item) in cart.iter().enumerate() {
        builder.push_record([
            format!("#{:<3}", idx + 1),
            item.name().to_string(),
            item.config().to_string(),
            format_money(item.unit_price()),
            item.quantity().to_string(),
            format_money(&item.line_total()?),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "\n{table}")?;

    let breakdown = cart.breakdown()?;

    let mut lines = vec![
        ("Subtotal:".to_string(), format_money(&breakdown.subtotal)),
        (
            format!("Service fee ({}%):", percent_points(cart.fees().service_fee)),
            format_money(&breakdown.service_fee),
        ),
    ];

    if cart.delivery_option() == DeliveryOption::Delivery {
        lines.push(("Delivery:".to_string(), format_money(&breakdown.delivery_fee)));
    }

    lines.push(("Total:".to_string(), format_money(&breakdown.total)));

    let label_width = lines.iter().map(|(label, _)| label.chars().count()).max();
    let value_width = lines.iter().map(|(_, value)| value.chars().count()).max();

    for (label, value) in &lines {
        writeln!(
            out,
            " {label:>label_width$}  {value:>value_width$}",
            label_width = label_width.unwrap_or_default(),
            value_width = value_width.unwrap_or_default(),
        )?;
    }

    writeln!(out, " {} item(s), {} unit(s)", cart.len(), cart.item_count())?;

    writeln!(out)?;

    Ok(())
}

/// Format an amount as `CODE 0.00`, with as many decimal places as the currency's minor unit.
fn format_money(money: &Money<'_, Currency>) -> String {
    let currency = money.currency();
    let amount = Decimal::new(money.to_minor_units(), currency.exponent);
    let places = usize::try_from(currency.exponent).unwrap_or_default();

    format!("{} {amount:.places$}", currency.iso_alpha_code)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.05), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .normalize()
}
