//! Pricing
//!
//! All arithmetic is done in minor units so fractional cents never accumulate. The service
//! fee is the only step that produces fractions and it is rounded once, half away from zero.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{cart::DeliveryOption, items::LineItem};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// An amount did not fit in minor units.
    #[error("amount overflowed the supported range")]
    Overflow,

    /// A fee schedule charged a negative amount.
    #[error("fees must not be negative")]
    NegativeFee,

    /// A fee schedule was priced in a different currency from the cart (fee, cart).
    #[error("fee currency {0} does not match cart currency {1}")]
    FeeCurrencyMismatch(&'static str, &'static str),

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates `unit_price × quantity`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product does not fit in minor units.
pub fn line_total<'a>(
    unit_price: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Calculates the sum of all line totals, or zero in `currency` when there are no items.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: a line total or the running sum did not fit in minor units.
/// - [`PricingError::Money`]: an item was priced in a different currency.
pub fn subtotal<'a, 'i>(
    items: impl IntoIterator<Item = &'i LineItem<'a>>,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError>
where
    'a: 'i,
{
    items
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, item| -> Result<_, PricingError> {
            let line = item.line_total()?;

            acc.to_minor_units()
                .checked_add(line.to_minor_units())
                .ok_or(PricingError::Overflow)?;

            Ok(acc.add(line)?)
        })
}

/// Calculate a percentage of a minor unit amount, rounded to whole minor units.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the result cannot be represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // the percentage type has no accessor for its inner Decimal
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Service and delivery fees applied on top of the subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule<'a> {
    /// Percentage of the subtotal charged as a service fee
    pub service_fee: Percentage,

    /// Flat surcharge when the order is delivered
    pub delivery_fee: Money<'a, Currency>,
}

impl<'a> FeeSchedule<'a> {
    /// Service fee rate, 5%
    pub const SERVICE_FEE_RATE: f64 = 0.05;

    /// Delivery fee in major units, 2.50
    pub const DELIVERY_FEE: Decimal = Decimal::from_parts(250, 0, 0, false, 2);

    /// The standard CopyGo fees: 5% service fee and a 2.50 delivery fee.
    ///
    /// The delivery fee is rounded half away from zero to the currency's minor unit, so it is
    /// 3 in a currency without decimals.
    pub fn standard(currency: &'a Currency) -> Self {
        let delivery_fee = Self::DELIVERY_FEE
            .round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);

        Self {
            service_fee: Percentage::from(Self::SERVICE_FEE_RATE),
            delivery_fee: Money::from_decimal(delivery_fee, currency),
        }
    }

    /// Check the schedule can be applied to a cart priced in `currency`.
    ///
    /// # Errors
    ///
    /// - [`PricingError::FeeCurrencyMismatch`]: the delivery fee is in another currency.
    /// - [`PricingError::NegativeFee`]: either fee is below zero.
    pub fn validate(&self, currency: &Currency) -> Result<(), PricingError> {
        let fee_currency = self.delivery_fee.currency();

        if fee_currency != currency {
            return Err(PricingError::FeeCurrencyMismatch(
                fee_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        if self.delivery_fee.to_minor_units() < 0
            || (self.service_fee * Decimal::ONE).is_sign_negative()
        {
            return Err(PricingError::NegativeFee);
        }

        Ok(())
    }

    /// Service fee on the given subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::PercentConversion`] if the fee cannot be represented.
    pub fn service_fee_on(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        let fee = percent_of_minor(&self.service_fee, subtotal.to_minor_units())?;

        Ok(Money::from_minor(fee, subtotal.currency()))
    }

    /// Delivery fee for the given option, zero for pickup.
    pub fn delivery_fee_for(&self, option: DeliveryOption) -> Money<'a, Currency> {
        match option {
            DeliveryOption::Pickup => Money::from_minor(0, self.delivery_fee.currency()),
            DeliveryOption::Delivery => self.delivery_fee,
        }
    }
}

/// Every derived amount of a cart, computed together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown<'a> {
    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Service fee on the subtotal
    pub service_fee: Money<'a, Currency>,

    /// Delivery surcharge, zero for pickup
    pub delivery_fee: Money<'a, Currency>,

    /// `subtotal + service_fee + delivery_fee`
    pub total: Money<'a, Currency>,
}

impl<'a> PriceBreakdown<'a> {
    /// Price a list of items under a fee schedule and delivery option.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any amount overflows or currencies are mixed.
    pub fn calculate<'i>(
        items: impl IntoIterator<Item = &'i LineItem<'a>>,
        currency: &'a Currency,
        fees: &FeeSchedule<'a>,
        delivery: DeliveryOption,
    ) -> Result<Self, PricingError>
    where
        'a: 'i,
    {
        let subtotal = subtotal(items, currency)?;
        let service_fee = fees.service_fee_on(&subtotal)?;
        let delivery_fee = fees.delivery_fee_for(delivery);

        let total = [service_fee, delivery_fee]
            .iter()
            .try_fold(subtotal.to_minor_units(), |acc, fee| {
                acc.checked_add(fee.to_minor_units())
            })
            .ok_or(PricingError::Overflow)?;

        Ok(Self {
            subtotal,
            service_fee,
            delivery_fee,
            total: Money::from_minor(total, currency),
        })
    }
}
