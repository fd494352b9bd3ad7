//! Cart
//!
//! The cart owns its line items and derives every amount shown to the customer from them.
//! Amounts are recomputed on each call, so there is no cached total to go stale.

use clap::ValueEnum;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, info};

use crate::{
    checkout::{CheckoutError, Eta, Fulfilment, OrderSnapshot},
    items::{InvalidLineItem, LineItem, LineItemDraft, LineItemKey},
    pricing::{FeeSchedule, PriceBreakdown, PricingError},
};

/// How the order reaches the customer.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOption {
    /// Collected in store, no delivery fee
    #[default]
    Pickup,

    /// Delivered to an address, flat delivery fee applies
    Delivery,
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<LineItem<'a>>,
    /// Every key this cart has issued. Slots are never freed, so no key is issued twice.
    keys: SlotMap<LineItemKey, ()>,
    fees: FeeSchedule<'a>,
    fulfilment: Fulfilment,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart with the standard fees.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            keys: SlotMap::with_key(),
            fees: FeeSchedule::standard(currency),
            fulfilment: Fulfilment::default(),
            currency,
        }
    }

    /// Create an empty cart with a custom fee schedule.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the fees are negative or in another currency.
    pub fn with_fees(
        currency: &'static Currency,
        fees: FeeSchedule<'a>,
    ) -> Result<Self, PricingError> {
        fees.validate(currency)?;

        Ok(Cart {
            fees,
            ..Cart::new(currency)
        })
    }

    /// Validate a draft and append it to the end of the cart.
    ///
    /// The returned item carries a key that is never handed out again by this cart, even
    /// after the item is removed.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidLineItem`] if the draft fails validation; the cart is unchanged.
    pub fn add_item(&mut self, draft: LineItemDraft<'a>) -> Result<LineItem<'a>, InvalidLineItem> {
        let key = self.keys.insert(());

        let item = match draft.validate(key, self.currency) {
            Ok(item) => item,
            Err(err) => {
                debug!(%err, "rejected line item");

                return Err(err);
            }
        };

        self.items.push(item.clone());

        debug!(?key, items = self.items.len(), "added line item");

        Ok(item)
    }

    /// Set the quantity of an item, clamping anything below 1 to 1.
    ///
    /// Unknown keys are ignored.
    pub fn update_quantity(&mut self, key: LineItemKey, quantity: i64) {
        let Some(item) = self.items.iter_mut().find(|item| item.key() == key) else {
            debug!(?key, "ignoring quantity update for unknown line item");
            return;
        };

        item.set_quantity(quantity);

        debug!(?key, requested = quantity, quantity = item.quantity(), "updated quantity");
    }

    /// Remove an item. Unknown keys are ignored.
    pub fn remove_item(&mut self, key: LineItemKey) {
        let Some(position) = self.items.iter().position(|item| item.key() == key) else {
            debug!(?key, "ignoring removal of unknown line item");
            return;
        };

        self.items.remove(position);

        debug!(?key, items = self.items.len(), "removed line item");
    }

    /// Choose between pickup and delivery.
    pub fn set_delivery_option(&mut self, option: DeliveryOption) {
        self.fulfilment.delivery = option;

        debug!(?option, "set delivery option");
    }

    /// Set the address used when the order is delivered.
    pub fn set_delivery_address(&mut self, address: impl Into<String>) {
        self.fulfilment.address = Some(address.into());
    }

    /// Forget the delivery address.
    pub fn clear_delivery_address(&mut self) {
        self.fulfilment.address = None;
    }

    /// Choose when the order should be ready.
    pub fn set_eta(&mut self, eta: Eta) {
        self.fulfilment.eta = eta;

        debug!(?eta, "set delivery time");
    }

    /// Pay in cash when the order is received.
    pub fn set_pay_on_delivery(&mut self, pay_on_delivery: bool) {
        self.fulfilment.pay_on_delivery = pay_on_delivery;
    }

    /// Calculate the sum of `unit_price × quantity` over all items.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the sum does not fit in minor units.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        crate::pricing::subtotal(self.iter(), self.currency)
    }

    /// Calculate the service fee on the current subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the subtotal or fee cannot be represented.
    pub fn service_fee(&self) -> Result<Money<'a, Currency>, PricingError> {
        self.fees.service_fee_on(&self.subtotal()?)
    }

    /// The delivery fee for the selected option, zero for pickup.
    pub fn delivery_fee(&self) -> Money<'a, Currency> {
        self.fees.delivery_fee_for(self.fulfilment.delivery)
    }

    /// Calculate `subtotal + service_fee + delivery_fee`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any amount cannot be represented.
    pub fn total(&self) -> Result<Money<'a, Currency>, PricingError> {
        Ok(self.breakdown()?.total)
    }

    /// Calculate every derived amount in one pass.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any amount cannot be represented.
    pub fn breakdown(&self) -> Result<PriceBreakdown<'a>, PricingError> {
        PriceBreakdown::calculate(
            self.iter(),
            self.currency,
            &self.fees,
            self.fulfilment.delivery,
        )
    }

    /// Build the read-only snapshot handed to checkout.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: there is nothing to order.
    /// - [`CheckoutError::MissingDeliveryAddress`]: delivery is selected without an address.
    /// - [`CheckoutError::Pricing`]: the totals could not be calculated.
    pub fn checkout(&self) -> Result<OrderSnapshot, CheckoutError> {
        let snapshot = OrderSnapshot::from_cart(self)?;

        info!(
            items = snapshot.items.len(),
            total_minor = snapshot.total_minor,
            delivery = ?snapshot.fulfilment.delivery,
            "checked out cart"
        );

        Ok(snapshot)
    }

    /// Get an item by key.
    pub fn get(&self, key: LineItemKey) -> Option<&LineItem<'a>> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Iterate over items in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.items.iter()
    }

    /// Get the number of line items in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the total number of units across all items.
    pub fn item_count(&self) -> u64 {
        self.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Get the selected delivery option.
    pub fn delivery_option(&self) -> DeliveryOption {
        self.fulfilment.delivery
    }

    /// Get the fulfilment details.
    pub fn fulfilment(&self) -> &Fulfilment {
        &self.fulfilment
    }

    /// Get the fee schedule.
    pub fn fees(&self) -> &FeeSchedule<'a> {
        &self.fees
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rusty_money::iso::{BOB, GBP};
    use slotmap::Key;
    use testresult::TestResult;

    use super::*;

    fn fotocopias<'a>() -> LineItemDraft<'a> {
        LineItemDraft::new("Fotocopias", Money::from_minor(50, BOB))
            .with_quantity(10)
            .with_config("50 pág · B/N · Carta · Anillado")
    }

    fn color<'a>() -> LineItemDraft<'a> {
        LineItemDraft::new("Impresión Color", Money::from_minor(100, BOB))
            .with_quantity(5)
            .with_config("20 pág · Color · A4")
    }

    #[test]
    fn new_cart_is_empty_pickup() {
        let cart = Cart::new(BOB);

        assert!(cart.is_empty());
        assert_eq!(cart.len(), 0);
        assert_eq!(cart.currency(), BOB);
        assert_eq!(cart.delivery_option(), DeliveryOption::Pickup);
    }

    #[test]
    fn add_item_appends_in_order() -> TestResult {
        let mut cart = Cart::new(BOB);

        let a = cart.add_item(fotocopias())?.key();
        let b = cart.add_item(color())?.key();

        let keys: Vec<_> = cart.iter().map(LineItem::key).collect();

        assert_eq!(keys, vec![a, b]);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 15);

        Ok(())
    }

    #[test]
    fn add_item_rejects_invalid_draft_without_inserting() {
        let mut cart = Cart::new(BOB);

        let result = cart
            .add_item(fotocopias().with_quantity(0))
            .map(|item| item.key());

        assert_eq!(result, Err(InvalidLineItem::InvalidQuantity(0)));
        assert!(cart.is_empty());
    }

    #[test]
    fn add_item_rejects_other_currency() {
        let mut cart = Cart::new(BOB);

        let result = cart
            .add_item(LineItemDraft::new("Copy", Money::from_minor(10, GBP)))
            .map(|item| item.key());

        assert_eq!(
            result,
            Err(InvalidLineItem::CurrencyMismatch(
                GBP.iso_alpha_code,
                BOB.iso_alpha_code
            ))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn keys_are_not_reused_after_removal() -> TestResult {
        let mut cart = Cart::new(BOB);

        let a = cart.add_item(fotocopias())?.key();
        cart.remove_item(a);
        let b = cart.add_item(fotocopias())?.key();

        assert_ne!(a, b);
        assert!(cart.get(a).is_none());
        assert!(cart.get(b).is_some());

        Ok(())
    }

    #[test]
    fn removed_and_rejected_keys_never_free_their_slot() -> TestResult {
        let mut cart = Cart::new(BOB);
        let mut slots = HashSet::new();

        for _ in 0..1_000 {
            let key = cart.add_item(fotocopias())?.key();
            cart.remove_item(key);

            // The low half of the FFI form is the slot index.
            assert!(slots.insert(key.data().as_ffi() & u64::from(u32::MAX)));
        }

        cart.add_item(fotocopias().with_quantity(0)).err().ok_or("draft was accepted")?;

        let key = cart.add_item(fotocopias())?.key();

        assert!(slots.insert(key.data().as_ffi() & u64::from(u32::MAX)));
        assert_eq!(slots.len(), 1_001);

        Ok(())
    }

    #[test]
    fn update_quantity_clamps_below_one() -> TestResult {
        let mut cart = Cart::new(BOB);
        let a = cart.add_item(fotocopias())?.key();

        cart.update_quantity(a, -3);

        assert_eq!(cart.get(a).map(LineItem::quantity), Some(1));

        cart.update_quantity(a, 0);

        assert_eq!(cart.get(a).map(LineItem::quantity), Some(1));

        Ok(())
    }

    #[test]
    fn update_quantity_unknown_key_is_noop() -> TestResult {
        let mut cart = Cart::new(BOB);
        let a = cart.add_item(fotocopias())?.key();
        cart.remove_item(a);

        let b = cart.add_item(color())?.key();
        let before: Vec<_> = cart.iter().cloned().collect();

        cart.update_quantity(a, 42);

        let after: Vec<_> = cart.iter().cloned().collect();

        assert_eq!(before, after);
        assert_eq!(cart.get(b).map(LineItem::quantity), Some(5));

        Ok(())
    }

    #[test]
    fn remove_item_is_idempotent() -> TestResult {
        let mut cart = Cart::new(BOB);
        let a = cart.add_item(fotocopias())?.key();
        let b = cart.add_item(color())?.key();

        cart.remove_item(b);
        let once: Vec<_> = cart.iter().cloned().collect();

        cart.remove_item(b);
        let twice: Vec<_> = cart.iter().cloned().collect();

        assert_eq!(once, twice);
        assert_eq!(cart.len(), 1);
        assert!(cart.get(a).is_some());

        Ok(())
    }

    #[test]
    fn totals_for_both_delivery_options() -> TestResult {
        let mut cart = Cart::new(BOB);
        cart.add_item(fotocopias())?;
        cart.add_item(color())?;

        assert_eq!(cart.subtotal()?, Money::from_minor(10_00, BOB));
        assert_eq!(cart.service_fee()?, Money::from_minor(50, BOB));
        assert_eq!(cart.delivery_fee(), Money::from_minor(0, BOB));
        assert_eq!(cart.total()?, Money::from_minor(10_50, BOB));

        cart.set_delivery_option(DeliveryOption::Delivery);

        assert_eq!(cart.delivery_fee(), Money::from_minor(2_50, BOB));
        assert_eq!(cart.total()?, Money::from_minor(13_00, BOB));

        Ok(())
    }

    #[test]
    fn subtotal_recomputes_after_each_mutation() -> TestResult {
        let mut cart = Cart::new(BOB);
        let a = cart.add_item(fotocopias())?.key();
        let b = cart.add_item(color())?.key();

        cart.update_quantity(a, -3);
        assert_eq!(cart.subtotal()?, Money::from_minor(5_50, BOB));

        cart.remove_item(b);
        assert_eq!(cart.subtotal()?, Money::from_minor(50, BOB));

        cart.remove_item(a);
        assert_eq!(cart.subtotal()?, Money::from_minor(0, BOB));

        Ok(())
    }

    #[test]
    fn empty_cart_totals() -> TestResult {
        let mut cart = Cart::new(BOB);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, BOB));
        assert_eq!(cart.service_fee()?, Money::from_minor(0, BOB));
        assert_eq!(cart.total()?, Money::from_minor(0, BOB));

        cart.set_delivery_option(DeliveryOption::Delivery);

        assert_eq!(cart.delivery_fee(), Money::from_minor(2_50, BOB));
        assert_eq!(cart.total()?, Money::from_minor(2_50, BOB));

        Ok(())
    }

    #[test]
    fn custom_fee_schedule() -> TestResult {
        let fees = FeeSchedule {
            service_fee: decimal_percentage::Percentage::from(0.1),
            delivery_fee: Money::from_minor(5_00, BOB),
        };

        let mut cart = Cart::with_fees(BOB, fees)?;
        cart.add_item(fotocopias())?;
        cart.set_delivery_option(DeliveryOption::Delivery);

        let breakdown = cart.breakdown()?;

        assert_eq!(breakdown.subtotal, Money::from_minor(5_00, BOB));
        assert_eq!(breakdown.service_fee, Money::from_minor(50, BOB));
        assert_eq!(breakdown.delivery_fee, Money::from_minor(5_00, BOB));
        assert_eq!(breakdown.total, Money::from_minor(10_50, BOB));

        Ok(())
    }

    #[test]
    fn custom_fee_schedule_must_match_cart_currency() {
        let result = Cart::with_fees(BOB, FeeSchedule::standard(rusty_money::iso::USD));

        assert!(matches!(
            result,
            Err(PricingError::FeeCurrencyMismatch("USD", "BOB"))
        ));
    }

    #[test]
    fn fulfilment_setters() {
        let mut cart = Cart::new(BOB);

        cart.set_delivery_address("Av. Arce 2519");
        cart.set_eta(Eta::Scheduled);
        cart.set_pay_on_delivery(true);

        assert_eq!(cart.fulfilment().address.as_deref(), Some("Av. Arce 2519"));
        assert_eq!(cart.fulfilment().eta, Eta::Scheduled);
        assert!(cart.fulfilment().pay_on_delivery);

        cart.clear_delivery_address();

        assert!(cart.fulfilment().address.is_none());
    }
}
