//! In-memory cart aggregation.
//!
//! The cart owns its items exclusively; totals are never stored - they are
//! recomputed as a fold over the items after every mutation, so they cannot
//! drift from the contents.
//!
//! The cart is memory-only by default and lost when the process exits. It
//! is `Serialize`/`Deserialize` so a caller that wants a persistent cart
//! can snapshot it explicitly; this crate takes no position on where.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agrilink_core::{CurrencyCode, Price, ProductId, Unit};

use crate::api::marketplace::Product;

/// One line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Listing title at the time it was added.
    pub title: String,
    /// Price per unit at the time it was added.
    pub price_per_unit: Price,
    /// Unit the product is sold in.
    pub unit: Unit,
    /// Quantity of units. At least 1 when created through `add_item`;
    /// `set_quantity` does not guard it (see module docs on totals).
    pub quantity: i64,
}

impl CartItem {
    /// Build a cart line for `quantity` units of a product.
    #[must_use]
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            price_per_unit: Price::new(product.price_per_unit, product.currency),
            unit: product.unit,
            quantity: quantity.max(1),
        }
    }

    /// Price of this line: per-unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price_per_unit.amount * Decimal::from(self.quantity)
    }
}

/// Derived totals over the current items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartTotals {
    /// Sum of line quantities.
    pub quantity: i64,
    /// Sum of line totals.
    pub amount: Decimal,
}

/// The cart aggregator.
///
/// Deserialization goes through [`CartSnapshot`]: only the items are read
/// back, and the totals are recomputed from them, so a stale or hand-edited
/// snapshot cannot restore totals that disagree with the contents.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(from = "CartSnapshot")]
pub struct Cart {
    items: Vec<CartItem>,
    totals: CartTotals,
}

/// Wire form of a persisted cart: items only.
#[derive(Deserialize)]
struct CartSnapshot {
    items: Vec<CartItem>,
}

impl From<CartSnapshot> for Cart {
    fn from(snapshot: CartSnapshot) -> Self {
        let mut cart = Self {
            items: snapshot.items,
            totals: CartTotals::default(),
        };
        cart.recompute();
        cart
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Current derived totals.
    #[must_use]
    pub const fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item. If a line with the same product ID exists, its quantity
    /// is incremented by the incoming quantity; otherwise the item is
    /// appended.
    pub fn add_item(&mut self, item: CartItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            Some(existing) => existing.quantity += item.quantity,
            None => self.items.push(item),
        }
        self.recompute();
    }

    /// Remove the line for a product, if present.
    pub fn remove_item(&mut self, id: ProductId) {
        self.items.retain(|item| item.product_id != id);
        self.recompute();
    }

    /// Set a line's quantity directly.
    ///
    /// No validation happens here - not against available stock, and not
    /// against zero or negative values. Guarding is the caller's
    /// responsibility.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) {
        if let Some(item) = self.items.iter_mut().find(|item| item.product_id == id) {
            item.quantity = quantity;
        }
        self.recompute();
    }

    /// Empty the cart and zero the totals.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    /// Currency of the cart's totals.
    ///
    /// Listings on this marketplace share one currency; the first line's
    /// currency stands for the cart.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.items
            .first()
            .map(|item| item.price_per_unit.currency_code)
            .unwrap_or_default()
    }

    fn recompute(&mut self) {
        self.totals = self.items.iter().fold(CartTotals::default(), |acc, item| {
            CartTotals {
                quantity: acc.quantity + item.quantity,
                amount: acc.amount + item.line_total(),
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64, price: i64, quantity: i64) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            title: format!("product-{id}"),
            price_per_unit: Price::new(Decimal::from(price), CurrencyCode::Inr),
            unit: Unit::Kilogram,
            quantity,
        }
    }

    #[test]
    fn test_totals_are_sums_over_distinct_items() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 10, 2));
        cart.add_item(item(2, 25, 1));
        cart.add_item(item(3, 7, 4));

        assert_eq!(cart.totals().quantity, 7);
        assert_eq!(cart.totals().amount, Decimal::from(10 * 2 + 25 + 7 * 4));
    }

    #[test]
    fn test_add_same_product_merges_quantity() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 10, 2));
        cart.add_item(item(1, 10, 3));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.totals().quantity, 5);
        assert_eq!(cart.totals().amount, Decimal::from(50));
    }

    #[test]
    fn test_remove_item_recomputes() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 10, 2));
        cart.add_item(item(2, 5, 1));
        cart.remove_item(ProductId::new(1));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.totals().quantity, 1);
        assert_eq!(cart.totals().amount, Decimal::from(5));
    }

    #[test]
    fn test_set_quantity_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 10, 2));
        cart.set_quantity(ProductId::new(99), 5);
        assert_eq!(cart.totals().quantity, 2);
    }

    #[test]
    fn test_set_quantity_is_unguarded() {
        // Pins the aggregator-level contract: zero and negative quantities
        // pass through and drive the totals negative.
        let mut cart = Cart::new();
        cart.add_item(item(1, 10, 2));

        cart.set_quantity(ProductId::new(1), 0);
        assert_eq!(cart.totals().quantity, 0);
        assert_eq!(cart.totals().amount, Decimal::ZERO);

        cart.set_quantity(ProductId::new(1), -3);
        assert_eq!(cart.totals().quantity, -3);
        assert_eq!(cart.totals().amount, Decimal::from(-30));
    }

    #[test]
    fn test_two_item_scenario_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 100, 2));
        cart.add_item(item(2, 50, 3));

        assert_eq!(cart.totals().quantity, 5);
        assert_eq!(cart.totals().amount, Decimal::from(350));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals().quantity, 0);
        assert_eq!(cart.totals().amount, Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 100, 2));

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.items(), cart.items());
        assert_eq!(restored.totals(), cart.totals());
    }

    #[test]
    fn test_snapshot_with_drifted_totals_is_recomputed() {
        // A snapshot whose stored totals disagree with its single 2-unit
        // line; the restored cart must derive its totals from the items.
        let json = r#"{
            "items": [{
                "product_id": 1,
                "title": "product-1",
                "price_per_unit": {"amount": "10", "currency_code": "INR"},
                "unit": "kilogram",
                "quantity": 2
            }],
            "totals": {"quantity": 99, "amount": "9999"}
        }"#;

        let restored: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(restored.totals().quantity, 2);
        assert_eq!(restored.totals().amount, Decimal::from(20));
    }
}
