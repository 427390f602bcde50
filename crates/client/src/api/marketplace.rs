//! Marketplace endpoints: products and orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use agrilink_core::{CurrencyCode, OrderId, OrderStatus, ProductId, Unit};

use super::{ApiClient, Auth, CacheTag};
use crate::checkout::OrderRequest;
use crate::error::ApiError;

const PRODUCTS_PATH: &str = "/api/marketplace/products/";
const ORDERS_PATH: &str = "/api/marketplace/orders/";

/// A marketplace listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    /// Listing ID.
    pub id: ProductId,
    /// Listing title.
    pub title: String,
    /// Longer description, when provided.
    #[serde(default)]
    pub description: Option<String>,
    /// Price per unit.
    pub price_per_unit: Decimal,
    /// Listing currency.
    #[serde(default)]
    pub currency: CurrencyCode,
    /// Unit the product is sold in.
    pub unit: Unit,
    /// Seller display name.
    pub seller: String,
    /// Units available, when the seller tracks stock.
    #[serde(default)]
    pub available_quantity: Option<i64>,
}

/// Confirmation returned when an order is created.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfirmation {
    /// The new order's ID.
    pub id: OrderId,
    /// Initial order status.
    pub status: OrderStatus,
}

/// One of the user's past orders.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    /// Order ID.
    pub id: OrderId,
    /// Current status.
    pub status: OrderStatus,
    /// Order total.
    pub total_amount: Decimal,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

impl ApiClient {
    /// List marketplace products (cached).
    ///
    /// # Errors
    ///
    /// Surfaces the server's error payload verbatim on failure.
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_cached(PRODUCTS_PATH, &[CacheTag::Products], Auth::Required)
            .await
    }

    /// Fetch a single product (cached).
    ///
    /// # Errors
    ///
    /// A missing product surfaces as a 404 in the typed error body.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let path = format!("{PRODUCTS_PATH}{id}/");
        self.get_cached(&path, &[CacheTag::Products], Auth::Required)
            .await
    }

    /// Submit an order.
    ///
    /// Takes a finalized [`OrderRequest`]; for crypto payments that means
    /// the checkout flow has already supplied an escrow receipt - there is
    /// no way to construct the request otherwise. No retry on failure: the
    /// server's error payload is surfaced verbatim for the caller to act on.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` without a session, or the server's typed
    /// error body on rejection.
    pub async fn create_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, ApiError> {
        self.post(ORDERS_PATH, request, &[CacheTag::Orders], Auth::Required)
            .await
    }

    /// List the user's orders (cached).
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when no session is established.
    pub async fn my_orders(&self) -> Result<Vec<OrderSummary>, ApiError> {
        self.get_cached(ORDERS_PATH, &[CacheTag::Orders], Auth::Required)
            .await
    }
}
