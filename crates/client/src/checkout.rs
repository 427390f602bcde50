//! Order submission orchestration.
//!
//! [`Checkout::begin`] turns the cart plus a shipping/payment draft into
//! either a ready-to-submit [`OrderRequest`] or, for crypto payments, a
//! [`PendingPayment`] that withholds the request until an escrow receipt
//! arrives. The rule is structural: there is no way to hand
//! [`crate::api::ApiClient::create_order`] a crypto order that has not
//! paid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use agrilink_core::{Email, PaymentMethod, PaymentStatus, ProductId};

use crate::cart::Cart;
use crate::escrow::{self, EscrowError, EscrowReceipt, WalletProvider};

/// Shipping and payment details collected from the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Street address to ship to.
    pub shipping_address: String,
    /// City to ship to.
    pub shipping_city: String,
    /// Contact phone number.
    pub contact_phone: String,
    /// Contact email, optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<Email>,
    /// Free-form delivery notes, optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// How the order is paid.
    pub payment_method: PaymentMethod,
}

/// One order line on the wire: product and quantity only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    /// Product being ordered.
    pub product: ProductId,
    /// Units ordered.
    pub quantity: i64,
}

/// A finalized order submission.
///
/// Only constructible through [`Checkout::begin`] (direct payment) or
/// [`PendingPayment::complete`] (crypto payment with a receipt).
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    items: Vec<OrderLine>,
    shipping_address: String,
    shipping_city: String,
    contact_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_transaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_contract: Option<String>,
    /// Client-generated idempotency reference.
    client_reference: Uuid,
}

impl OrderRequest {
    /// The order lines.
    #[must_use]
    pub fn items(&self) -> &[OrderLine] {
        &self.items
    }

    /// Settlement state this request reports.
    #[must_use]
    pub const fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// On-chain transaction hash, present only for completed crypto orders.
    #[must_use]
    pub fn payment_transaction(&self) -> Option<&str> {
        self.payment_transaction.as_deref()
    }

    /// Client-generated idempotency reference.
    #[must_use]
    pub const fn client_reference(&self) -> Uuid {
        self.client_reference
    }
}

/// Errors from assembling an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no items to order.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// A required draft field is blank.
    #[error("order draft is incomplete: {0} must not be empty")]
    MissingField(&'static str),

    /// The escrow deposit failed; the classified error is preserved.
    #[error(transparent)]
    Escrow(#[from] EscrowError),
}

/// What [`Checkout::begin`] produced.
#[derive(Debug)]
pub enum CheckoutStart {
    /// Non-crypto payment: the request is ready to submit.
    Ready(OrderRequest),
    /// Crypto payment: the escrow deposit must settle first.
    AwaitingPayment(PendingPayment),
}

/// Entry point for order submission.
#[derive(Debug)]
pub struct Checkout;

impl Checkout {
    /// Build a submission from the cart and draft.
    ///
    /// For `PaymentMethod::Crypto` this defers: the returned
    /// [`PendingPayment`] holds everything except the receipt.
    ///
    /// # Errors
    ///
    /// Fails on an empty cart or a draft with blank required fields.
    pub fn begin(cart: &Cart, draft: OrderDraft) -> Result<CheckoutStart, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        validate_draft(&draft)?;

        let items: Vec<OrderLine> = cart
            .items()
            .iter()
            .map(|item| OrderLine {
                product: item.product_id,
                quantity: item.quantity,
            })
            .collect();
        let amount = cart.totals().amount;

        if draft.payment_method.requires_escrow() {
            tracing::debug!(%amount, "checkout deferred until escrow deposit settles");
            return Ok(CheckoutStart::AwaitingPayment(PendingPayment {
                items,
                draft,
                amount,
                client_reference: Uuid::new_v4(),
            }));
        }

        Ok(CheckoutStart::Ready(OrderRequest {
            items,
            shipping_address: draft.shipping_address,
            shipping_city: draft.shipping_city,
            contact_phone: draft.contact_phone,
            contact_email: draft.contact_email,
            notes: draft.notes,
            payment_method: draft.payment_method,
            payment_status: PaymentStatus::Pending,
            payment_transaction: None,
            payment_contract: None,
            client_reference: Uuid::new_v4(),
        }))
    }
}

/// A crypto checkout waiting on its escrow deposit.
///
/// Holds the assembled order and the amount due; turns into an
/// [`OrderRequest`] only when a receipt is supplied.
#[derive(Debug)]
pub struct PendingPayment {
    items: Vec<OrderLine>,
    draft: OrderDraft,
    amount: Decimal,
    client_reference: Uuid,
}

impl PendingPayment {
    /// The amount the escrow deposit must carry.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Finalize with an externally produced receipt.
    ///
    /// This is the completion callback: whoever ran the wallet flow hands
    /// over the transaction hash and contract address, and the request
    /// gains its payment fields with status `completed`.
    #[must_use]
    pub fn complete(self, receipt: EscrowReceipt) -> OrderRequest {
        OrderRequest {
            items: self.items,
            shipping_address: self.draft.shipping_address,
            shipping_city: self.draft.shipping_city,
            contact_phone: self.draft.contact_phone,
            contact_email: self.draft.contact_email,
            notes: self.draft.notes,
            payment_method: self.draft.payment_method,
            payment_status: PaymentStatus::Completed,
            payment_transaction: Some(receipt.transaction_hash),
            payment_contract: Some(receipt.contract_address),
            client_reference: self.client_reference,
        }
    }

    /// Convenience: run the deposit through a wallet provider and finalize.
    ///
    /// Blocks (asynchronously) for as long as the user takes to confirm in
    /// their wallet.
    ///
    /// # Errors
    ///
    /// Returns the classified escrow error. The pending payment is consumed
    /// either way; a failed payment restarts checkout from the cart.
    pub async fn pay_with<P: WalletProvider>(
        self,
        provider: &P,
        seller_address: &str,
    ) -> Result<OrderRequest, CheckoutError> {
        let receipt = escrow::deposit(provider, seller_address, self.amount).await?;
        Ok(self.complete(receipt))
    }
}

fn validate_draft(draft: &OrderDraft) -> Result<(), CheckoutError> {
    if draft.shipping_address.trim().is_empty() {
        return Err(CheckoutError::MissingField("shipping_address"));
    }
    if draft.shipping_city.trim().is_empty() {
        return Err(CheckoutError::MissingField("shipping_city"));
    }
    if draft.contact_phone.trim().is_empty() {
        return Err(CheckoutError::MissingField("contact_phone"));
    }
    Ok(())
}
