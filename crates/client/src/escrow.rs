//! The escrow payment boundary.
//!
//! The deployed escrow contract holds the buyer's funds until delivery is
//! confirmed. All cryptography and settlement live in the external wallet
//! provider and the contract; this module only calls `deposit` through the
//! [`WalletProvider`] seam and turns provider failures into something a
//! person can read.
//!
//! The wallet confirmation is user-driven and unbounded: `deposit` resolves
//! whenever the user approves or rejects in their wallet, and no timeout is
//! applied here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw failure reported by a wallet provider.
///
/// Providers surface free-form message strings; classification happens on
/// this side of the seam.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// External wallet/contract interface.
///
/// Implementations wrap a browser wallet, a keystore, or (in tests) a mock.
pub trait WalletProvider {
    /// Address of the deployed escrow contract this provider talks to.
    fn contract_address(&self) -> &str;

    /// Call `deposit(sellerAddress)` on the escrow contract with `amount`
    /// attached, returning the on-chain transaction hash.
    ///
    /// # Errors
    ///
    /// Returns the provider's raw error message on failure.
    fn deposit(
        &self,
        seller_address: &str,
        amount: Decimal,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}

/// Proof that the escrow deposit settled.
///
/// This is exactly the payload the checkout flow needs to finalize a crypto
/// order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EscrowReceipt {
    /// On-chain transaction hash of the deposit.
    pub transaction_hash: String,
    /// Address of the escrow contract that holds the funds.
    pub contract_address: String,
}

/// Best-effort classification of provider failures.
///
/// Providers report errors as message strings, so this is substring
/// matching and explicitly non-exhaustive; anything unrecognized is
/// `Unexpected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscrowErrorKind {
    InsufficientFunds,
    WalletConnection,
    UserRejected,
    GasLimit,
    Network,
    Unexpected,
}

impl EscrowErrorKind {
    /// Human-readable message for this failure category.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InsufficientFunds => "Insufficient funds in your wallet for this payment",
            Self::WalletConnection => "Could not reach your wallet; check that it is connected",
            Self::UserRejected => "The transaction was rejected in your wallet",
            Self::GasLimit => "The transaction ran out of gas",
            Self::Network => "A network error interrupted the payment",
            Self::Unexpected => "The payment failed unexpectedly",
        }
    }
}

/// A classified escrow failure, keeping the provider's message verbatim.
#[derive(Debug, Clone, Error)]
#[error("{}: {provider_message}", kind.user_message())]
pub struct EscrowError {
    /// Failure category.
    pub kind: EscrowErrorKind,
    /// The provider's original message.
    pub provider_message: String,
}

/// Classify a provider error message by substring.
#[must_use]
pub fn classify_provider_error(message: &str) -> EscrowErrorKind {
    let lower = message.to_lowercase();

    // Order matters: "user rejected" messages often also mention the
    // wallet, and gas errors mention funds.
    if lower.contains("user rejected") || lower.contains("user denied") {
        EscrowErrorKind::UserRejected
    } else if lower.contains("insufficient funds") || lower.contains("insufficient balance") {
        EscrowErrorKind::InsufficientFunds
    } else if lower.contains("out of gas") || lower.contains("gas limit") || lower.contains("gas required")
    {
        EscrowErrorKind::GasLimit
    } else if lower.contains("wallet") || lower.contains("not connected") || lower.contains("no provider")
    {
        EscrowErrorKind::WalletConnection
    } else if lower.contains("network") || lower.contains("timeout") || lower.contains("disconnected")
    {
        EscrowErrorKind::Network
    } else {
        EscrowErrorKind::Unexpected
    }
}

/// Run the escrow deposit and return the receipt the checkout flow needs.
///
/// # Errors
///
/// Provider failures come back classified, with the original message
/// preserved.
pub async fn deposit<P: WalletProvider>(
    provider: &P,
    seller_address: &str,
    amount: Decimal,
) -> Result<EscrowReceipt, EscrowError> {
    tracing::info!(%amount, seller = seller_address, "requesting escrow deposit");

    let transaction_hash = provider
        .deposit(seller_address, amount)
        .await
        .map_err(|e| {
            let kind = classify_provider_error(&e.0);
            tracing::warn!(?kind, "escrow deposit failed: {e}");
            EscrowError {
                kind,
                provider_message: e.0,
            }
        })?;

    tracing::info!(tx = %transaction_hash, "escrow deposit confirmed");
    Ok(EscrowReceipt {
        transaction_hash,
        contract_address: provider.contract_address().to_owned(),
    })
}
