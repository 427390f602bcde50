//! Integration tests for the AgriLink client.
//!
//! These tests exercise the flows that span modules - cart to checkout to
//! escrow, wizard to submission, session storage to expiry - without a
//! backend. The network edge is typed request/response structs, so the
//! flows up to the POST are fully testable offline.
//!
//! The library part holds shared fixtures; the scenarios live under
//! `tests/`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;

use rust_decimal::Decimal;

use agrilink_client::escrow::{ProviderError, WalletProvider};

/// A wallet provider for tests: resolves deposits with a canned outcome and
/// records what was asked of it.
pub struct MockWallet {
    contract: String,
    outcome: Result<String, String>,
    deposits: Mutex<Vec<(String, Decimal)>>,
}

impl MockWallet {
    /// A wallet whose deposits settle with the given transaction hash.
    #[must_use]
    pub fn settling(contract: &str, transaction_hash: &str) -> Self {
        Self {
            contract: contract.to_owned(),
            outcome: Ok(transaction_hash.to_owned()),
            deposits: Mutex::new(Vec::new()),
        }
    }

    /// A wallet whose deposits fail with the given provider message.
    #[must_use]
    pub fn failing(contract: &str, message: &str) -> Self {
        Self {
            contract: contract.to_owned(),
            outcome: Err(message.to_owned()),
            deposits: Mutex::new(Vec::new()),
        }
    }

    /// The `(seller_address, amount)` pairs deposited so far.
    ///
    /// # Panics
    ///
    /// Panics if a previous test thread panicked while recording.
    #[must_use]
    pub fn recorded_deposits(&self) -> Vec<(String, Decimal)> {
        self.deposits
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl WalletProvider for MockWallet {
    fn contract_address(&self) -> &str {
        &self.contract
    }

    fn deposit(
        &self,
        seller_address: &str,
        amount: Decimal,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send {
        if let Ok(mut deposits) = self.deposits.lock() {
            deposits.push((seller_address.to_owned(), amount));
        }
        let outcome = self.outcome.clone();
        async move { outcome.map_err(ProviderError) }
    }
}
