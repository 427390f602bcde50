//! Status and payment enums shared across the client.

use core::fmt;

use serde::{Deserialize, Serialize};

/// How an order is paid.
///
/// `Crypto` routes checkout through the escrow payment detour; the other
/// methods submit directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
    BankTransfer,
    Crypto,
}

impl PaymentMethod {
    /// Whether this method requires an on-chain payment before the order can
    /// be submitted.
    #[must_use]
    pub const fn requires_escrow(&self) -> bool {
        matches!(self, Self::Crypto)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CashOnDelivery => "cash on delivery",
            Self::BankTransfer => "bank transfer",
            Self::Crypto => "crypto escrow",
        };
        write!(f, "{label}")
    }
}

/// Payment settlement state attached to an order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// Order lifecycle state as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// Account type recorded alongside the session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    Farmer,
    Buyer,
    Expert,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Farmer => "farmer",
            Self::Buyer => "buyer",
            Self::Expert => "expert",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_escrow() {
        assert!(PaymentMethod::Crypto.requires_escrow());
        assert!(!PaymentMethod::CashOnDelivery.requires_escrow());
        assert!(!PaymentMethod::BankTransfer.requires_escrow());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"cash_on_delivery\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"completed\""
        );
        let status: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);
    }

    #[test]
    fn test_user_type_display() {
        assert_eq!(UserType::Farmer.to_string(), "farmer");
    }
}
