//! The crypto payment detour: checkout waits on the escrow deposit and only
//! a receipt turns the pending payment into a submittable order.

use rust_decimal::Decimal;

use agrilink_core::{CurrencyCode, PaymentMethod, PaymentStatus, Price, ProductId, Unit};

use agrilink_client::cart::{Cart, CartItem};
use agrilink_client::checkout::{Checkout, CheckoutError, CheckoutStart, OrderDraft};
use agrilink_client::escrow::EscrowErrorKind;

use agrilink_integration_tests::MockWallet;

const CONTRACT: &str = "0x1111111111111111111111111111111111111111";
const SELLER: &str = "0x2222222222222222222222222222222222222222";

fn cart() -> Cart {
    let mut cart = Cart::new();
    cart.add_item(CartItem {
        product_id: ProductId::new(1),
        title: "Basmati rice".to_string(),
        price_per_unit: Price::new(Decimal::from(3200), CurrencyCode::Inr),
        unit: Unit::Quintal,
        quantity: 2,
    });
    cart
}

fn crypto_draft() -> OrderDraft {
    OrderDraft {
        shipping_address: "Village Khandala".to_string(),
        shipping_city: "Satara".to_string(),
        contact_phone: "9988776655".to_string(),
        contact_email: None,
        notes: None,
        payment_method: PaymentMethod::Crypto,
    }
}

fn pending() -> agrilink_client::checkout::PendingPayment {
    match Checkout::begin(&cart(), crypto_draft()).expect("valid checkout") {
        CheckoutStart::AwaitingPayment(pending) => pending,
        CheckoutStart::Ready(_) => panic!("crypto checkout must wait for the deposit"),
    }
}

#[tokio::test]
async fn test_deposit_settles_and_order_carries_the_receipt() {
    let wallet = MockWallet::settling(CONTRACT, "0xdeadbeef");
    let pending = pending();
    assert_eq!(pending.amount(), Decimal::from(6400));

    let request = pending
        .pay_with(&wallet, SELLER)
        .await
        .expect("deposit settles");

    assert_eq!(request.payment_status(), PaymentStatus::Completed);
    assert_eq!(request.payment_transaction(), Some("0xdeadbeef"));

    let value = serde_json::to_value(&request).expect("request serializes");
    assert_eq!(value["payment_contract"], CONTRACT);
    assert_eq!(value["payment_method"], "crypto");

    // The wallet was asked for exactly the cart total, once.
    assert_eq!(
        wallet.recorded_deposits(),
        vec![(SELLER.to_string(), Decimal::from(6400))]
    );
}

#[tokio::test]
async fn test_rejected_deposit_surfaces_classified_error() {
    let wallet = MockWallet::failing(CONTRACT, "MetaMask: User denied transaction signature");

    let err = pending().pay_with(&wallet, SELLER).await.unwrap_err();
    let CheckoutError::Escrow(escrow) = err else {
        panic!("a failed deposit must come back as an escrow error");
    };
    assert_eq!(escrow.kind, EscrowErrorKind::UserRejected);
    assert!(escrow.provider_message.contains("User denied"));
}

#[tokio::test]
async fn test_insufficient_funds_classification_end_to_end() {
    let wallet = MockWallet::failing(
        CONTRACT,
        "err: insufficient funds for gas * price + value",
    );

    let err = pending().pay_with(&wallet, SELLER).await.unwrap_err();
    let CheckoutError::Escrow(escrow) = err else {
        panic!("a failed deposit must come back as an escrow error");
    };
    assert_eq!(escrow.kind, EscrowErrorKind::InsufficientFunds);
    // The message shown to the user leads with the friendly text.
    assert!(escrow.to_string().starts_with("Insufficient funds"));
}

#[test]
fn test_direct_methods_never_wait_on_escrow() {
    for method in [PaymentMethod::CashOnDelivery, PaymentMethod::BankTransfer] {
        let mut draft = crypto_draft();
        draft.payment_method = method;
        match Checkout::begin(&cart(), draft).expect("valid checkout") {
            CheckoutStart::Ready(request) => {
                assert_eq!(request.payment_status(), PaymentStatus::Pending);
                assert!(request.payment_transaction().is_none());
            }
            CheckoutStart::AwaitingPayment(_) => {
                panic!("{method:?} must not route through escrow");
            }
        }
    }
}
