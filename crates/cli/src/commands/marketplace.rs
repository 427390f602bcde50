//! Marketplace commands: listings and orders.

use tracing::{info, warn};

use agrilink_core::{PaymentMethod, Price, ProductId};

use agrilink_client::cart::{Cart, CartItem};
use agrilink_client::checkout::{Checkout, CheckoutStart, OrderDraft};

/// Print all marketplace listings.
///
/// # Errors
///
/// Returns an error if the request fails or the session is invalid.
pub async fn list_products() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = super::client()?;
    let products = client.list_products().await?;

    info!("{} listings", products.len());
    for product in &products {
        let price = Price::new(product.price_per_unit, product.currency);
        info!(
            "  #{} {} - {} per {} (seller: {})",
            product.id,
            product.title,
            price.display(),
            product.unit.label(),
            product.seller,
        );
    }
    Ok(())
}

/// Print one listing in full.
///
/// # Errors
///
/// Returns an error if the product does not exist or the request fails.
pub async fn show_product(id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = super::client()?;
    let product = client.get_product(ProductId::new(id)).await?;

    let price = Price::new(product.price_per_unit, product.currency);
    info!("#{} {}", product.id, product.title);
    info!("  {} per {}", price.display(), product.unit.label());
    info!("  Seller: {}", product.seller);
    if let Some(stock) = product.available_quantity {
        info!("  Available: {stock} {}", product.unit.label());
    }
    if let Some(description) = &product.description {
        info!("  {description}");
    }
    Ok(())
}

/// Print the user's order history.
///
/// # Errors
///
/// Returns an error if the request fails or the session is invalid.
pub async fn list_orders() -> Result<(), Box<dyn std::error::Error>> {
    let (_, client) = super::client()?;
    let orders = client.my_orders().await?;

    info!("{} orders", orders.len());
    for order in &orders {
        info!(
            "  #{} {:?} - {} ({})",
            order.id,
            order.status,
            order.total_amount,
            order.created_at.format("%Y-%m-%d"),
        );
    }
    Ok(())
}

/// Place an order for a single product.
///
/// Crypto payment is refused here: the escrow deposit needs a wallet
/// provider, and this binary does not carry one.
///
/// # Errors
///
/// Returns an error on invalid arguments, a failed checkout, or a rejected
/// submission.
pub async fn place_order(
    product: i64,
    quantity: i64,
    address: &str,
    city: &str,
    phone: &str,
    payment: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let payment_method = parse_payment_method(payment)?;

    let (_, client) = super::client()?;
    let product = client.get_product(ProductId::new(product)).await?;

    if let Some(stock) = product.available_quantity
        && quantity > stock
    {
        warn!("Ordering {quantity} but seller lists only {stock} available");
    }

    let mut cart = Cart::new();
    cart.add_item(CartItem::from_product(&product, quantity));

    let draft = OrderDraft {
        shipping_address: address.to_owned(),
        shipping_city: city.to_owned(),
        contact_phone: phone.to_owned(),
        contact_email: None,
        notes: None,
        payment_method,
    };

    let request = match Checkout::begin(&cart, draft)? {
        CheckoutStart::Ready(request) => request,
        CheckoutStart::AwaitingPayment(_) => {
            return Err("crypto payment needs a wallet provider; use the web app".into());
        }
    };

    let confirmation = client.create_order(&request).await?;
    info!("Order #{} placed ({:?})", confirmation.id, confirmation.status);
    Ok(())
}

fn parse_payment_method(raw: &str) -> Result<PaymentMethod, Box<dyn std::error::Error>> {
    match raw {
        "cash_on_delivery" | "cod" => Ok(PaymentMethod::CashOnDelivery),
        "bank_transfer" => Ok(PaymentMethod::BankTransfer),
        "crypto" => Ok(PaymentMethod::Crypto),
        other => Err(format!(
            "unknown payment method `{other}` (expected cash_on_delivery, bank_transfer or crypto)"
        )
        .into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payment_method() {
        assert_eq!(
            parse_payment_method("cod").unwrap(),
            PaymentMethod::CashOnDelivery
        );
        assert_eq!(
            parse_payment_method("bank_transfer").unwrap(),
            PaymentMethod::BankTransfer
        );
        assert!(parse_payment_method("barter").is_err());
    }
}
