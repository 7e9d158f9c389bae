//! Offline walkthrough of the cart model and payload builder.
//!
//! Run with: cargo run -p bistro-app --example cart_demo

use bistro_hex::domain::cart::{Cart, CheckoutPolicy, CustomerForm};
use bistro_hex::domain::order::OrderMode;
use rust_decimal_macros::dec;

fn main() -> anyhow::Result<()> {
    let mut cart = Cart::new();
    cart.add_item("margherita", "Pizza Margherita", dec!(9.50));
    cart.add_item("margherita", "Pizza Margherita", dec!(9.50));
    cart.add_item("tiramisu", "Tiramisu", dec!(6.00));

    let policy = CheckoutPolicy::default();
    println!("subtotal: {}", cart.subtotal());

    let form = CustomerForm {
        name: "Alice Example".into(),
        email: "alice@example.com".into(),
        address: "Hauptstrasse 1, 10115 Berlin".into(),
        ..CustomerForm::default()
    };

    // pickup first, then switch to delivery and watch the fee appear
    let pickup = cart.build_order_request(&form, &policy)?;
    println!("pickup total: {}", pickup.summary.total);

    cart.set_mode(OrderMode::Delivery);
    match cart.build_order_request(&form, &policy) {
        Ok(request) => {
            println!("delivery payload:\n{}", serde_json::to_string_pretty(&request)?);
        }
        Err(err) => println!("checkout rejected: {err}"),
    }

    Ok(())
}
