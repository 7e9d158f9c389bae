use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::order::{Customer, OrderItem, OrderMode, OrderRequest, OrderSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// Checkout rules the cart applies locally before anything goes over the
/// wire.
#[derive(Debug, Clone)]
pub struct CheckoutPolicy {
    pub delivery_fee: Decimal,
    pub min_delivery_subtotal: Decimal,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            delivery_fee: dec!(3.50),
            min_delivery_subtotal: dec!(25.00),
        }
    }
}

/// Raw form field values as entered by the customer.
#[derive(Debug, Clone, Default)]
pub struct CustomerForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub note: String,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("the cart is empty")]
    EmptyCart,
    #[error("a name is required")]
    MissingName,
    #[error("an email address is required")]
    MissingEmail,
    #[error("a delivery address is required")]
    MissingAddress,
    #[error("minimum order value for delivery is {minimum}")]
    BelowMinimum { minimum: Decimal },
}

/// The shopping cart owned by a single UI session. Building an
/// [`OrderRequest`] never mutates it; the caller clears it only after the
/// order was confirmed.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    mode: OrderMode,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> OrderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OrderMode) {
        self.mode = mode;
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds one unit of the item; an id already in the cart just bumps its
    /// quantity.
    pub fn add_item(&mut self, id: impl Into<String>, name: impl Into<String>, unit_price: Decimal) {
        let id = id.into();
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == id) {
            existing.quantity += 1;
        } else {
            self.items.push(CartItem {
                id,
                name: name.into(),
                unit_price,
                quantity: 1,
            });
        }
    }

    /// Adjusts an item's quantity by `delta`; dropping to zero or below
    /// removes the line.
    pub fn change_quantity(&mut self, id: &str, delta: i64) {
        if let Some(pos) = self.items.iter().position(|i| i.id == id) {
            let next = i64::from(self.items[pos].quantity) + delta;
            if next <= 0 {
                self.items.remove(pos);
            } else {
                self.items[pos].quantity = next as u32;
            }
        }
    }

    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum()
    }

    pub fn totals(&self, policy: &CheckoutPolicy) -> OrderSummary {
        let subtotal = self.subtotal();
        let delivery_fee = if self.mode == OrderMode::Delivery && subtotal > Decimal::ZERO {
            policy.delivery_fee
        } else {
            Decimal::ZERO
        };
        OrderSummary {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
        }
    }

    /// Turns the cart plus form fields into a normalized [`OrderRequest`],
    /// rejecting locally before any network call.
    pub fn build_order_request(
        &self,
        form: &CustomerForm,
        policy: &CheckoutPolicy,
    ) -> Result<OrderRequest, CheckoutError> {
        if self.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let name = form.name.trim();
        let email = form.email.trim();
        let address = form.address.trim();

        if name.is_empty() {
            return Err(CheckoutError::MissingName);
        }
        if email.is_empty() {
            return Err(CheckoutError::MissingEmail);
        }

        let summary = self.totals(policy);

        if self.mode == OrderMode::Delivery {
            if address.is_empty() {
                return Err(CheckoutError::MissingAddress);
            }
            if summary.subtotal < policy.min_delivery_subtotal {
                return Err(CheckoutError::BelowMinimum {
                    minimum: policy.min_delivery_subtotal,
                });
            }
        }

        let phone = form.phone.trim();
        let note = form.note.trim();

        Ok(OrderRequest {
            mode: self.mode,
            customer: Customer {
                name: name.to_string(),
                email: email.to_string(),
                phone: (!phone.is_empty()).then(|| phone.to_string()),
                address: (self.mode == OrderMode::Delivery).then(|| address.to_string()),
                note: (!note.is_empty()).then(|| note.to_string()),
            },
            items: self
                .items
                .iter()
                .map(|i| OrderItem {
                    id: i.id.clone(),
                    name: i.name.clone(),
                    unit_amount: i.unit_price,
                    quantity: i.quantity,
                })
                .collect(),
            summary,
        })
    }
}
