//! Server-side validation of the checkout wire payloads. Structural and
//! type errors are caught by typed deserialization before this layer; the
//! rules here cover the domain constraints and report every violation with
//! a field path, never just the first.

use bistro_types::domain::order::{
    Customer, OrderItem, OrderMode, OrderRequest, OrderSummary,
};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::errors::FieldError;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9+\s()-]+$").unwrap();
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderInput {
    pub mode: OrderMode,
    #[validate]
    pub customer: CustomerInput,
    #[validate]
    pub items: Vec<OrderItemInput>,
    #[validate]
    pub summary: SummaryInput,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerInput {
    #[validate(length(min = 2, max = 100, message = "name must be 2 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom = "phone_characters")]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "note must be at most 500 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderItemInput {
    #[validate(length(min = 1, message = "item id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "item name is required"))]
    pub name: String,
    #[validate(custom = "positive_amount")]
    pub unit_amount: Decimal,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SummaryInput {
    #[validate(custom = "non_negative_amount")]
    pub subtotal: Decimal,
    #[serde(rename = "deliveryFee")]
    #[validate(custom = "non_negative_amount")]
    pub delivery_fee: Decimal,
    #[validate(custom = "non_negative_amount")]
    pub total: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureOrderInput {
    #[serde(rename = "orderID", default)]
    pub order_id: Option<String>,
}

/// Validates a create payload and returns the normalized request, or every
/// violation found.
pub fn validate_create_order(input: &CreateOrderInput) -> Result<OrderRequest, Vec<FieldError>> {
    let mut details = match input.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => collect_field_errors(&errors),
    };

    if input.items.is_empty() {
        details.push(FieldError {
            field: "items".into(),
            message: "at least one item is required".into(),
        });
    }

    if input.mode == OrderMode::Delivery {
        let address = input
            .customer
            .address
            .as_deref()
            .map(str::trim)
            .unwrap_or("");
        if address.is_empty() {
            details.push(FieldError {
                field: "customer.address".into(),
                message: "address is required for delivery".into(),
            });
        }
    }

    // The summary is client-computed; verify it instead of trusting it.
    let computed: Decimal = input
        .items
        .iter()
        .map(|i| i.unit_amount * Decimal::from(i.quantity))
        .sum();
    if computed.round_dp(2) != input.summary.subtotal.round_dp(2) {
        details.push(FieldError {
            field: "summary.subtotal".into(),
            message: "subtotal does not match the order items".into(),
        });
    }
    if (input.summary.subtotal + input.summary.delivery_fee).round_dp(2)
        != input.summary.total.round_dp(2)
    {
        details.push(FieldError {
            field: "summary.total".into(),
            message: "total must equal subtotal plus delivery fee".into(),
        });
    }

    if !details.is_empty() {
        details.sort_by(|a, b| a.field.cmp(&b.field));
        return Err(details);
    }

    Ok(normalize(input))
}

/// Capture payloads only carry the gateway order id; it must be present and
/// non-empty.
pub fn validate_capture_order(input: &CaptureOrderInput) -> Result<String, Vec<FieldError>> {
    match input.order_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(vec![FieldError {
            field: "orderID".into(),
            message: "orderID is required".into(),
        }]),
    }
}

fn normalize(input: &CreateOrderInput) -> OrderRequest {
    let customer = &input.customer;
    OrderRequest {
        mode: input.mode,
        customer: Customer {
            name: customer.name.trim().to_string(),
            email: customer.email.trim().to_string(),
            phone: trimmed_optional(&customer.phone),
            address: match input.mode {
                OrderMode::Delivery => trimmed_optional(&customer.address),
                OrderMode::Pickup => None,
            },
            note: trimmed_optional(&customer.note),
        },
        items: input
            .items
            .iter()
            .map(|i| OrderItem {
                id: i.id.trim().to_string(),
                name: i.name.trim().to_string(),
                unit_amount: i.unit_amount,
                quantity: i.quantity,
            })
            .collect(),
        summary: OrderSummary {
            subtotal: input.summary.subtotal,
            delivery_fee: input.summary.delivery_fee,
            total: input.summary.total,
        },
    }
}

fn trimmed_optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    flatten("", errors, &mut out);
    out
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            (*field).to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| error.code.to_string());
                    out.push(FieldError {
                        field: path.clone(),
                        message,
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(&path, inner, out),
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    flatten(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn phone_characters(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(field_error("phone", "invalid phone number"))
    }
}

fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(field_error("positive", "price must be positive"))
    }
}

fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO {
        Ok(())
    } else {
        Err(field_error("non_negative", "amount must not be negative"))
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn input_from(value: serde_json::Value) -> CreateOrderInput {
        serde_json::from_value(value).unwrap()
    }

    fn valid_pickup() -> serde_json::Value {
        json!({
            "mode": "pickup",
            "customer": { "name": "Alice", "email": "alice@example.com" },
            "items": [
                { "id": "p1", "name": "Margherita", "unit_amount": 9.5, "quantity": 2 }
            ],
            "summary": { "subtotal": 19.0, "deliveryFee": 0.0, "total": 19.0 }
        })
    }

    fn fields(details: &[FieldError]) -> Vec<&str> {
        details.iter().map(|d| d.field.as_str()).collect()
    }

    #[test]
    fn pickup_without_address_is_accepted() {
        let request = validate_create_order(&input_from(valid_pickup())).unwrap();
        assert_eq!(request.mode, OrderMode::Pickup);
        assert_eq!(request.customer.address, None);
        assert_eq!(request.summary.total, dec!(19.00));
    }

    #[test]
    fn normalization_trims_and_collapses_optionals() {
        let mut payload = valid_pickup();
        payload["customer"]["name"] = json!("  Alice  ");
        payload["customer"]["phone"] = json!("   ");
        payload["customer"]["note"] = json!(" extra napkins ");

        let request = validate_create_order(&input_from(payload)).unwrap();
        assert_eq!(request.customer.name, "Alice");
        assert_eq!(request.customer.phone, None);
        assert_eq!(request.customer.note.as_deref(), Some("extra napkins"));
    }

    #[test]
    fn delivery_with_empty_address_is_rejected_naming_address() {
        let mut payload = valid_pickup();
        payload["mode"] = json!("delivery");
        payload["customer"]["address"] = json!("   ");

        let details = validate_create_order(&input_from(payload)).unwrap_err();
        assert!(fields(&details).contains(&"customer.address"));
    }

    #[test]
    fn delivery_with_address_is_accepted() {
        let mut payload = valid_pickup();
        payload["mode"] = json!("delivery");
        payload["customer"]["address"] = json!("Hauptstrasse 1, 10115 Berlin");
        payload["summary"] = json!({ "subtotal": 19.0, "deliveryFee": 3.5, "total": 22.5 });

        let request = validate_create_order(&input_from(payload)).unwrap();
        assert_eq!(
            request.customer.address.as_deref(),
            Some("Hauptstrasse 1, 10115 Berlin")
        );
        assert_eq!(request.summary.delivery_fee, dec!(3.50));
    }

    #[test]
    fn all_violations_are_collected() {
        let payload = json!({
            "mode": "delivery",
            "customer": { "name": "A", "email": "not-an-email" },
            "items": [
                { "id": "", "name": "Margherita", "unit_amount": 0.0, "quantity": 0 }
            ],
            "summary": { "subtotal": -1.0, "deliveryFee": 0.0, "total": 19.0 }
        });

        let details = validate_create_order(&input_from(payload)).unwrap_err();
        let fields = fields(&details);
        assert!(fields.contains(&"customer.name"));
        assert!(fields.contains(&"customer.email"));
        assert!(fields.contains(&"customer.address"));
        assert!(fields.contains(&"items[0].id"));
        assert!(fields.contains(&"items[0].unit_amount"));
        assert!(fields.contains(&"items[0].quantity"));
        assert!(fields.contains(&"summary.subtotal"));
    }

    #[test]
    fn empty_items_are_rejected() {
        let mut payload = valid_pickup();
        payload["items"] = json!([]);
        payload["summary"] = json!({ "subtotal": 0.0, "deliveryFee": 0.0, "total": 0.0 });

        let details = validate_create_order(&input_from(payload)).unwrap_err();
        assert!(fields(&details).contains(&"items"));
    }

    #[test]
    fn phone_pattern_is_permissive_but_bounded() {
        let mut payload = valid_pickup();
        payload["customer"]["phone"] = json!("+49 (30) 123-456");
        assert!(validate_create_order(&input_from(payload)).is_ok());

        let mut payload = valid_pickup();
        payload["customer"]["phone"] = json!("call me maybe");
        let details = validate_create_order(&input_from(payload)).unwrap_err();
        assert!(fields(&details).contains(&"customer.phone"));

        // empty string counts as absent, matching the order form
        let mut payload = valid_pickup();
        payload["customer"]["phone"] = json!("");
        assert!(validate_create_order(&input_from(payload)).is_ok());
    }

    #[test]
    fn overlong_note_is_rejected() {
        let mut payload = valid_pickup();
        payload["customer"]["note"] = json!("x".repeat(501));
        let details = validate_create_order(&input_from(payload)).unwrap_err();
        assert!(fields(&details).contains(&"customer.note"));
    }

    #[test]
    fn mismatched_subtotal_is_rejected() {
        let mut payload = valid_pickup();
        payload["summary"] = json!({ "subtotal": 20.0, "deliveryFee": 0.0, "total": 20.0 });
        let details = validate_create_order(&input_from(payload)).unwrap_err();
        assert!(fields(&details).contains(&"summary.subtotal"));
    }

    #[test]
    fn total_must_be_subtotal_plus_fee() {
        let mut payload = valid_pickup();
        payload["summary"] = json!({ "subtotal": 19.0, "deliveryFee": 3.5, "total": 19.0 });
        let details = validate_create_order(&input_from(payload)).unwrap_err();
        assert!(fields(&details).contains(&"summary.total"));
    }

    #[test]
    fn capture_requires_a_non_empty_order_id() {
        let missing: CaptureOrderInput = serde_json::from_value(json!({})).unwrap();
        let details = validate_capture_order(&missing).unwrap_err();
        assert_eq!(details[0].field, "orderID");

        let empty: CaptureOrderInput =
            serde_json::from_value(json!({ "orderID": "  " })).unwrap();
        assert!(validate_capture_order(&empty).is_err());

        let ok: CaptureOrderInput =
            serde_json::from_value(json!({ "orderID": " PAYPAL-123 " })).unwrap();
        assert_eq!(validate_capture_order(&ok).unwrap(), "PAYPAL-123");
    }
}
