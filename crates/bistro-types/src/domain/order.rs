use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    #[default]
    Pickup,
    Delivery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub unit_amount: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    #[serde(rename = "deliveryFee")]
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

/// Normalized checkout attempt as it crosses the wire and ends up in the
/// order log. Immutable once validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub mode: OrderMode,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub summary: OrderSummary,
}

/// Append-only log entry. Capture never updates the matching `Created`
/// record; it appends its own `Captured` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderRecord {
    Created {
        id: Uuid,
        gateway_order_id: String,
        created_at: DateTime<Utc>,
        request: OrderRequest,
    },
    Captured {
        id: Uuid,
        gateway_order_id: String,
        status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<String>,
        currency: String,
        captured_at: DateTime<Utc>,
        raw: Value,
    },
}

impl OrderRecord {
    pub fn created(gateway_order_id: impl Into<String>, request: OrderRequest) -> Self {
        Self::Created {
            id: Uuid::new_v4(),
            gateway_order_id: gateway_order_id.into(),
            created_at: Utc::now(),
            request,
        }
    }

    pub fn captured(
        gateway_order_id: impl Into<String>,
        status: impl Into<String>,
        amount: Option<String>,
        currency: impl Into<String>,
        raw: Value,
    ) -> Self {
        Self::Captured {
            id: Uuid::new_v4(),
            gateway_order_id: gateway_order_id.into(),
            status: status.into(),
            amount,
            currency: currency.into(),
            captured_at: Utc::now(),
            raw,
        }
    }

    pub fn gateway_order_id(&self) -> &str {
        match self {
            Self::Created {
                gateway_order_id, ..
            }
            | Self::Captured {
                gateway_order_id, ..
            } => gateway_order_id,
        }
    }
}

/// Result of the capture phase as returned to the HTTP caller.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureOutcome {
    pub status: String,
    #[serde(rename = "captureResult")]
    pub capture_result: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_request() -> OrderRequest {
        OrderRequest {
            mode: OrderMode::Pickup,
            customer: Customer {
                name: "Alice".into(),
                email: "a@b.com".into(),
                phone: None,
                address: None,
                note: None,
            },
            items: vec![OrderItem {
                id: "p1".into(),
                name: "Margherita".into(),
                unit_amount: dec!(9.50),
                quantity: 2,
            }],
            summary: OrderSummary {
                subtotal: dec!(19.00),
                delivery_fee: dec!(0.00),
                total: dec!(19.00),
            },
        }
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(OrderMode::Delivery).unwrap(),
            serde_json::json!("delivery")
        );
        let mode: OrderMode = serde_json::from_str("\"pickup\"").unwrap();
        assert_eq!(mode, OrderMode::Pickup);
    }

    #[test]
    fn summary_uses_delivery_fee_wire_name() {
        let v = serde_json::to_value(sample_request().summary).unwrap();
        assert!(v.get("deliveryFee").is_some());
        assert!(v.get("delivery_fee").is_none());
    }

    #[test]
    fn request_round_trips_with_absent_optionals() {
        let v = serde_json::to_value(sample_request()).unwrap();
        assert!(v["customer"].get("phone").is_none());
        let back: OrderRequest = serde_json::from_value(v).unwrap();
        assert_eq!(back.items[0].quantity, 2);
        assert_eq!(back.summary.total, dec!(19.00));
    }

    #[test]
    fn record_variants_are_tagged() {
        let created = OrderRecord::created("PAYPAL-1", sample_request());
        let v = serde_json::to_value(&created).unwrap();
        assert_eq!(v["kind"], "created");
        assert_eq!(v["gateway_order_id"], "PAYPAL-1");

        let captured = OrderRecord::captured(
            "PAYPAL-1",
            "COMPLETED",
            Some("19.00".into()),
            "EUR",
            serde_json::json!({"status": "COMPLETED"}),
        );
        let v = serde_json::to_value(&captured).unwrap();
        assert_eq!(v["kind"], "captured");
        assert_eq!(v["amount"], "19.00");

        let back: OrderRecord = serde_json::from_value(v).unwrap();
        assert_eq!(back.gateway_order_id(), "PAYPAL-1");
    }
}
