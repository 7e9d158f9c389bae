use bistro_types::domain::order::{CaptureOutcome, OrderRecord};
use bistro_types::ports::mailer::Mailer;
use bistro_types::ports::order_store::OrderStore;
use bistro_types::ports::payment_gateway::PaymentGateway;
use serde_json::Value;

use crate::errors::AppError;
use crate::validation::{self, CaptureOrderInput, CreateOrderInput};

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub currency: String,
    pub restaurant_name: String,
    pub operator_email: Option<String>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: "EUR".into(),
            restaurant_name: "Bistro Aurora".into(),
            operator_email: None,
        }
    }
}

pub struct CheckoutService<S, G, M> {
    store: S,
    gateway: G,
    mailer: M,
    config: CheckoutConfig,
}

impl<S, G, M> CheckoutService<S, G, M>
where
    S: OrderStore,
    G: PaymentGateway,
    M: Mailer,
{
    pub fn new(store: S, gateway: G, mailer: M, config: CheckoutConfig) -> Self {
        Self {
            store,
            gateway,
            mailer,
            config,
        }
    }

    /// Create phase: validate, create the gateway order, record it. A
    /// validation or gateway failure aborts before anything is written;
    /// a failed write is logged but does not fail the request.
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<String, AppError> {
        let request = validation::validate_create_order(&input).map_err(AppError::Validation)?;
        let gateway_order_id = self.gateway.create_order(&request).await?;

        let record = OrderRecord::created(gateway_order_id.clone(), request);
        if let Err(e) = self.store.append(record).await {
            tracing::warn!(error = %e, %gateway_order_id, "failed to record created order");
        }

        Ok(gateway_order_id)
    }

    /// Capture phase: capture at the gateway, record the outcome, then
    /// notify. The record is written before any mail is attempted, and
    /// mail failures never reach the caller.
    pub async fn capture_order(&self, input: CaptureOrderInput) -> Result<CaptureOutcome, AppError> {
        let gateway_order_id =
            validation::validate_capture_order(&input).map_err(AppError::Validation)?;
        let raw = self.gateway.capture_order(&gateway_order_id).await?;

        let (status, amount) = extract_capture_summary(&raw);
        let record = OrderRecord::captured(
            gateway_order_id.clone(),
            status.clone(),
            amount.clone(),
            self.config.currency.clone(),
            raw.clone(),
        );
        if let Err(e) = self.store.append(record).await {
            tracing::warn!(error = %e, %gateway_order_id, "failed to record captured order");
        }

        self.notify(&gateway_order_id, &status, amount.as_deref(), &raw)
            .await;

        Ok(CaptureOutcome {
            status,
            capture_result: raw,
        })
    }

    async fn notify(&self, gateway_order_id: &str, status: &str, amount: Option<&str>, raw: &Value) {
        let amount = amount.unwrap_or("-");
        let currency = &self.config.currency;
        let restaurant = &self.config.restaurant_name;

        match raw.pointer("/payer/email_address").and_then(Value::as_str) {
            Some(customer_email) => {
                let customer_name = raw
                    .pointer("/payer/name/given_name")
                    .and_then(Value::as_str)
                    .unwrap_or("there");
                let subject = format!("Your order at {restaurant}");
                let body = format!(
                    "Hello {customer_name},\n\n\
                     thank you for your order at {restaurant}.\n\
                     We have received your PayPal payment \
                     (order {gateway_order_id}, amount {amount} {currency}).\n\n\
                     See you soon, or enjoy your meal at home!\n\n\
                     {restaurant}\n"
                );
                if let Err(e) = self.mailer.send(customer_email, &subject, &body).await {
                    tracing::error!(error = %e, "failed to send customer confirmation mail");
                }
            }
            None => {
                tracing::warn!(%gateway_order_id, "capture response has no payer email, skipping customer mail");
            }
        }

        if let Some(operator) = &self.config.operator_email {
            let subject = format!("New online order: {amount} {currency} (PayPal)");
            let body = format!(
                "A new online order has come in.\n\n\
                 PayPal order id: {gateway_order_id}\n\
                 Status: {status}\n\
                 Amount: {amount} {currency}\n\n\
                 Details are in the order log and the customer confirmation.\n"
            );
            if let Err(e) = self.mailer.send(operator, &subject, &body).await {
                tracing::error!(error = %e, "failed to send operator notification mail");
            }
        }
    }
}

/// Pulls status and amount out of a capture response, preferring the nested
/// capture entry and falling back to the top-level fields.
pub fn extract_capture_summary(raw: &Value) -> (String, Option<String>) {
    let capture = raw.pointer("/purchase_units/0/payments/captures/0");
    let status = capture
        .and_then(|c| c.get("status"))
        .and_then(Value::as_str)
        .or_else(|| raw.get("status").and_then(Value::as_str))
        .unwrap_or("UNKNOWN")
        .to_string();
    let amount = capture
        .and_then(|c| c.pointer("/amount/value"))
        .and_then(Value::as_str)
        .or_else(|| {
            raw.pointer("/purchase_units/0/amount/value")
                .and_then(Value::as_str)
        })
        .map(str::to_string);
    (status, amount)
}
