use async_trait::async_trait;
use serde_json::Value;

use crate::domain::order::OrderRequest;

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("gateway credentials missing: {0}")]
    Auth(String),
    #[error("gateway rejected the request ({status}): {message}")]
    Provider { status: u16, message: String },
    #[error("gateway transport error: {0}")]
    Transport(String),
}

/// Bridge to the external payment provider. `create_order` returns the
/// provider-issued order id; `capture_order` returns the provider's raw
/// capture response so callers can persist it verbatim.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_order(&self, request: &OrderRequest) -> Result<String, GatewayError>;
    async fn capture_order(&self, gateway_order_id: &str) -> Result<Value, GatewayError>;
}
