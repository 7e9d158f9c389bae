//! bistro-paypal: PayPal REST adapter for the `PaymentGateway` port.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bistro_types::domain::order::OrderRequest;
use bistro_types::ports::payment_gateway::{GatewayError, PaymentGateway};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_CURRENCY: &str = "EUR";
const DEFAULT_BRAND_NAME: &str = "Bistro Aurora";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaypalEnv {
    Sandbox,
    Live,
}

impl PaypalEnv {
    /// Anything other than "live" falls back to the sandbox.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("live") {
            Self::Live
        } else {
            Self::Sandbox
        }
    }

    fn base_url(self) -> &'static str {
        match self {
            Self::Live => "https://api-m.paypal.com/",
            Self::Sandbox => "https://api-m.sandbox.paypal.com/",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaypalCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Clone)]
pub struct PaypalClientBuilder {
    base: String,
    credentials: Option<PaypalCredentials>,
    currency: String,
    brand_name: String,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

/// Stateless client: every operation re-authenticates, no token is cached
/// across calls.
#[derive(Clone)]
pub struct PaypalClient {
    base: Url,
    credentials: Option<PaypalCredentials>,
    currency: String,
    brand_name: String,
    client: reqwest::Client,
}

impl PaypalClient {
    pub fn builder(env: PaypalEnv) -> PaypalClientBuilder {
        PaypalClientBuilder {
            base: env.base_url().to_string(),
            credentials: None,
            currency: DEFAULT_CURRENCY.to_string(),
            brand_name: DEFAULT_BRAND_NAME.to_string(),
            timeout: None,
            client: None,
        }
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|e| GatewayError::Transport(format!("invalid gateway url: {e}")))
    }

    /// Exchanges the configured client credentials for a short-lived bearer
    /// token.
    pub async fn authenticate(&self) -> Result<String, GatewayError> {
        let creds = self.credentials.as_ref().ok_or_else(|| {
            GatewayError::Auth("PayPal client id / secret are not configured".into())
        })?;

        let res = self
            .client
            .post(self.url("v1/oauth2/token")?)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(transport)?;

        let res = ok_or_provider_error(res).await?;
        let token: TokenResponse = res.json().await.map_err(transport)?;
        Ok(token.access_token)
    }

    fn money(&self, value: rust_decimal::Decimal) -> MoneyDto {
        MoneyDto {
            currency_code: self.currency.clone(),
            value: format!("{value:.2}"),
        }
    }

    fn create_order_body(&self, request: &OrderRequest) -> CreateOrderBody {
        let items = request
            .items
            .iter()
            .map(|item| ItemDto {
                name: item.name.clone(),
                unit_amount: self.money(item.unit_amount),
                quantity: item.quantity.to_string(),
            })
            .collect();

        CreateOrderBody {
            intent: "CAPTURE".into(),
            purchase_units: vec![PurchaseUnitDto {
                amount: AmountDto {
                    currency_code: self.currency.clone(),
                    value: format!("{:.2}", request.summary.total),
                    breakdown: BreakdownDto {
                        item_total: self.money(request.summary.subtotal),
                        shipping: self.money(request.summary.delivery_fee),
                    },
                },
                items,
            }],
            application_context: ApplicationContextDto {
                brand_name: self.brand_name.clone(),
                landing_page: "NO_PREFERENCE".into(),
                user_action: "PAY_NOW".into(),
            },
        }
    }
}

impl PaypalClientBuilder {
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.credentials = Some(PaypalCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        });
        self
    }

    pub fn with_optional_credentials(mut self, credentials: Option<PaypalCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_brand_name(mut self, brand_name: impl Into<String>) -> Self {
        self.brand_name = brand_name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Point the client somewhere other than the PayPal environments; test
    /// servers use this.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.base = base;
        self
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<PaypalClient> {
        let base = Url::parse(&self.base).context("invalid gateway base url")?;
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };
        Ok(PaypalClient {
            base,
            credentials: self.credentials,
            currency: self.currency,
            brand_name: self.brand_name,
            client,
        })
    }
}

#[async_trait]
impl PaymentGateway for PaypalClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<String, GatewayError> {
        let token = self.authenticate().await?;
        let body = self.create_order_body(request);

        let res = self
            .client
            .post(self.url("v2/checkout/orders")?)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let res = ok_or_provider_error(res).await?;
        let created: CreateOrderResponse = res.json().await.map_err(transport)?;
        tracing::info!(gateway_order_id = %created.id, "created gateway order");
        Ok(created.id)
    }

    async fn capture_order(&self, gateway_order_id: &str) -> Result<Value, GatewayError> {
        let token = self.authenticate().await?;

        let res = self
            .client
            .post(self.url(&format!("v2/checkout/orders/{gateway_order_id}/capture"))?)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let res = ok_or_provider_error(res).await?;
        res.json().await.map_err(transport)
    }
}

fn transport(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

/// Any non-success provider status becomes a `Provider` error carrying the
/// provider's status and message.
async fn ok_or_provider_error(res: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| {
            if text.is_empty() {
                "payment failed".into()
            } else {
                text.clone()
            }
        });
    Err(GatewayError::Provider {
        status: status.as_u16(),
        message,
    })
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    id: String,
}

#[derive(Serialize, Debug)]
struct MoneyDto {
    currency_code: String,
    value: String,
}

#[derive(Serialize, Debug)]
struct ItemDto {
    name: String,
    unit_amount: MoneyDto,
    quantity: String,
}

#[derive(Serialize, Debug)]
struct BreakdownDto {
    item_total: MoneyDto,
    shipping: MoneyDto,
}

#[derive(Serialize, Debug)]
struct AmountDto {
    currency_code: String,
    value: String,
    breakdown: BreakdownDto,
}

#[derive(Serialize, Debug)]
struct PurchaseUnitDto {
    amount: AmountDto,
    items: Vec<ItemDto>,
}

#[derive(Serialize, Debug)]
struct ApplicationContextDto {
    brand_name: String,
    landing_page: String,
    user_action: String,
}

#[derive(Serialize, Debug)]
struct CreateOrderBody {
    intent: String,
    purchase_units: Vec<PurchaseUnitDto>,
    application_context: ApplicationContextDto,
}
