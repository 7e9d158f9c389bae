use axum::extract::{FromRequest, Request, State};
use axum::routing::{get, post};
use axum::{serve, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::checkout_service::CheckoutService;
use crate::errors::AppError;
use crate::validation::{CaptureOrderInput, CreateOrderInput};
use bistro_types::domain::order::CaptureOutcome;
use bistro_types::ports::mailer::Mailer;
use bistro_types::ports::order_store::OrderStore;
use bistro_types::ports::payment_gateway::PaymentGateway;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
    /// Root of the static site; unmatched non-API paths fall back to its
    /// index.html.
    pub public_dir: PathBuf,
}

pub struct HttpServer<S, G, M>
where
    S: OrderStore,
    G: PaymentGateway,
    M: Mailer,
{
    pub service: Arc<CheckoutService<S, G, M>>,
    pub config: HttpServerConfig,
}

#[derive(Serialize)]
struct CreateOrderResponse {
    #[serde(rename = "orderID")]
    order_id: String,
}

/// Json extractor that reports body problems as a 400 with a JSON error
/// body instead of axum's default 422.
struct ApiJson<T>(T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

impl<S, G, M> HttpServer<S, G, M>
where
    S: OrderStore,
    G: PaymentGateway,
    M: Mailer,
{
    pub async fn new(
        service: CheckoutService<S, G, M>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            service: Arc::new(service),
            config,
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        // The site is served cross-origin during development.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let static_site = ServeDir::new(&self.config.public_dir)
            .fallback(ServeFile::new(self.config.public_dir.join("index.html")));

        let svc = self.service.clone();
        let app = Router::new()
            .route("/api/health", get(health))
            .route("/api/orders/create", post(create_order::<S, G, M>))
            .route("/api/orders/capture", post(capture_order::<S, G, M>))
            .fallback_service(static_site)
            .layer(cors)
            .layer(trace_layer)
            .with_state(svc);

        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}

async fn create_order<S, G, M>(
    State(service): State<Arc<CheckoutService<S, G, M>>>,
    ApiJson(payload): ApiJson<CreateOrderInput>,
) -> Result<Json<CreateOrderResponse>, AppError>
where
    S: OrderStore,
    G: PaymentGateway,
    M: Mailer,
{
    let order_id = service.create_order(payload).await?;
    Ok(Json(CreateOrderResponse { order_id }))
}

async fn capture_order<S, G, M>(
    State(service): State<Arc<CheckoutService<S, G, M>>>,
    ApiJson(payload): ApiJson<CaptureOrderInput>,
) -> Result<Json<CaptureOutcome>, AppError>
where
    S: OrderStore,
    G: PaymentGateway,
    M: Mailer,
{
    let outcome = service.capture_order(payload).await?;
    Ok(Json(outcome))
}
