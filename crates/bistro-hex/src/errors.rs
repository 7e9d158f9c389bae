use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bistro_types::ports::payment_gateway::GatewayError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("payment provider error ({status}): {message}")]
    Gateway { status: u16, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Provider { status, message } => Self::Gateway { status, message },
            GatewayError::Auth(message) => Self::Internal(anyhow::anyhow!(message)),
            GatewayError::Transport(message) => {
                Self::Internal(anyhow::anyhow!("gateway transport: {message}"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "validation failed",
                    "details": details,
                })),
            )
                .into_response(),
            AppError::Gateway { status, message } => {
                // Mirror the provider's status when it is an error status.
                let code = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (
                    code,
                    Json(serde_json::json!({
                        "error": "payment provider error",
                        "message": message,
                    })),
                )
                    .into_response()
            }
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "internal error" })),
                )
                    .into_response()
            }
        }
    }
}
