//! HTTP surface for the faucet service

use crate::error::FaucetResult;
use crate::service::{DispenseReceipt, FaucetService, FaucetStatus};
use axum::{extract::State, response::IntoResponse, routing, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Dispense request body
#[derive(Debug, Deserialize)]
pub struct DispenseRequest {
    pub address: String,
}

/// Dispense response body. `tx_hash` is present only on success.
#[derive(Debug, Serialize)]
pub struct DispenseResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

pub fn router(service: Arc<FaucetService>) -> Router {
    Router::new()
        .route("/", routing::get(root_handler))
        .route("/health", routing::get(health_handler))
        .route("/api/status", routing::get(status_handler))
        .route("/api/dispense", routing::post(dispense_handler))
        .with_state(service)
}

/// Dispense handler. Address validation lives in the engine; this layer
/// only moves the string in and the receipt out.
pub async fn dispense_handler(
    State(service): State<Arc<FaucetService>>,
    Json(request): Json<DispenseRequest>,
) -> impl IntoResponse {
    info!("Dispense request for address: {}", request.address);

    match service.dispense(&request.address).await {
        Ok(DispenseReceipt { tx_hash, .. }) => Json(DispenseResponse {
            success: true,
            message: "tokens sent".to_string(),
            tx_hash: Some(tx_hash.to_string()),
        })
        .into_response(),
        Err(e) => {
            error!("Dispense failed for {}: {}", request.address, e);
            e.into_response()
        }
    }
}

pub async fn status_handler(
    State(service): State<Arc<FaucetService>>,
) -> FaucetResult<Json<FaucetStatus>> {
    Ok(Json(service.status().await?))
}

pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "drip",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "rate-limited native-asset faucet",
        "endpoints": {
            "POST /api/dispense": "Request tokens",
            "GET /api/status": "Faucet status",
            "GET /health": "Health check",
        }
    }))
}
