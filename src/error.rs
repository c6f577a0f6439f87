//! Error types for the faucet service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Faucet service errors
#[derive(Error, Debug)]
pub enum FaucetError {
    /// Startup-fatal configuration problem. Never reaches a request handler.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("address in cooldown, can request again in {}", humanize(.remaining))]
    CooldownActive { remaining: Duration },

    #[error("failed to fetch nonce: {0}")]
    NonceFetch(String),

    #[error("failed to fetch gas price: {0}")]
    GasPriceFetch(String),

    #[error("failed to estimate gas: {0}")]
    GasEstimate(String),

    #[error("failed to query balance: {0}")]
    BalanceQuery(String),

    #[error("failed to sign transaction: {0}")]
    Signing(String),

    #[error("failed to submit transaction: {0}")]
    Submission(String),

    #[error("rpc error: {0}")]
    Rpc(String),
}

/// Renders a remaining cooldown rounded to the nearest minute.
fn humanize(remaining: &Duration) -> String {
    let minutes = (remaining.as_secs() + 30) / 60;
    if minutes == 0 {
        "less than a minute".to_string()
    } else if minutes == 1 {
        "about 1 minute".to_string()
    } else {
        format!("about {} minutes", minutes)
    }
}

impl IntoResponse for FaucetError {
    fn into_response(self) -> Response {
        let status = match &self {
            FaucetError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            FaucetError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            FaucetError::NonceFetch(_)
            | FaucetError::GasPriceFetch(_)
            | FaucetError::GasEstimate(_)
            | FaucetError::BalanceQuery(_)
            | FaucetError::Submission(_)
            | FaucetError::Rpc(_) => StatusCode::BAD_GATEWAY,
            FaucetError::Signing(_) | FaucetError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type FaucetResult<T> = Result<T, FaucetError>;
