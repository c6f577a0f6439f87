//! Faucet configuration

use crate::error::{FaucetError, FaucetResult};
use std::time::Duration;

/// Faucet service configuration
#[derive(Debug, Clone)]
pub struct FaucetConfig {
    /// Listen address for the HTTP server
    pub listen_addr: String,

    /// JSON-RPC endpoint of the ledger node
    pub rpc_url: String,

    /// Faucet account private key (hex, `0x` prefix optional)
    pub private_key: String,

    /// Amount dispensed per request (in wei)
    pub amount_wei: u128,

    /// Cooldown between requests for the same address
    pub cooldown: Duration,

    /// Deadline applied to every ledger RPC call
    pub rpc_timeout: Duration,

    /// Enable permissive CORS on the HTTP surface
    pub cors_enabled: bool,
}

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_RPC_URL: &str = "http://localhost:8545";
const DEFAULT_AMOUNT_WEI: u128 = 1_000_000_000_000_000_000; // 1 ETH
const DEFAULT_COOLDOWN_HOURS: u64 = 24;
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 15;

impl FaucetConfig {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except `FAUCET_PRIVATE_KEY`, which is
    /// mandatory. Malformed numeric values are startup-fatal rather than
    /// silently replaced.
    pub fn from_env() -> FaucetResult<Self> {
        let private_key = std::env::var("FAUCET_PRIVATE_KEY")
            .map_err(|_| FaucetError::Config("FAUCET_PRIVATE_KEY is required".to_string()))?;

        let listen_addr =
            std::env::var("FAUCET_LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());

        let rpc_url =
            std::env::var("FAUCET_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());

        let amount_wei = match std::env::var("FAUCET_AMOUNT") {
            Ok(raw) => raw.parse::<u128>().map_err(|_| {
                FaucetError::Config(format!("FAUCET_AMOUNT is not a valid wei amount: {}", raw))
            })?,
            Err(_) => DEFAULT_AMOUNT_WEI,
        };

        let cooldown_hours = match std::env::var("FAUCET_COOLDOWN_HOURS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                FaucetError::Config(format!("FAUCET_COOLDOWN_HOURS is not a valid number: {}", raw))
            })?,
            Err(_) => DEFAULT_COOLDOWN_HOURS,
        };

        let rpc_timeout_secs = match std::env::var("FAUCET_RPC_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                FaucetError::Config(format!(
                    "FAUCET_RPC_TIMEOUT_SECS is not a valid number: {}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_RPC_TIMEOUT_SECS,
        };

        let cors_enabled = std::env::var("FAUCET_CORS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        Ok(Self {
            listen_addr,
            rpc_url,
            private_key,
            amount_wei,
            cooldown: Duration::from_secs(cooldown_hours * 3600),
            rpc_timeout: Duration::from_secs(rpc_timeout_secs),
            cors_enabled,
        })
    }
}
