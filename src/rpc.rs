//! Ledger client: the JSON-RPC contract the disbursement engine consumes

use crate::error::{FaucetError, FaucetResult};
use crate::types::{Address, Hash};
use async_trait::async_trait;
use std::time::Duration;

/// Operations the engine needs from the ledger node.
///
/// The engine depends on this contract only; tests substitute a mock.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Pending-nonce for an account (includes transactions still in the pool).
    async fn pending_nonce(&self, account: Address) -> FaucetResult<u64>;

    /// Current suggested gas price in wei.
    async fn gas_price(&self) -> FaucetResult<u128>;

    /// Gas estimate for a plain value transfer from `from` to `to`.
    async fn estimate_gas(&self, from: Address, to: Address, value: u128) -> FaucetResult<u64>;

    /// Submit a signed, hex-armored raw transaction. Returns the tx hash
    /// reported by the node. Idempotency is not guaranteed by the node.
    async fn send_raw_transaction(&self, raw_tx: &str) -> FaucetResult<Hash>;

    /// Current balance of an account in wei.
    async fn balance(&self, account: Address) -> FaucetResult<u128>;

    /// Network chain id, used for replay protection.
    async fn chain_id(&self) -> FaucetResult<u64>;
}

/// JSON-RPC client for a remote ledger node.
///
/// Every call is bounded by the configured timeout, applied per request
/// by the underlying HTTP client, so a hung node call fails only the
/// request that made it.
pub struct HttpLedgerClient {
    rpc_url: String,
    client: reqwest::Client,
}

impl HttpLedgerClient {
    pub fn new(rpc_url: String, timeout: Duration) -> FaucetResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FaucetError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self { rpc_url, client })
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> FaucetResult<serde_json::Value> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FaucetError::Rpc(format!("{} request failed: {}", method, e)))?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FaucetError::Rpc(format!("{} returned invalid response: {}", method, e)))?;

        if let Some(error) = json.get("error") {
            return Err(FaucetError::Rpc(format!("{} rejected: {}", method, error)));
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| FaucetError::Rpc(format!("{} returned no result", method)))
    }

    async fn call_quantity_u64(&self, method: &str, params: serde_json::Value) -> FaucetResult<u64> {
        let result = self.call(method, params).await?;
        parse_quantity(&result, method).and_then(|v| {
            u64::try_from(v).map_err(|_| {
                FaucetError::Rpc(format!("{} quantity out of u64 range", method))
            })
        })
    }

    async fn call_quantity_u128(&self, method: &str, params: serde_json::Value) -> FaucetResult<u128> {
        let result = self.call(method, params).await?;
        parse_quantity(&result, method)
    }
}

/// Decode a JSON-RPC hex quantity (`"0x..."`) into an integer.
fn parse_quantity(value: &serde_json::Value, method: &str) -> FaucetResult<u128> {
    let s = value
        .as_str()
        .ok_or_else(|| FaucetError::Rpc(format!("{} returned non-string quantity", method)))?;
    let hex_part = s.strip_prefix("0x").unwrap_or(s);
    u128::from_str_radix(hex_part, 16)
        .map_err(|e| FaucetError::Rpc(format!("{} returned bad quantity {:?}: {}", method, s, e)))
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn pending_nonce(&self, account: Address) -> FaucetResult<u64> {
        self.call_quantity_u64(
            "eth_getTransactionCount",
            serde_json::json!([account.to_string(), "pending"]),
        )
        .await
        .map_err(|e| FaucetError::NonceFetch(e.to_string()))
    }

    async fn gas_price(&self) -> FaucetResult<u128> {
        self.call_quantity_u128("eth_gasPrice", serde_json::json!([]))
            .await
            .map_err(|e| FaucetError::GasPriceFetch(e.to_string()))
    }

    async fn estimate_gas(&self, from: Address, to: Address, value: u128) -> FaucetResult<u64> {
        self.call_quantity_u64(
            "eth_estimateGas",
            serde_json::json!([{
                "from": from.to_string(),
                "to": to.to_string(),
                "value": format!("{:#x}", value),
            }]),
        )
        .await
        .map_err(|e| FaucetError::GasEstimate(e.to_string()))
    }

    async fn send_raw_transaction(&self, raw_tx: &str) -> FaucetResult<Hash> {
        let result = self
            .call("eth_sendRawTransaction", serde_json::json!([raw_tx]))
            .await
            .map_err(|e| FaucetError::Submission(e.to_string()))?;

        let hash_str = result.as_str().ok_or_else(|| {
            FaucetError::Submission("node returned non-string tx hash".to_string())
        })?;

        hash_str
            .parse()
            .map_err(|e| FaucetError::Submission(format!("bad tx hash from node: {}", e)))
    }

    async fn balance(&self, account: Address) -> FaucetResult<u128> {
        self.call_quantity_u128(
            "eth_getBalance",
            serde_json::json!([account.to_string(), "latest"]),
        )
        .await
        .map_err(|e| FaucetError::BalanceQuery(e.to_string()))
    }

    async fn chain_id(&self) -> FaucetResult<u64> {
        self.call_quantity_u64("eth_chainId", serde_json::json!([])).await
    }
}
