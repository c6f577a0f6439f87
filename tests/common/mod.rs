//! Shared test fixtures: a mock ledger client with failure injection

use async_trait::async_trait;
use drip::{Address, FaucetConfig, FaucetError, FaucetResult, FaucetService, Hash, LedgerClient};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Private key 0x...01; derived faucet address
/// 0x7e5f4552091a69125d5dfcb7b8c2659029395bdf.
pub const TEST_KEY: &str = "0000000000000000000000000000000000000000000000000000000000000001";
pub const TEST_CHAIN_ID: u64 = 1337;

/// In-memory ledger double. Hands out a monotonically increasing pending
/// nonce that only advances when a transaction is accepted, and records
/// every accepted raw transaction.
#[derive(Default)]
pub struct MockLedger {
    nonce: AtomicU64,
    submitted: Mutex<Vec<Vec<u8>>>,
    calls: AtomicU64,
    pub fail_nonce: AtomicBool,
    pub fail_gas_price: AtomicBool,
    pub fail_estimate: AtomicBool,
    pub fail_submit: AtomicBool,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Raw transactions the node has accepted.
    pub fn submitted(&self) -> Vec<Vec<u8>> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    /// Total ledger calls of any kind.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn pending_nonce(&self, _account: Address) -> FaucetResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_nonce.load(Ordering::SeqCst) {
            return Err(FaucetError::NonceFetch("node unavailable".to_string()));
        }
        Ok(self.nonce.load(Ordering::SeqCst))
    }

    async fn gas_price(&self) -> FaucetResult<u128> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_gas_price.load(Ordering::SeqCst) {
            return Err(FaucetError::GasPriceFetch("node unavailable".to_string()));
        }
        Ok(1_000_000_000)
    }

    async fn estimate_gas(&self, _from: Address, _to: Address, _value: u128) -> FaucetResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_estimate.load(Ordering::SeqCst) {
            return Err(FaucetError::GasEstimate("execution reverted".to_string()));
        }
        Ok(21_000)
    }

    async fn send_raw_transaction(&self, raw_tx: &str) -> FaucetResult<Hash> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(FaucetError::Submission("nonce too low".to_string()));
        }

        let bytes = hex::decode(raw_tx.trim_start_matches("0x"))
            .map_err(|e| FaucetError::Submission(format!("bad raw tx: {}", e)))?;

        let hash = Hash(keccak_hash::keccak(&bytes).0);
        self.submitted.lock().unwrap().push(bytes);
        self.nonce.fetch_add(1, Ordering::SeqCst);
        Ok(hash)
    }

    async fn balance(&self, _account: Address) -> FaucetResult<u128> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(10_000_000_000_000_000_000)
    }

    async fn chain_id(&self) -> FaucetResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TEST_CHAIN_ID)
    }
}

pub fn test_config(cooldown: Duration) -> FaucetConfig {
    FaucetConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        rpc_url: "http://localhost:8545".to_string(),
        private_key: TEST_KEY.to_string(),
        amount_wei: 1000,
        cooldown,
        rpc_timeout: Duration::from_secs(5),
        cors_enabled: false,
    }
}

pub async fn test_service(cooldown: Duration, ledger: Arc<MockLedger>) -> FaucetService {
    FaucetService::init(&test_config(cooldown), ledger)
        .await
        .expect("service init failed")
}
