//! Disbursement engine
//!
//! Owns the cooldown table and the account identity, and runs the
//! eligibility check -> build -> sign -> submit -> record pipeline for
//! each request. The whole pipeline runs under a single submit lock,
//! which serializes nonce assignment for the faucet account and closes
//! the window in which two requests for the same address could both
//! pass the eligibility check.

use crate::config::FaucetConfig;
use crate::cooldown::CooldownTable;
use crate::error::{FaucetError, FaucetResult};
use crate::rpc::LedgerClient;
use crate::signer::{FaucetSigner, TransferTx};
use crate::types::{Address, Hash};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Faucet service
pub struct FaucetService {
    ledger: Arc<dyn LedgerClient>,
    signer: FaucetSigner,
    chain_id: u64,
    amount_wei: u128,
    cooldowns: CooldownTable,
    /// Serializes check-build-sign-submit-record. Guarantees distinct
    /// nonces across concurrent requests and at most one disbursement
    /// per address per cooldown window.
    submit_lock: Mutex<()>,
}

impl FaucetService {
    /// Assemble the engine: decode and validate the signing credential,
    /// derive the faucet address, and fetch the chain id from the node.
    /// Any failure here is startup-fatal.
    pub async fn init(config: &FaucetConfig, ledger: Arc<dyn LedgerClient>) -> FaucetResult<Self> {
        let signer = FaucetSigner::from_hex(&config.private_key)?;

        let chain_id = ledger
            .chain_id()
            .await
            .map_err(|e| FaucetError::Config(format!("failed to fetch chain id: {}", e)))?;

        info!("Faucet address: {}", signer.address());
        info!("Chain id: {}", chain_id);

        Ok(Self {
            ledger,
            signer,
            chain_id,
            amount_wei: config.amount_wei,
            cooldowns: CooldownTable::new(config.cooldown),
            submit_lock: Mutex::new(()),
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn amount_wei(&self) -> u128 {
        self.amount_wei
    }

    /// Dispense the configured amount to `address`.
    ///
    /// Exactly one chain mutation on success; none on any failure path.
    /// The cooldown table is updated only after the node has accepted
    /// the transaction, so a failed submission may be retried at once.
    pub async fn dispense(&self, address: &str) -> FaucetResult<DispenseReceipt> {
        let to = self.parse_recipient(address)?;

        let _guard = self.submit_lock.lock().await;

        if let Err(remaining) = self.cooldowns.check(&to, Instant::now()) {
            debug!("Cooldown active for {}: {:?} remaining", to, remaining);
            return Err(FaucetError::CooldownActive { remaining });
        }

        let from = self.signer.address();

        let nonce = self.ledger.pending_nonce(from).await?;
        let gas_price = self.ledger.gas_price().await?;
        let gas_limit = self.ledger.estimate_gas(from, to, self.amount_wei).await?;

        let tx = TransferTx {
            nonce,
            to,
            value: self.amount_wei,
            gas_limit,
            gas_price,
            chain_id: self.chain_id,
        };

        let raw = self.signer.sign_transfer(&tx)?;
        let raw_hex = format!("0x{}", hex::encode(raw));

        let tx_hash = self.ledger.send_raw_transaction(&raw_hex).await?;

        self.cooldowns.record(to, Instant::now());

        info!(
            "Dispensed {} wei to {} (nonce {}, tx {})",
            self.amount_wei, to, nonce, tx_hash
        );

        Ok(DispenseReceipt {
            tx_hash,
            address: to,
            amount_wei: self.amount_wei,
        })
    }

    /// Current spendable balance of the faucet account.
    pub async fn faucet_balance(&self) -> FaucetResult<u128> {
        self.ledger.balance(self.signer.address()).await
    }

    /// Snapshot for the status endpoint.
    pub async fn status(&self) -> FaucetResult<FaucetStatus> {
        let balance = self.faucet_balance().await?;
        Ok(FaucetStatus {
            address: self.signer.address(),
            balance_wei: balance.to_string(),
            amount_wei: self.amount_wei.to_string(),
            cooldown_secs: self.cooldowns.cooldown().as_secs(),
            tracked_addresses: self.cooldowns.len(),
        })
    }

    /// Drop cooldown entries that can no longer affect eligibility.
    pub fn prune_cooldowns(&self) -> usize {
        let dropped = self.cooldowns.prune(Instant::now());
        if dropped > 0 {
            info!("Pruned {} expired cooldown entries", dropped);
        }
        dropped
    }

    /// Syntactic validation of the recipient. Runs before any ledger
    /// call; rejects the zero address and the faucet's own address.
    fn parse_recipient(&self, address: &str) -> FaucetResult<Address> {
        let to: Address = address
            .parse()
            .map_err(FaucetError::InvalidAddress)?;

        if to.is_zero() {
            return Err(FaucetError::InvalidAddress(
                "zero address not allowed".to_string(),
            ));
        }
        if to == self.signer.address() {
            warn!("Refusing to dispense to the faucet's own address");
            return Err(FaucetError::InvalidAddress(
                "cannot send to the faucet address".to_string(),
            ));
        }

        Ok(to)
    }
}

/// Successful disbursement receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispenseReceipt {
    pub tx_hash: Hash,
    pub address: Address,
    pub amount_wei: u128,
}

/// Faucet status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetStatus {
    pub address: Address,
    pub balance_wei: String,
    pub amount_wei: String,
    pub cooldown_secs: u64,
    pub tracked_addresses: usize,
}
