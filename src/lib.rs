//! `drip` — rate-limited native-asset faucet service
//!
//! Dispenses a fixed amount of the chain's native asset to a requested
//! address, enforcing a per-address cooldown. Disbursements are fully
//! serialized through a single submit pipeline so nonces stay unique
//! and no address can be paid twice within one cooldown window.

pub mod api;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod rpc;
pub mod service;
pub mod signer;
pub mod types;

pub use config::FaucetConfig;
pub use error::{FaucetError, FaucetResult};
pub use rpc::{HttpLedgerClient, LedgerClient};
pub use service::{DispenseReceipt, FaucetService, FaucetStatus};
pub use types::{Address, Hash};
