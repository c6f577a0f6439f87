//! Per-address cooldown tracking
//!
//! In-memory table of last successful disbursement per address. Entries
//! are written only after a transaction has been accepted by the node.
//! State does not survive a restart; a fresh process forgets all
//! cooldowns. That is an accepted limitation of the service.

use crate::types::Address;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Table of last-disbursement timestamps, keyed by parsed address.
///
/// Reads are concurrent, writes exclusive. Callers pass `now` explicitly
/// so eligibility arithmetic is testable without a real clock.
pub struct CooldownTable {
    cooldown: Duration,
    entries: RwLock<HashMap<Address, Instant>>,
}

impl CooldownTable {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Check whether `address` is eligible at `now`. Returns the
    /// remaining wait on rejection. Never mutates the table.
    pub fn check(&self, address: &Address, now: Instant) -> Result<(), Duration> {
        let entries = self.entries.read().expect("cooldown table lock poisoned");
        match entries.get(address) {
            Some(&last_used) => {
                let elapsed = now.saturating_duration_since(last_used);
                if elapsed < self.cooldown {
                    Err(self.cooldown - elapsed)
                } else {
                    Ok(())
                }
            }
            None => Ok(()),
        }
    }

    /// Record a successful disbursement to `address` at `now`.
    pub fn record(&self, address: Address, now: Instant) {
        let mut entries = self.entries.write().expect("cooldown table lock poisoned");
        entries.insert(address, now);
    }

    pub fn last_used(&self, address: &Address) -> Option<Instant> {
        let entries = self.entries.read().expect("cooldown table lock poisoned");
        entries.get(address).copied()
    }

    /// Drop entries that expired more than one full cooldown ago. They
    /// can no longer affect eligibility, so removal keeps the table
    /// bounded without changing behavior.
    pub fn prune(&self, now: Instant) -> usize {
        let ttl = self.cooldown * 2;
        let mut entries = self.entries.write().expect("cooldown table lock poisoned");
        let before = entries.len();
        entries.retain(|_, &mut last_used| now.saturating_duration_since(last_used) < ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cooldown table lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
