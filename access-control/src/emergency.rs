//! Emergency circuit breaker
//!
//! A single trading-enabled flag. The ledger checks it first on every
//! value-moving operation; queries and admin operations are unaffected.
//! Toggling is gated by the emergency capability slot, checked by the
//! ledger before calling in here.

use crate::error::{AccessError, Result};
use serde::{Deserialize, Serialize};

/// Emergency switch state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencySwitch {
    trading_enabled: bool,
}

impl Default for EmergencySwitch {
    fn default() -> Self {
        // Trading is enabled at issuance
        Self {
            trading_enabled: true,
        }
    }
}

impl EmergencySwitch {
    /// Create with trading enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Current trading status
    pub fn trading_enabled(&self) -> bool {
        self.trading_enabled
    }

    /// Halt all value movement; returns the new status
    pub fn halt(&mut self) -> bool {
        tracing::warn!("Emergency stop: trading halted");
        self.trading_enabled = false;
        self.trading_enabled
    }

    /// Resume value movement; returns the new status
    pub fn resume(&mut self) -> bool {
        tracing::info!("Emergency start: trading resumed");
        self.trading_enabled = true;
        self.trading_enabled
    }

    /// Gate check used by every value-moving operation
    pub fn require_trading(&self) -> Result<()> {
        if self.trading_enabled {
            Ok(())
        } else {
            Err(AccessError::TradingHalted)
        }
    }
}
