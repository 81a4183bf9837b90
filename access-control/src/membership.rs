//! Membership filter: blacklist/whitelist/no-filter gate on send eligibility
//!
//! The filter owns a per-address flag table and a global mode. Flags are
//! never cleared on a mode switch; the new mode reinterprets them.

use crate::delegation::CapabilitySlot;
use crate::error::{AccessError, Result};
use crate::types::{Address, FilterMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Membership filter state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipFilter {
    owner: Address,
    mode: FilterMode,
    flags: HashMap<Address, bool>,
    controller: CapabilitySlot,
}

impl MembershipFilter {
    /// Create at issuance with filtering disabled
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            mode: FilterMode::NoFilter,
            flags: HashMap::new(),
            controller: CapabilitySlot::Owner,
        }
    }

    /// Current filter mode
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// True while a lists controller is delegated
    pub fn controller_delegated(&self) -> bool {
        self.controller.is_delegated()
    }

    /// Current lists controller, if delegated
    pub fn controller(&self) -> Option<&Address> {
        self.controller.delegate()
    }

    /// Switch filter mode; lists-controller gated
    ///
    /// Existing flags are kept and reinterpreted under the new mode.
    pub fn switch_mode(&mut self, caller: &Address, mode: FilterMode) -> Result<()> {
        self.require_controller(caller)?;
        tracing::info!(%mode, "Membership filter mode switched");
        self.mode = mode;
        Ok(())
    }

    /// Set the address flag; lists-controller gated, undefined in NoFilter mode
    pub fn deny_address(&mut self, caller: &Address, addr: Address) -> Result<()> {
        self.require_controller(caller)?;
        self.require_listing_mode()?;
        self.set_flag(addr, true);
        Ok(())
    }

    /// Clear the address flag; lists-controller gated, undefined in NoFilter mode
    pub fn allow_address(&mut self, caller: &Address, addr: Address) -> Result<()> {
        self.require_controller(caller)?;
        self.require_listing_mode()?;
        self.set_flag(addr, false);
        Ok(())
    }

    fn set_flag(&mut self, addr: Address, flagged: bool) {
        tracing::debug!(%addr, flagged, mode = %self.mode, "Membership flag updated");
        self.flags.insert(addr, flagged);
    }

    /// Delegate list control to a single address; owner-only
    ///
    /// While delegated, the owner loses its listing exemption and may not be
    /// a transfer counterparty.
    pub fn set_controller(&mut self, caller: &Address, delegate: Address) -> Result<()> {
        self.require_owner(caller)?;
        tracing::info!(%delegate, "Lists controller delegated");
        self.controller = CapabilitySlot::DelegatedTo(delegate);
        Ok(())
    }

    /// Return list control to the owner; owner-only
    pub fn revoke_controller(&mut self, caller: &Address) -> Result<()> {
        self.require_owner(caller)?;
        self.controller = CapabilitySlot::Owner;
        Ok(())
    }

    /// Pure query: is `addr` eligible to send under the current mode?
    pub fn is_allowed_to_send(&self, addr: &Address) -> bool {
        if addr == &self.owner && self.controller.is_delegated() {
            return false;
        }
        let flagged = self.flags.get(addr).copied().unwrap_or(false);
        match self.mode {
            FilterMode::NoFilter => true,
            FilterMode::Blacklist => !flagged,
            FilterMode::Whitelist => flagged,
        }
    }

    /// Gate check used by the ledger's value path
    pub fn require_allowed_to_send(&self, addr: &Address) -> Result<()> {
        if self.is_allowed_to_send(addr) {
            Ok(())
        } else {
            Err(AccessError::NotAllowedToSend(addr.clone()))
        }
    }

    fn require_listing_mode(&self) -> Result<()> {
        if self.mode == FilterMode::NoFilter {
            Err(AccessError::InvalidMode)
        } else {
            Ok(())
        }
    }

    fn require_controller(&self, caller: &Address) -> Result<()> {
        if self.controller.authorizes(caller, &self.owner) {
            Ok(())
        } else {
            Err(AccessError::NotAuthorized(format!(
                "{} is not the lists controller",
                caller
            )))
        }
    }

    fn require_owner(&self, caller: &Address) -> Result<()> {
        if caller == &self.owner {
            Ok(())
        } else {
            Err(AccessError::NotAuthorized(format!(
                "{} is not the contract owner",
                caller
            )))
        }
    }
}
