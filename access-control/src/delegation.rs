//! Exclusive capability slots for administrative roles
//!
//! Each delegable capability is a single slot held by either the contract
//! owner or exactly one delegate. The "both authorized" state is
//! unrepresentable: setting a delegate removes the capability from the
//! owner until the slot is revoked.

use crate::error::{AccessError, Result};
use crate::types::Address;
use serde::{Deserialize, Serialize};

/// Holder of one administrative capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CapabilitySlot {
    /// Capability rests with the contract owner
    #[default]
    Owner,
    /// Capability is exclusively held by the delegate
    DelegatedTo(Address),
}

impl CapabilitySlot {
    /// True iff `caller` currently holds this capability
    pub fn authorizes(&self, caller: &Address, owner: &Address) -> bool {
        match self {
            CapabilitySlot::Owner => caller == owner,
            CapabilitySlot::DelegatedTo(delegate) => caller == delegate,
        }
    }

    /// True while a delegate holds the slot
    pub fn is_delegated(&self) -> bool {
        matches!(self, CapabilitySlot::DelegatedTo(_))
    }

    /// Current delegate, if any
    pub fn delegate(&self) -> Option<&Address> {
        match self {
            CapabilitySlot::Owner => None,
            CapabilitySlot::DelegatedTo(delegate) => Some(delegate),
        }
    }
}

/// The two independently delegable admin capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDelegation {
    owner: Address,
    funding: CapabilitySlot,
    emergency: CapabilitySlot,
}

impl RoleDelegation {
    /// Create at issuance; both capabilities rest with the owner
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            funding: CapabilitySlot::Owner,
            emergency: CapabilitySlot::Owner,
        }
    }

    /// Contract owner address
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Funding slot state
    pub fn funding(&self) -> &CapabilitySlot {
        &self.funding
    }

    /// Emergency slot state
    pub fn emergency(&self) -> &CapabilitySlot {
        &self.emergency
    }

    /// Delegate the funding capability; owner-only
    pub fn set_funding_delegate(&mut self, caller: &Address, delegate: Address) -> Result<()> {
        self.require_owner(caller)?;
        tracing::info!(%delegate, "Funding capability delegated");
        self.funding = CapabilitySlot::DelegatedTo(delegate);
        Ok(())
    }

    /// Return the funding capability to the owner; owner-only
    pub fn revoke_funding_delegate(&mut self, caller: &Address) -> Result<()> {
        self.require_owner(caller)?;
        self.funding = CapabilitySlot::Owner;
        Ok(())
    }

    /// Delegate the emergency capability; owner-only
    pub fn set_emergency_delegate(&mut self, caller: &Address, delegate: Address) -> Result<()> {
        self.require_owner(caller)?;
        tracing::info!(%delegate, "Emergency capability delegated");
        self.emergency = CapabilitySlot::DelegatedTo(delegate);
        Ok(())
    }

    /// Return the emergency capability to the owner; owner-only
    pub fn revoke_emergency_delegate(&mut self, caller: &Address) -> Result<()> {
        self.require_owner(caller)?;
        self.emergency = CapabilitySlot::Owner;
        Ok(())
    }

    /// Gate check for funding operations
    pub fn require_funding(&self, caller: &Address) -> Result<()> {
        if self.funding.authorizes(caller, &self.owner) {
            Ok(())
        } else {
            Err(AccessError::NotAuthorized(format!(
                "{} lacks the funding capability",
                caller
            )))
        }
    }

    /// Gate check for emergency-switch operations
    pub fn require_emergency(&self, caller: &Address) -> Result<()> {
        if self.emergency.authorizes(caller, &self.owner) {
            Ok(())
        } else {
            Err(AccessError::NotAuthorized(format!(
                "{} lacks the emergency capability",
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

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address::new("owner")
    }

    #[test]
    fn test_owner_holds_capabilities_by_default() {
        let roles = RoleDelegation::new(owner());
        assert!(roles.require_funding(&owner()).is_ok());
        assert!(roles.require_emergency(&owner()).is_ok());
        assert!(roles.require_funding(&Address::new("mallory")).is_err());
    }

    #[test]
    fn test_delegation_is_exclusive() {
        let mut roles = RoleDelegation::new(owner());
        let delegate = Address::new("treasurer");

        roles.set_funding_delegate(&owner(), delegate.clone()).unwrap();

        // Owner loses the capability while delegated
        assert!(roles.require_funding(&owner()).is_err());
        assert!(roles.require_funding(&delegate).is_ok());

        // Emergency slot is independent
        assert!(roles.require_emergency(&owner()).is_ok());
    }

    #[test]
    fn test_revoke_restores_owner() {
        let mut roles = RoleDelegation::new(owner());
        let delegate = Address::new("guardian");

        roles
            .set_emergency_delegate(&owner(), delegate.clone())
            .unwrap();
        roles.revoke_emergency_delegate(&owner()).unwrap();

        assert!(roles.require_emergency(&owner()).is_ok());
        assert!(roles.require_emergency(&delegate).is_err());
    }

    #[test]
    fn test_only_owner_sets_delegates() {
        let mut roles = RoleDelegation::new(owner());
        let mallory = Address::new("mallory");

        let err = roles
            .set_funding_delegate(&mallory, mallory.clone())
            .unwrap_err();
        assert!(matches!(err, AccessError::NotAuthorized(_)));

        // A delegate cannot revoke itself either; only the owner can
        roles
            .set_funding_delegate(&owner(), Address::new("treasurer"))
            .unwrap();
        let err = roles
            .revoke_funding_delegate(&Address::new("treasurer"))
            .unwrap_err();
        assert!(matches!(err, AccessError::NotAuthorized(_)));
    }
}
