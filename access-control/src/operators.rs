//! Operator registry: who may move tokens on a holder's behalf
//!
//! The effective operator set for a holder is: the holder itself, plus the
//! default operators fixed at issuance minus the holder's revocations, plus
//! the holder's own authorizations.

use crate::error::{AccessError, Result};
use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Operator registry state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorRegistry {
    default_operators: HashSet<Address>,
    authorized: HashMap<Address, HashSet<Address>>,
    revoked_defaults: HashMap<Address, HashSet<Address>>,
}

impl OperatorRegistry {
    /// Create at issuance with the immutable default operator list
    pub fn new(default_operators: impl IntoIterator<Item = Address>) -> Self {
        Self {
            default_operators: default_operators.into_iter().collect(),
            authorized: HashMap::new(),
            revoked_defaults: HashMap::new(),
        }
    }

    /// Default operators granted at issuance
    pub fn default_operators(&self) -> impl Iterator<Item = &Address> {
        self.default_operators.iter()
    }

    /// True iff `operator` may act for `holder`
    pub fn is_operator_for(&self, operator: &Address, holder: &Address) -> bool {
        if operator == holder {
            return true;
        }
        if self
            .authorized
            .get(holder)
            .map(|set| set.contains(operator))
            .unwrap_or(false)
        {
            return true;
        }
        self.default_operators.contains(operator)
            && !self
                .revoked_defaults
                .get(holder)
                .map(|set| set.contains(operator))
                .unwrap_or(false)
    }

    /// Authorize `operator` for the caller's holdings
    ///
    /// Re-authorizing a previously revoked default operator restores it.
    pub fn authorize_operator(&mut self, caller: &Address, operator: Address) -> Result<()> {
        if &operator == caller {
            return Err(AccessError::SelfOperator);
        }
        if let Some(revoked) = self.revoked_defaults.get_mut(caller) {
            revoked.remove(&operator);
        }
        if !self.default_operators.contains(&operator) {
            self.authorized
                .entry(caller.clone())
                .or_default()
                .insert(operator.clone());
        }
        tracing::debug!(holder = %caller, %operator, "Operator authorized");
        Ok(())
    }

    /// Revoke `operator` for the caller's holdings
    pub fn revoke_operator(&mut self, caller: &Address, operator: Address) -> Result<()> {
        if &operator == caller {
            return Err(AccessError::SelfRevoke);
        }
        if let Some(set) = self.authorized.get_mut(caller) {
            set.remove(&operator);
        }
        if self.default_operators.contains(&operator) {
            self.revoked_defaults
                .entry(caller.clone())
                .or_default()
                .insert(operator.clone());
        }
        tracing::debug!(holder = %caller, %operator, "Operator revoked");
        Ok(())
    }

    /// Gate check used by operator-initiated ledger operations
    pub fn require_operator_for(&self, operator: &Address, holder: &Address) -> Result<()> {
        if self.is_operator_for(operator, holder) {
            Ok(())
        } else {
            Err(AccessError::NotAnOperator(holder.clone()))
        }
    }
}
