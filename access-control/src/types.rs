//! Core types shared by the policy tables

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger address (platform account identifier)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create new address without validation
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty address and the all-zero address forms
    ///
    /// Zero-address recipients are rejected at the boundary, not by the
    /// ledger state machine.
    pub fn is_zero(&self) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let digits = self.0.strip_prefix("0x").unwrap_or(&self.0);
        !digits.is_empty() && digits.chars().all(|c| c == '0')
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Membership filter mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FilterMode {
    /// Every address may send
    NoFilter = 0,
    /// Every address may send unless flagged
    Blacklist = 1,
    /// Only flagged addresses may send
    Whitelist = 2,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterMode::NoFilter => "no-filter",
            FilterMode::Blacklist => "blacklist",
            FilterMode::Whitelist => "whitelist",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address_forms() {
        assert!(Address::new("").is_zero());
        assert!(Address::new("0x0").is_zero());
        assert!(Address::new("0x0000000000000000").is_zero());
        assert!(!Address::new("0x00a1").is_zero());
        assert!(!Address::new("alice").is_zero());
    }

    #[test]
    fn test_filter_mode_wire_values() {
        assert_eq!(FilterMode::NoFilter as u8, 0);
        assert_eq!(FilterMode::Blacklist as u8, 1);
        assert_eq!(FilterMode::Whitelist as u8, 2);
    }
}
