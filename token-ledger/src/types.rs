//! Core types for the token ledger

use crate::error::{Error, Result};

pub use access_control::{Address, FilterMode};

/// Token amount (indivisible base units)
pub type Amount = u128;

/// Validate an address at the boundary
///
/// The zero/empty address is rejected by the platform edge, not by the
/// ledger state machine itself.
pub fn validate_address(addr: &Address) -> Result<()> {
    if addr.is_zero() {
        Err(Error::InvalidAddress(addr.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address() {
        assert!(validate_address(&Address::new("alice")).is_ok());
        assert!(validate_address(&Address::new("")).is_err());
        assert!(validate_address(&Address::new("0x0000")).is_err());
    }
}
