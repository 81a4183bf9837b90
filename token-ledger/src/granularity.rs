//! Amount-granularity policy
//!
//! Every amount entering or leaving an account must be an exact multiple of
//! the unit fixed at issuance. The policy never mutates state; a violation
//! fails the caller's operation.

use crate::error::{Error, Result};
use crate::types::Amount;
use serde::{Deserialize, Serialize};

/// Minimum indivisible unit for balance changes, fixed at issuance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Granularity(Amount);

impl Granularity {
    /// Create a granularity; values below 1 are clamped to 1
    pub fn new(unit: Amount) -> Self {
        Self(unit.max(1))
    }

    /// The unit value
    pub fn unit(&self) -> Amount {
        self.0
    }

    /// Fail unless `amount` is an exact multiple of the unit
    pub fn check(&self, amount: Amount) -> Result<()> {
        if amount % self.0 == 0 {
            Ok(())
        } else {
            Err(Error::BadGranularity {
                amount,
                granularity: self.0,
            })
        }
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Self(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_granularity_accepts_everything() {
        let g = Granularity::new(1);
        assert!(g.check(0).is_ok());
        assert!(g.check(1).is_ok());
        assert!(g.check(u128::MAX).is_ok());
    }

    #[test]
    fn test_multiples_only() {
        let g = Granularity::new(100);
        assert!(g.check(0).is_ok());
        assert!(g.check(300).is_ok());
        assert!(matches!(
            g.check(150),
            Err(Error::BadGranularity {
                amount: 150,
                granularity: 100
            })
        ));
    }

    #[test]
    fn test_zero_unit_clamped() {
        assert_eq!(Granularity::new(0).unit(), 1);
    }
}
