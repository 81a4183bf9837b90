//! Error types for access-control checks

use crate::types::Address;
use thiserror::Error;

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, AccessError>;

/// Access-control errors
///
/// Every variant is recoverable: the gated operation reverts and the caller
/// may retry after the policy state changes (e.g. after being allow-listed).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Caller does not hold the required capability
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Listing operation attempted while the filter mode is NoFilter
    #[error("Invalid mode: listing requires blacklist or whitelist mode")]
    InvalidMode,

    /// Holder attempted to authorize itself as an operator
    #[error("Self operator: an address is always its own operator")]
    SelfOperator,

    /// Holder attempted to revoke itself as an operator
    #[error("Self revoke: an address cannot revoke itself")]
    SelfRevoke,

    /// Caller is not an operator for the holder
    #[error("Not an operator for holder {0}")]
    NotAnOperator(Address),

    /// Address is barred from sending under the current filter mode
    #[error("Address {0} is not allowed to send")]
    NotAllowedToSend(Address),

    /// Trading is halted by the emergency switch
    #[error("Trading halted")]
    TradingHalted,
}
