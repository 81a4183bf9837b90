//! Domain events emitted by committed ledger operations
//!
//! Mutating operations return their events explicitly alongside the result;
//! there is no hidden global log. Committed events are additionally
//! persisted to an append-only event log as `EventRecord`s.

use crate::types::{Address, Amount, FilterMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delegable admin role, named in delegation events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Funding (mint) authority
    Funding,
    /// Emergency-stop authority
    Emergency,
}

/// Domain event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    /// Tokens minted to a holder
    Fund {
        /// Recipient
        to: Address,
        /// Minted amount
        amount: Amount,
        /// Recipient balance after the mint
        balance: Amount,
    },

    /// Tokens destroyed by their holder
    Defund {
        /// Holder whose balance decreased
        holder: Address,
        /// Destroyed amount
        amount: Amount,
        /// Holder balance after the burn
        balance: Amount,
    },

    /// Tokens burned with attached data (holder- or operator-initiated)
    Burned {
        /// Acting operator, when operator-initiated
        operator: Option<Address>,
        /// Holder whose balance decreased
        holder: Address,
        /// Burned amount
        amount: Amount,
        /// Holder-attributed data
        data: Vec<u8>,
        /// Operator-attributed data; empty for holder-initiated burns
        operator_data: Vec<u8>,
    },

    /// Tokens moved between holders
    Sent {
        /// Acting operator, when operator-initiated
        operator: Option<Address>,
        /// Source holder
        from: Address,
        /// Recipient
        to: Address,
        /// Moved amount
        amount: Amount,
        /// Holder-attributed data
        data: Vec<u8>,
        /// Operator-attributed data; empty for holder-initiated moves
        operator_data: Vec<u8>,
    },

    /// Allowance set or adjusted
    Approval {
        /// Token holder granting the allowance
        owner: Address,
        /// Approved spender
        spender: Address,
        /// Remaining approved amount
        amount: Amount,
    },

    /// Operator authorized for a holder
    AuthorizedOperator {
        /// Authorized operator
        operator: Address,
        /// Holder granting authority
        holder: Address,
    },

    /// Operator revoked for a holder
    RevokedOperator {
        /// Revoked operator
        operator: Address,
        /// Holder revoking authority
        holder: Address,
    },

    /// Address flagged in the membership table
    Denied {
        /// Flagged address
        who: Address,
        /// Resulting flag value (always `true` for a deny)
        status: bool,
    },

    /// Address flag cleared in the membership table
    Allowed {
        /// Cleared address
        who: Address,
        /// Resulting flag value (always `false` for an allow)
        status: bool,
    },

    /// Membership filter mode switched
    SwitchListStatus {
        /// New mode
        status: FilterMode,
    },

    /// Emergency switch toggled
    Switch {
        /// New trading status
        trading_enabled: bool,
    },

    /// Lists-controller delegation changed; `None` on revocation
    ListDelegation {
        /// New controller, if delegated
        member: Option<Address>,
    },

    /// Admin role delegation changed; `None` on revocation
    RoleDelegation {
        /// Which capability slot changed
        role: Role,
        /// New delegate, if delegated
        delegate: Option<Address>,
    },
}

/// Persisted event-log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Monotonic sequence number within the ledger
    pub seq: u64,

    /// Commit timestamp
    pub recorded_at: DateTime<Utc>,

    /// The domain event
    pub event: TokenEvent,
}

impl EventRecord {
    /// Wrap a committed event for the log
    pub fn new(seq: u64, event: TokenEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            seq,
            recorded_at: Utc::now(),
            event,
        }
    }
}
