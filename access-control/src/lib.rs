//! Access-control policy components for the token ledger
//!
//! Four independent policy tables, each owned here and consulted (never
//! mutated) by the ledger core:
//!
//! - **Membership filter**: no-filter / blacklist / whitelist gate on
//!   transfer eligibility
//! - **Operator registry**: who may move tokens on a holder's behalf
//! - **Role delegation**: exclusive owner-or-delegate capability slots
//! - **Emergency switch**: global kill-switch halting value movement

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod delegation;
pub mod emergency;
pub mod error;
pub mod membership;
pub mod operators;
pub mod types;

// Re-exports
pub use delegation::{CapabilitySlot, RoleDelegation};
pub use emergency::EmergencySwitch;
pub use error::{AccessError, Result};
pub use membership::MembershipFilter;
pub use operators::OperatorRegistry;
pub use types::{Address, FilterMode};
