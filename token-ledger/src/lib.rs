//! Token ledger with membership-based permissioning
//!
//! Regulated token ledger: balances and total supply guarded by a
//! membership filter, an operator registry, exclusive capability
//! delegation, and an emergency trading switch.
//!
//! # Architecture
//!
//! - **Serial ordering**: One single-writer actor applies operations whole,
//!   in submission order
//! - **Revert on violation**: Every gate runs before any mutation; a failed
//!   operation leaves no trace
//! - **Event log**: Committed operations append to a durable, sequenced log
//!
//! # Invariants
//!
//! - Supply conservation: Σ(balances) == total_supply at all times
//! - The owner address never holds a balance
//! - A delegated capability is never simultaneously usable by the owner

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod config;
pub mod error;
pub mod events;
pub mod granularity;
pub mod ledger;
pub mod metrics;
pub mod state;
pub mod storage;
pub mod types;

// Re-exports
pub use actor::{LedgerCommand, LedgerHandle};
pub use config::Config;
pub use error::{Error, Result};
pub use events::{EventRecord, Role, TokenEvent};
pub use granularity::Granularity;
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use state::TokenState;
pub use storage::{MemStore, RocksStore, Store};
pub use types::{Address, Amount, FilterMode};
