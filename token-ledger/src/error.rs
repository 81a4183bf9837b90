//! Error types for the token ledger

use access_control::AccessError;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Amount is not a multiple of the issuance granularity
    #[error("Bad granularity: {amount} is not a multiple of {granularity}")]
    BadGranularity {
        /// Offending amount
        amount: u128,
        /// Issuance granularity
        granularity: u128,
    },

    /// Holder balance is too small for the operation
    #[error("Insufficient balance: needed {needed}, available {available}")]
    InsufficientBalance {
        /// Amount the operation requires
        needed: u128,
        /// Holder's current balance
        available: u128,
    },

    /// Spender allowance is too small for the transfer
    #[error("Insufficient allowance: needed {needed}, available {available}")]
    InsufficientAllowance {
        /// Amount the transfer requires
        needed: u128,
        /// Remaining approved amount
        available: u128,
    },

    /// The owner address is barred from holding tokens
    #[error("Owner cannot hold tokens")]
    OwnerCannotHold,

    /// The owner address is barred from burning tokens
    #[error("Owner cannot burn tokens")]
    OwnerCannotBurn,

    /// Arithmetic overflow on a balance, supply, or allowance update
    #[error("Amount overflow")]
    AmountOverflow,

    /// Address failed boundary validation (empty or zero)
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Access-control gate failure (authorization, membership, emergency)
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
