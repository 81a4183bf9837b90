//! Main ledger orchestration layer
//!
//! This module ties together state, storage, and actor components into a
//! high-level API for token operations. Every mutating method takes the
//! caller's address first; authorization is decided inside the state
//! machine, never here. This layer only validates addresses at the
//! boundary and routes messages to the single-writer actor.
//!
//! # Example
//!
//! ```no_run
//! use token_ledger::{Config, Ledger};
//!
//! #[tokio::main]
//! async fn main() -> token_ledger::Result<()> {
//!     let config = Config::default();
//!     let ledger = Ledger::open(config).await?;
//!
//!     let owner = ledger.owner().clone();
//!     ledger.fund(owner, "alice".into(), 100).await?;
//!
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_ledger_actor, LedgerCommand, LedgerHandle},
    events::{EventRecord, TokenEvent},
    granularity::Granularity,
    metrics::Metrics,
    state::TokenState,
    storage::{RocksStore, Store},
    types::{validate_address, Address, Amount, FilterMode},
    Config, Result,
};
use std::sync::Arc;

/// Main ledger interface
pub struct Ledger {
    /// Actor handle for async operations
    handle: LedgerHandle,

    /// Metrics collector
    metrics: Metrics,

    /// Owner the ledger state was issued with; a recovered snapshot wins
    /// over the configuration
    owner: Address,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open ledger with configuration
    ///
    /// Loads the persisted snapshot if one exists; otherwise issues a fresh
    /// ledger from the configuration (owner, granularity, default
    /// operators).
    pub async fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let store: Arc<dyn Store> = Arc::new(RocksStore::open(&config)?);
        Self::open_with_store(config, store)
    }

    /// Open ledger over an existing store
    ///
    /// Used by tests to run against [`MemStore`](crate::storage::MemStore).
    pub fn open_with_store(config: Config, store: Arc<dyn Store>) -> Result<Self> {
        let state = match store.load_state()? {
            Some(state) => {
                tracing::info!(
                    total_supply = %state.total_supply(),
                    "Recovered ledger snapshot"
                );
                if state.owner() != &config.owner {
                    tracing::warn!(
                        persisted = %state.owner(),
                        configured = %config.owner,
                        "Configured owner differs from the persisted ledger; the persisted owner stays in force"
                    );
                }
                state
            }
            None => {
                tracing::info!(owner = %config.owner, "Issuing new ledger");
                TokenState::issue(
                    config.owner.clone(),
                    Granularity::new(config.granularity),
                    config.default_operators.iter().cloned(),
                    config.fund_requires_membership,
                )
            }
        };
        let owner = state.owner().clone();

        let next_seq = match store.latest_seq()? {
            Some(seq) => seq + 1,
            None => 0,
        };

        let metrics = Metrics::new()
            .map_err(|e| crate::Error::Config(format!("Failed to create metrics: {}", e)))?;
        let handle = spawn_ledger_actor(state, store, metrics.clone(), next_seq);

        Ok(Self {
            handle,
            metrics,
            owner,
            config,
        })
    }

    /// Owner address the ledger was issued with
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration the ledger was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---- Value movement ----

    /// Mint `amount` to `to`
    pub async fn fund(&self, caller: Address, to: Address, amount: Amount) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&to)?;
        self.handle
            .execute(caller, LedgerCommand::Fund { to, amount })
            .await
    }

    /// Destroy `amount` of the caller's tokens
    pub async fn defund(&self, caller: Address, amount: Amount) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        self.handle
            .execute(caller, LedgerCommand::Defund { amount })
            .await
    }

    /// Destroy `amount` of the caller's tokens, with attached data
    pub async fn burn(
        &self,
        caller: Address,
        amount: Amount,
        data: Vec<u8>,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        self.handle
            .execute(caller, LedgerCommand::Burn { amount, data })
            .await
    }

    /// Destroy `amount` of `holder`'s tokens as an operator
    pub async fn operator_burn(
        &self,
        caller: Address,
        holder: Address,
        amount: Amount,
        data: Vec<u8>,
        operator_data: Vec<u8>,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&holder)?;
        self.handle
            .execute(
                caller,
                LedgerCommand::OperatorBurn {
                    holder,
                    amount,
                    data,
                    operator_data,
                },
            )
            .await
    }

    /// Move `amount` of the caller's tokens to `to`, with attached data
    pub async fn send(
        &self,
        caller: Address,
        to: Address,
        amount: Amount,
        data: Vec<u8>,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&to)?;
        self.handle
            .execute(caller, LedgerCommand::Send { to, amount, data })
            .await
    }

    /// Move `amount` of the caller's tokens to `to`
    pub async fn transfer(
        &self,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&to)?;
        self.handle
            .execute(caller, LedgerCommand::Transfer { to, amount })
            .await
    }

    /// Move `amount` of `holder`'s tokens to `to` as an operator
    pub async fn operator_send(
        &self,
        caller: Address,
        holder: Address,
        to: Address,
        amount: Amount,
        data: Vec<u8>,
        operator_data: Vec<u8>,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&holder)?;
        validate_address(&to)?;
        self.handle
            .execute(
                caller,
                LedgerCommand::OperatorSend {
                    holder,
                    to,
                    amount,
                    data,
                    operator_data,
                },
            )
            .await
    }

    // ---- Allowances ----

    /// Set `spender`'s allowance over the caller's tokens to `amount`
    pub async fn approve(
        &self,
        caller: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&spender)?;
        self.handle
            .execute(caller, LedgerCommand::Approve { spender, amount })
            .await
    }

    /// Raise `spender`'s allowance by `amount`
    pub async fn increase_approval(
        &self,
        caller: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&spender)?;
        self.handle
            .execute(caller, LedgerCommand::IncreaseApproval { spender, amount })
            .await
    }

    /// Lower `spender`'s allowance by `amount`, clamping at zero
    pub async fn decrease_approval(
        &self,
        caller: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&spender)?;
        self.handle
            .execute(caller, LedgerCommand::DecreaseApproval { spender, amount })
            .await
    }

    /// Move `amount` from `from` to `to`, spending the caller's allowance
    pub async fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&from)?;
        validate_address(&to)?;
        self.handle
            .execute(caller, LedgerCommand::TransferFrom { from, to, amount })
            .await
    }

    // ---- Membership administration ----

    /// Switch the membership filter mode
    pub async fn switch_list_status(
        &self,
        caller: Address,
        mode: FilterMode,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        self.handle
            .execute(caller, LedgerCommand::SwitchListStatus { mode })
            .await
    }

    /// Flag `addr` on the active list
    pub async fn deny_address(&self, caller: Address, addr: Address) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&addr)?;
        self.handle
            .execute(caller, LedgerCommand::DenyAddress { addr })
            .await
    }

    /// Clear `addr`'s flag on the active list
    pub async fn allow_address(&self, caller: Address, addr: Address) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&addr)?;
        self.handle
            .execute(caller, LedgerCommand::AllowAddress { addr })
            .await
    }

    /// Delegate list control to `delegate`
    pub async fn set_lists_controller(
        &self,
        caller: Address,
        delegate: Address,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&delegate)?;
        self.handle
            .execute(caller, LedgerCommand::SetListsController { delegate })
            .await
    }

    /// Return list control to the owner
    pub async fn revoke_lists_controller(&self, caller: Address) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        self.handle
            .execute(caller, LedgerCommand::RevokeListsController)
            .await
    }

    // ---- Operator administration ----

    /// Authorize `operator` to act for the caller
    pub async fn authorize_operator(
        &self,
        caller: Address,
        operator: Address,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&operator)?;
        self.handle
            .execute(caller, LedgerCommand::AuthorizeOperator { operator })
            .await
    }

    /// Revoke `operator`'s authority over the caller
    pub async fn revoke_operator(
        &self,
        caller: Address,
        operator: Address,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&operator)?;
        self.handle
            .execute(caller, LedgerCommand::RevokeOperator { operator })
            .await
    }

    // ---- Capability delegation ----

    /// Delegate the funding capability to `delegate`
    pub async fn set_funding_delegate(
        &self,
        caller: Address,
        delegate: Address,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&delegate)?;
        self.handle
            .execute(caller, LedgerCommand::SetFundingDelegate { delegate })
            .await
    }

    /// Return the funding capability to the owner
    pub async fn revoke_funding_delegate(&self, caller: Address) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        self.handle
            .execute(caller, LedgerCommand::RevokeFundingDelegate)
            .await
    }

    /// Delegate the emergency capability to `delegate`
    pub async fn set_emergency_delegate(
        &self,
        caller: Address,
        delegate: Address,
    ) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        validate_address(&delegate)?;
        self.handle
            .execute(caller, LedgerCommand::SetEmergencyDelegate { delegate })
            .await
    }

    /// Return the emergency capability to the owner
    pub async fn revoke_emergency_delegate(&self, caller: Address) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        self.handle
            .execute(caller, LedgerCommand::RevokeEmergencyDelegate)
            .await
    }

    // ---- Emergency switch ----

    /// Halt all value movement
    pub async fn emergency_stop(&self, caller: Address) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        self.handle
            .execute(caller, LedgerCommand::EmergencyStop)
            .await
    }

    /// Resume value movement
    pub async fn emergency_start(&self, caller: Address) -> Result<Vec<TokenEvent>> {
        validate_address(&caller)?;
        self.handle
            .execute(caller, LedgerCommand::EmergencyStart)
            .await
    }

    // ---- Queries ----

    /// Balance of `holder` (zero when unknown)
    pub async fn balance_of(&self, holder: Address) -> Result<Amount> {
        self.handle.balance_of(holder).await
    }

    /// Total tokens in circulation
    pub async fn total_supply(&self) -> Result<Amount> {
        self.handle.total_supply().await
    }

    /// Remaining allowance granted by `holder` to `spender`
    pub async fn allowance(&self, holder: Address, spender: Address) -> Result<Amount> {
        self.handle.allowance(holder, spender).await
    }

    /// Whether `addr` passes the membership filter
    pub async fn is_allowed_to_send(&self, addr: Address) -> Result<bool> {
        self.handle.is_allowed_to_send(addr).await
    }

    /// Whether `operator` may act for `holder`
    pub async fn is_operator_for(&self, operator: Address, holder: Address) -> Result<bool> {
        self.handle.is_operator_for(operator, holder).await
    }

    /// Whether trading is currently enabled
    pub async fn trading_status(&self) -> Result<bool> {
        self.handle.trading_status().await
    }

    /// Read up to `limit` persisted events starting at `from_seq`
    pub async fn events_from(&self, from_seq: u64, limit: usize) -> Result<Vec<EventRecord>> {
        self.handle.events_from(from_seq, limit).await
    }

    /// Shutdown ledger
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }
}
