//! Single-writer actor for the ledger
//!
//! One Tokio task owns the `TokenState` and the store; a cloneable
//! [`LedgerHandle`] sends messages over a bounded mpsc channel with oneshot
//! responses. Operations are therefore applied whole, in submission order,
//! with no interleaving — the serially-ordered state machine the ledger
//! semantics require.

use crate::{
    error::{Error, Result},
    events::{EventRecord, TokenEvent},
    metrics::Metrics,
    state::TokenState,
    storage::Store,
    types::{Address, Amount, FilterMode},
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// A mutating ledger operation, tagged with everything but the caller
#[derive(Debug, Clone)]
pub enum LedgerCommand {
    /// Mint to a holder
    Fund {
        /// Recipient
        to: Address,
        /// Amount to mint
        amount: Amount,
    },
    /// Destroy the caller's own tokens
    Defund {
        /// Amount to destroy
        amount: Amount,
    },
    /// Destroy the caller's own tokens with attached data
    Burn {
        /// Amount to destroy
        amount: Amount,
        /// Caller-supplied data
        data: Vec<u8>,
    },
    /// Destroy a holder's tokens as an operator
    OperatorBurn {
        /// Holder whose tokens are destroyed
        holder: Address,
        /// Amount to destroy
        amount: Amount,
        /// Holder-attributed data
        data: Vec<u8>,
        /// Operator-attributed data
        operator_data: Vec<u8>,
    },
    /// Move the caller's tokens with attached data
    Send {
        /// Recipient
        to: Address,
        /// Amount to move
        amount: Amount,
        /// Caller-supplied data
        data: Vec<u8>,
    },
    /// Move the caller's tokens (no data)
    Transfer {
        /// Recipient
        to: Address,
        /// Amount to move
        amount: Amount,
    },
    /// Move a holder's tokens as an operator
    OperatorSend {
        /// Source holder
        holder: Address,
        /// Recipient
        to: Address,
        /// Amount to move
        amount: Amount,
        /// Holder-attributed data
        data: Vec<u8>,
        /// Operator-attributed data
        operator_data: Vec<u8>,
    },
    /// Set an allowance
    Approve {
        /// Approved spender
        spender: Address,
        /// Approved amount
        amount: Amount,
    },
    /// Raise an allowance
    IncreaseApproval {
        /// Approved spender
        spender: Address,
        /// Increment
        amount: Amount,
    },
    /// Lower an allowance, clamping at zero
    DecreaseApproval {
        /// Approved spender
        spender: Address,
        /// Decrement
        amount: Amount,
    },
    /// Spend an allowance
    TransferFrom {
        /// Source holder
        from: Address,
        /// Recipient
        to: Address,
        /// Amount to move
        amount: Amount,
    },
    /// Switch the membership filter mode
    SwitchListStatus {
        /// New mode
        mode: FilterMode,
    },
    /// Flag an address
    DenyAddress {
        /// Address to flag
        addr: Address,
    },
    /// Clear an address flag
    AllowAddress {
        /// Address to clear
        addr: Address,
    },
    /// Delegate list control
    SetListsController {
        /// Delegate
        delegate: Address,
    },
    /// Return list control to the owner
    RevokeListsController,
    /// Authorize an operator for the caller
    AuthorizeOperator {
        /// Operator to authorize
        operator: Address,
    },
    /// Revoke an operator for the caller
    RevokeOperator {
        /// Operator to revoke
        operator: Address,
    },
    /// Delegate the funding capability
    SetFundingDelegate {
        /// Delegate
        delegate: Address,
    },
    /// Return the funding capability to the owner
    RevokeFundingDelegate,
    /// Delegate the emergency capability
    SetEmergencyDelegate {
        /// Delegate
        delegate: Address,
    },
    /// Return the emergency capability to the owner
    RevokeEmergencyDelegate,
    /// Halt all value movement
    EmergencyStop,
    /// Resume value movement
    EmergencyStart,
}

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Execute a mutating command
    Execute {
        /// Submitting address
        caller: Address,
        /// The operation
        command: LedgerCommand,
        /// Emitted events on commit
        response: oneshot::Sender<Result<Vec<TokenEvent>>>,
    },

    /// Get a holder balance
    BalanceOf {
        /// Holder
        holder: Address,
        /// Balance (zero when unknown)
        response: oneshot::Sender<Amount>,
    },

    /// Get the total supply
    TotalSupply {
        /// Supply
        response: oneshot::Sender<Amount>,
    },

    /// Get a remaining allowance
    Allowance {
        /// Granting holder
        holder: Address,
        /// Spender
        spender: Address,
        /// Remaining amount
        response: oneshot::Sender<Amount>,
    },

    /// Membership eligibility query
    IsAllowedToSend {
        /// Queried address
        addr: Address,
        /// Eligibility
        response: oneshot::Sender<bool>,
    },

    /// Operator relationship query
    IsOperatorFor {
        /// Candidate operator
        operator: Address,
        /// Holder
        holder: Address,
        /// Relationship
        response: oneshot::Sender<bool>,
    },

    /// Trading status query
    TradingStatus {
        /// Current status
        response: oneshot::Sender<bool>,
    },

    /// Read a page of the persisted event log
    EventsFrom {
        /// First sequence number
        from_seq: u64,
        /// Page size
        limit: usize,
        /// Records in order
        response: oneshot::Sender<Result<Vec<EventRecord>>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns the ledger state
pub struct LedgerActor {
    state: TokenState,
    store: Arc<dyn Store>,
    metrics: Metrics,
    next_seq: u64,
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl LedgerActor {
    /// Create a new actor over loaded state
    pub fn new(
        state: TokenState,
        store: Arc<dyn Store>,
        metrics: Metrics,
        next_seq: u64,
        mailbox: mpsc::Receiver<LedgerMessage>,
    ) -> Self {
        Self {
            state,
            store,
            metrics,
            next_seq,
            mailbox,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown => break,
                _ => self.handle_message(msg),
            }
        }
        tracing::info!("Ledger actor stopped");
    }

    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::Execute {
                caller,
                command,
                response,
            } => {
                let result = self.execute(&caller, command);
                let _ = response.send(result);
            }

            LedgerMessage::BalanceOf { holder, response } => {
                let _ = response.send(self.state.balance_of(&holder));
            }

            LedgerMessage::TotalSupply { response } => {
                let _ = response.send(self.state.total_supply());
            }

            LedgerMessage::Allowance {
                holder,
                spender,
                response,
            } => {
                let _ = response.send(self.state.allowance(&holder, &spender));
            }

            LedgerMessage::IsAllowedToSend { addr, response } => {
                let _ = response.send(self.state.is_allowed_to_send(&addr));
            }

            LedgerMessage::IsOperatorFor {
                operator,
                holder,
                response,
            } => {
                let _ = response.send(self.state.is_operator_for(&operator, &holder));
            }

            LedgerMessage::TradingStatus { response } => {
                let _ = response.send(self.state.trading_enabled());
            }

            LedgerMessage::EventsFrom {
                from_seq,
                limit,
                response,
            } => {
                let _ = response.send(self.store.events_from(from_seq, limit));
            }

            LedgerMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }

    /// Apply a command against a working copy, persist, then swap it in
    ///
    /// A failure at any point — gate, mutation, or storage — leaves the
    /// live state untouched, so callers observe all-or-nothing semantics.
    fn execute(&mut self, caller: &Address, command: LedgerCommand) -> Result<Vec<TokenEvent>> {
        let mut next = self.state.clone();
        let events = match Self::dispatch(&mut next, caller, command) {
            Ok(events) => events,
            Err(e) => {
                self.metrics.record_revert();
                tracing::warn!(%caller, error = %e, "Operation reverted");
                return Err(e);
            }
        };

        let records: Vec<EventRecord> = events
            .iter()
            .enumerate()
            .map(|(i, event)| EventRecord::new(self.next_seq + i as u64, event.clone()))
            .collect();

        if let Err(e) = self.store.commit(&next, &records) {
            self.metrics.record_revert();
            tracing::error!(error = %e, "Commit failed, operation reverted");
            return Err(e);
        }

        self.next_seq += records.len() as u64;
        self.state = next;
        self.metrics.record_commit(records.len(), self.state.total_supply());
        Ok(events)
    }

    fn dispatch(
        state: &mut TokenState,
        caller: &Address,
        command: LedgerCommand,
    ) -> Result<Vec<TokenEvent>> {
        match command {
            LedgerCommand::Fund { to, amount } => state.fund(caller, &to, amount),
            LedgerCommand::Defund { amount } => state.defund(caller, amount),
            LedgerCommand::Burn { amount, data } => state.burn(caller, amount, data),
            LedgerCommand::OperatorBurn {
                holder,
                amount,
                data,
                operator_data,
            } => state.operator_burn(caller, &holder, amount, data, operator_data),
            LedgerCommand::Send { to, amount, data } => state.send(caller, &to, amount, data),
            LedgerCommand::Transfer { to, amount } => state.transfer(caller, &to, amount),
            LedgerCommand::OperatorSend {
                holder,
                to,
                amount,
                data,
                operator_data,
            } => state.operator_send(caller, &holder, &to, amount, data, operator_data),
            LedgerCommand::Approve { spender, amount } => state.approve(caller, &spender, amount),
            LedgerCommand::IncreaseApproval { spender, amount } => {
                state.increase_approval(caller, &spender, amount)
            }
            LedgerCommand::DecreaseApproval { spender, amount } => {
                state.decrease_approval(caller, &spender, amount)
            }
            LedgerCommand::TransferFrom { from, to, amount } => {
                state.transfer_from(caller, &from, &to, amount)
            }
            LedgerCommand::SwitchListStatus { mode } => state.switch_list_status(caller, mode),
            LedgerCommand::DenyAddress { addr } => state.deny_address(caller, &addr),
            LedgerCommand::AllowAddress { addr } => state.allow_address(caller, &addr),
            LedgerCommand::SetListsController { delegate } => {
                state.set_lists_controller(caller, &delegate)
            }
            LedgerCommand::RevokeListsController => state.revoke_lists_controller(caller),
            LedgerCommand::AuthorizeOperator { operator } => {
                state.authorize_operator(caller, &operator)
            }
            LedgerCommand::RevokeOperator { operator } => state.revoke_operator(caller, &operator),
            LedgerCommand::SetFundingDelegate { delegate } => {
                state.set_funding_delegate(caller, &delegate)
            }
            LedgerCommand::RevokeFundingDelegate => state.revoke_funding_delegate(caller),
            LedgerCommand::SetEmergencyDelegate { delegate } => {
                state.set_emergency_delegate(caller, &delegate)
            }
            LedgerCommand::RevokeEmergencyDelegate => state.revoke_emergency_delegate(caller),
            LedgerCommand::EmergencyStop => state.emergency_stop(caller),
            LedgerCommand::EmergencyStart => state.emergency_start(caller),
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    /// Execute a mutating command
    pub async fn execute(&self, caller: Address, command: LedgerCommand) -> Result<Vec<TokenEvent>> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::Execute {
            caller,
            command,
            response: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Get a holder balance
    pub async fn balance_of(&self, holder: Address) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::BalanceOf {
            holder,
            response: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Get the total supply
    pub async fn total_supply(&self) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::TotalSupply { response: tx }).await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Get a remaining allowance
    pub async fn allowance(&self, holder: Address, spender: Address) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::Allowance {
            holder,
            spender,
            response: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Membership eligibility query
    pub async fn is_allowed_to_send(&self, addr: Address) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::IsAllowedToSend { addr, response: tx })
            .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Operator relationship query
    pub async fn is_operator_for(&self, operator: Address, holder: Address) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::IsOperatorFor {
            operator,
            holder,
            response: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Trading status query
    pub async fn trading_status(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::TradingStatus { response: tx }).await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Read a page of the persisted event log
    pub async fn events_from(&self, from_seq: u64, limit: usize) -> Result<Vec<EventRecord>> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::EventsFrom {
            from_seq,
            limit,
            response: tx,
        })
        .await?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.send(LedgerMessage::Shutdown).await
    }

    async fn send(&self, msg: LedgerMessage) -> Result<()> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(
    state: TokenState,
    store: Arc<dyn Store>,
    metrics: Metrics,
    next_seq: u64,
) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(1000); // Bounded channel for backpressure
    let actor = LedgerActor::new(state, store, metrics, next_seq, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}
