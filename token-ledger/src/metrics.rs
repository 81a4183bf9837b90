//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `ledger_ops_total` - Total number of committed operations
//! - `ledger_reverts_total` - Total number of reverted operations
//! - `ledger_events_total` - Total number of events emitted
//! - `ledger_total_supply` - Current total supply

use prometheus::{IntCounter, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Total committed operations
    pub ops_total: IntCounter,

    /// Total reverted operations
    pub reverts_total: IntCounter,

    /// Total events emitted
    pub events_total: IntCounter,

    /// Current total supply (saturates at i64::MAX)
    pub total_supply: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let ops_total = IntCounter::with_opts(Opts::new(
            "ledger_ops_total",
            "Total number of committed operations",
        ))?;
        registry.register(Box::new(ops_total.clone()))?;

        let reverts_total = IntCounter::with_opts(Opts::new(
            "ledger_reverts_total",
            "Total number of reverted operations",
        ))?;
        registry.register(Box::new(reverts_total.clone()))?;

        let events_total = IntCounter::with_opts(Opts::new(
            "ledger_events_total",
            "Total number of events emitted",
        ))?;
        registry.register(Box::new(events_total.clone()))?;

        let total_supply = IntGauge::with_opts(Opts::new(
            "ledger_total_supply",
            "Current total supply",
        ))?;
        registry.register(Box::new(total_supply.clone()))?;

        Ok(Self {
            ops_total,
            reverts_total,
            events_total,
            total_supply,
            registry,
        })
    }

    /// Record a committed operation
    pub fn record_commit(&self, events: usize, total_supply: u128) {
        self.ops_total.inc();
        self.events_total.inc_by(events as u64);
        self.total_supply
            .set(total_supply.min(i64::MAX as u128) as i64);
    }

    /// Record a reverted operation
    pub fn record_revert(&self) {
        self.reverts_total.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
