//! Execution modes and the strategies implementing them.
//!
//! Feature operations that mutate host state (for example registering a driven property) are
//! handed to an [`ApplyStrategy`] instead of being executed directly. The strategy is chosen
//! from [`ExecutionMode`] when the context is created:
//!
//! - [`ImmediateStrategy`] runs the operation right away
//! - [`DeferredStrategy`] queues it until the next [`crate::bridge::BridgeContext::tick`]

use std::{collections::VecDeque, fmt, sync::Mutex};

use log::debug;
use strum::Display;

use crate::{bridge::context::BridgeContext, host::Value, Result};

/// When state-changing operations reach the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExecutionMode {
    /// Apply on the calling thread, now
    #[default]
    Immediate,
    /// Apply on the next scheduling tick
    Deferred,
}

/// A host mutation waiting to be applied
pub type Operation = Box<dyn FnOnce(&BridgeContext) -> Result<Value> + Send>;

/// What happened to an operation handed to a strategy
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// Ran immediately and returned this value
    Now(Value),
    /// Queued for the next tick
    Queued,
}

impl Applied {
    /// The value of an immediately applied operation
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Applied::Now(value) => Some(value),
            Applied::Queued => None,
        }
    }
}

/// The outcome of one deferred operation, reported by a tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Label the operation was queued under
    pub label: String,
    /// What the operation returned
    pub result: Result<Value>,
}

/// Decides when operations run
pub trait ApplyStrategy: Send + Sync {
    /// The mode this strategy implements
    fn mode(&self) -> ExecutionMode;

    /// Runs or queues `op`.
    ///
    /// # Errors
    ///
    /// Returns the operation's error when it runs immediately.
    fn apply(&self, ctx: &BridgeContext, label: String, op: Operation) -> Result<Applied>;

    /// Takes every queued operation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the queue is poisoned.
    fn drain(&self) -> Result<Vec<(String, Operation)>>;

    /// Number of queued operations
    fn pending(&self) -> usize;
}

/// Runs every operation when it is applied
#[derive(Debug, Default)]
pub struct ImmediateStrategy;

impl ApplyStrategy for ImmediateStrategy {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Immediate
    }

    fn apply(&self, ctx: &BridgeContext, _label: String, op: Operation) -> Result<Applied> {
        op(ctx).map(Applied::Now)
    }

    fn drain(&self) -> Result<Vec<(String, Operation)>> {
        Ok(Vec::new())
    }

    fn pending(&self) -> usize {
        0
    }
}

/// Queues operations until the next tick
#[derive(Default)]
pub struct DeferredStrategy {
    queue: Mutex<VecDeque<(String, Operation)>>,
}

impl DeferredStrategy {
    /// Creates a strategy with an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for DeferredStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredStrategy")
            .field("pending", &self.pending())
            .finish()
    }
}

impl ApplyStrategy for DeferredStrategy {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Deferred
    }

    fn apply(&self, _ctx: &BridgeContext, label: String, op: Operation) -> Result<Applied> {
        debug!("deferring '{label}' to the next tick");
        lock!(self.queue)?.push_back((label, op));
        Ok(Applied::Queued)
    }

    fn drain(&self) -> Result<Vec<(String, Operation)>> {
        Ok(lock!(self.queue)?.drain(..).collect())
    }

    fn pending(&self) -> usize {
        self.queue.lock().map_or(0, |queue| queue.len())
    }
}

/// Creates the strategy for `mode`
#[must_use]
pub fn strategy_for(mode: ExecutionMode) -> Box<dyn ApplyStrategy> {
    match mode {
        ExecutionMode::Immediate => Box::new(ImmediateStrategy),
        ExecutionMode::Deferred => Box::new(DeferredStrategy::new()),
    }
}
