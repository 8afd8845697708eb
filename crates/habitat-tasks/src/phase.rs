//! Phases, phase outcomes, and the phase lookup table.
//!
//! A task configuration declares its phases as a small `Copy` enum and
//! registers one handler function per phase in a [`PhaseTable`]. Handlers
//! never write the current phase themselves: they return a
//! [`PhaseOutcome`] and the engine performs the transition.

use std::collections::BTreeMap;
use std::fmt;

use crate::context::TaskContext;
use crate::error::TaskError;

/// A named state of a task's state machine.
pub trait Phase: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Display name, also used in errors and logs.
    fn name(&self) -> &'static str;
}

/// What a phase handler did with the time it was offered.
///
/// Every variant carries the unconsumed remainder, which must lie in
/// `[0, offered]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseOutcome<P> {
    /// Stay in the current phase.
    Continue(f64),
    /// Move to another registered phase.
    TransitionTo(P, f64),
    /// End the task.
    Terminate(f64),
}

impl<P> PhaseOutcome<P> {
    /// The unconsumed remainder.
    pub const fn remaining(&self) -> f64 {
        match self {
            Self::Continue(r) | Self::TransitionTo(_, r) | Self::Terminate(r) => *r,
        }
    }
}

/// A phase handler: behavior state, task context, offered time.
pub type PhaseHandler<B, P> =
    fn(&mut B, &mut TaskContext<'_>, f64) -> Result<PhaseOutcome<P>, TaskError>;

/// Phase to handler lookup, built when the task is configured.
pub struct PhaseTable<B, P: Phase> {
    /// Registered handlers.
    handlers: BTreeMap<P, PhaseHandler<B, P>>,
}

impl<B, P: Phase> PhaseTable<B, P> {
    /// An empty table.
    pub const fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register (or replace) the handler for `phase`.
    pub fn register(&mut self, phase: P, handler: PhaseHandler<B, P>) {
        self.handlers.insert(phase, handler);
    }

    /// Builder-style [`Self::register`].
    #[must_use]
    pub fn with(mut self, phase: P, handler: PhaseHandler<B, P>) -> Self {
        self.register(phase, handler);
        self
    }

    /// Whether `phase` has a handler.
    pub fn contains(&self, phase: P) -> bool {
        self.handlers.contains_key(&phase)
    }

    /// The handler for `phase`.
    pub fn get(&self, phase: P) -> Option<PhaseHandler<B, P>> {
        self.handlers.get(&phase).copied()
    }

    /// Registered phases in order.
    pub fn phases(&self) -> impl Iterator<Item = P> + '_ {
        self.handlers.keys().copied()
    }

    /// Number of registered phases.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no phase is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<B, P: Phase> Default for PhaseTable<B, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, P: Phase> fmt::Debug for PhaseTable<B, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.keys().map(Phase::name))
            .finish()
    }
}
