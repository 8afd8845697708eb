//! Settlement-wide exclusive flags.
//!
//! Some work may only be done by one agent at a time across the whole
//! settlement (for example reviewing job reassignments). A
//! [`SettlementFlag`] is raised through a [`FlagLease`], so however the
//! owning task ends the flag comes down with the lease.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use habitat_types::AgentId;
use tracing::debug;

use crate::lease::Lease;

/// A named settlement-wide flag.
#[derive(Debug)]
pub struct SettlementFlag {
    /// Flag name.
    name: String,
    /// Whether some agent currently holds the flag.
    raised: AtomicBool,
}

impl SettlementFlag {
    /// Create a lowered flag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raised: AtomicBool::new(false),
        }
    }

    /// Flag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the flag is currently raised.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Raise the flag for `holder` if nobody else holds it.
    pub fn try_raise(self: &Arc<Self>, holder: AgentId) -> Option<FlagLease> {
        if self
            .raised
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(flag = %self.name, agent = %holder, "flag already raised");
            return None;
        }
        debug!(flag = %self.name, agent = %holder, "flag raised");
        Some(FlagLease {
            flag: Arc::clone(self),
            holder,
            released: false,
        })
    }
}

/// Exclusive hold on a [`SettlementFlag`].
#[derive(Debug)]
pub struct FlagLease {
    /// The held flag.
    flag: Arc<SettlementFlag>,
    /// The agent holding it.
    holder: AgentId,
    /// Set once the flag has been lowered.
    released: bool,
}

impl FlagLease {
    /// The held flag.
    pub fn flag(&self) -> &Arc<SettlementFlag> {
        &self.flag
    }
}

impl Lease for FlagLease {
    fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.flag.raised.store(false, Ordering::Release);
        debug!(flag = %self.flag.name, agent = %self.holder, "flag lowered");
        true
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn label(&self) -> String {
        format!("flag {}", self.flag.name)
    }
}

impl Drop for FlagLease {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_one_holder_at_a_time() {
        let flag = Arc::new(SettlementFlag::new("job review"));
        let mut first = flag.try_raise(AgentId::new()).unwrap();
        assert!(flag.try_raise(AgentId::new()).is_none());
        assert!(first.release());
        assert!(!flag.is_raised());
        assert!(flag.try_raise(AgentId::new()).is_some());
    }

    #[test]
    fn dropping_the_lease_lowers_the_flag() {
        let flag = Arc::new(SettlementFlag::new("job review"));
        let lease = flag.try_raise(AgentId::new());
        assert!(flag.is_raised());
        drop(lease);
        assert!(!flag.is_raised());
    }

    #[test]
    fn late_release_does_not_lower_a_new_holder() {
        let flag = Arc::new(SettlementFlag::new("job review"));
        let mut first = flag.try_raise(AgentId::new()).unwrap();
        first.release();
        let _second = flag.try_raise(AgentId::new()).unwrap();
        assert!(!first.release());
        assert!(flag.is_raised());
    }
}
