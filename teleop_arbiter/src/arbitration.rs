//! Trigger arbitration.
//!
//! At most one discrete command is issued per sample. When several triggers
//! fire together the slow, physically disruptive ones win:
//!
//! `PowerToggle > SitStandToggle > LocomotionCycle > StairsCycle`
//!
//! Losers are dropped for this sample. They are not committed, so under
//! `PerTrigger` their refractory clocks do not restart.

use crate::trigger::{TriggerId, TriggerSet};

/// Fixed-priority selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct Arbiter;

impl Arbiter {
    /// Highest priority first.
    pub const PRIORITY: [TriggerId; TriggerId::COUNT] = [
        TriggerId::PowerToggle,
        TriggerId::SitStandToggle,
        TriggerId::LocomotionCycle,
        TriggerId::StairsCycle,
    ];

    /// Pick the winning trigger, if any fired.
    pub fn select(fired: TriggerSet) -> Option<TriggerId> {
        Self::PRIORITY.into_iter().find(|id| fired.has(*id))
    }

    /// Triggers that fired but lost to the winner.
    pub fn dropped(fired: TriggerSet) -> TriggerSet {
        match Self::select(fired) {
            Some(winner) => fired.difference(winner.flag()),
            None => TriggerSet::empty(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
