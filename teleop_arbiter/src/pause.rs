//! Shared pause state and the refractory policy that reads it.
//!
//! One `PauseState` exists per orchestrator, behind a single lock. It is
//! only touched for short check-and-update sections; dispatch and settle
//! sleeps run with the lock released.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::trigger::{TriggerId, TriggerSet};

/// Refractory policy applied by the trigger gate.
///
/// The two policies are not equivalent: `PerTrigger` lets mode cycling run
/// while a power or sit/stand settle delay is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePolicy {
    /// Any dispatch in flight blocks every trigger until its settle delay
    /// has elapsed.
    #[default]
    SharedPause,
    /// Each trigger is blocked only by its own minimum interval since its
    /// last firing.
    PerTrigger,
}

/// Busy indicator, last-fired timestamps and per-hold latches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PauseState {
    /// Dispatches armed and not yet released. Under `SharedPause` this is
    /// never above one.
    in_flight: usize,
    last_fired: [Option<Instant>; TriggerId::COUNT],
    /// Triggers that fired during their current hold. Cleared when the
    /// binding is seen released on an enabled sample.
    latched: TriggerSet,
}

impl PauseState {
    /// True while any dispatched action is within its settle delay.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    #[inline]
    pub fn last_fired(&self, id: TriggerId) -> Option<Instant> {
        self.last_fired[id.index()]
    }

    #[inline]
    pub fn latched(&self) -> TriggerSet {
        self.latched
    }

    /// Drop the latch of every trigger not held in `levels`.
    pub(crate) fn unlatch_released(&mut self, levels: TriggerSet) {
        self.latched &= levels;
    }

    /// Commit a firing: stamp and latch the trigger, mark a dispatch in
    /// flight.
    pub fn arm(&mut self, id: TriggerId, now: Instant) {
        self.last_fired[id.index()] = Some(now);
        self.latched |= id.flag();
        self.in_flight += 1;
    }

    /// A dispatch finished its settle delay.
    pub fn release(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}
