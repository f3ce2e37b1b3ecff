//! Discrete triggers and the gate that turns raw input into firings.
//!
//! Each sample goes through three checks, in order:
//!
//! 1. the master enable binding must hold, otherwise nothing is evaluated
//!    and no state changes;
//! 2. each trigger's binding is sampled by its [`SamplingRule`] (level, or
//!    once per hold);
//! 3. the [`GatePolicy`] decides whether a sampled trigger is eligible
//!    given the shared [`PauseState`].
//!
//! The gate only reports eligibility. Committing a firing (timestamps,
//! busy) happens after arbitration, see [`PauseState::arm`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use teleop_common::input::{InputBinding, InputSample};
use tracing::{debug, trace};

use crate::pause::{GatePolicy, PauseState};

/// Identity of a discrete trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TriggerId {
    PowerToggle = 0,
    SitStandToggle = 1,
    LocomotionCycle = 2,
    StairsCycle = 3,
}

impl TriggerId {
    pub const COUNT: usize = 4;

    pub const ALL: [Self; Self::COUNT] = [
        Self::PowerToggle,
        Self::SitStandToggle,
        Self::LocomotionCycle,
        Self::StairsCycle,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-bit set for this trigger.
    pub const fn flag(self) -> TriggerSet {
        match self {
            Self::PowerToggle => TriggerSet::POWER,
            Self::SitStandToggle => TriggerSet::SIT_STAND,
            Self::LocomotionCycle => TriggerSet::LOCOMOTION,
            Self::StairsCycle => TriggerSet::STAIRS,
        }
    }

    /// Physically consequential actions (power, posture).
    pub const fn is_physical(self) -> bool {
        matches!(self, Self::PowerToggle | Self::SitStandToggle)
    }
}

bitflags! {
    /// Set of triggers, one bit per [`TriggerId`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TriggerSet: u8 {
        const POWER      = 0x01;
        const SIT_STAND  = 0x02;
        const LOCOMOTION = 0x04;
        const STAIRS     = 0x08;
    }
}

impl Default for TriggerSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl TriggerSet {
    #[inline]
    pub fn has(&self, id: TriggerId) -> bool {
        self.contains(id.flag())
    }
}

/// How a trigger's binding is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingRule {
    /// Active on every enabled sample while the binding holds.
    Level,
    /// Fires at most once per hold: active while the binding holds and the
    /// trigger has not fired since it was last seen released.
    #[default]
    Edge,
}

/// Static description of one trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerSpec {
    pub id: TriggerId,
    pub binding: InputBinding,
    pub sampling: SamplingRule,
    /// Minimum time between firings; zero disables refractory gating.
    pub min_interval: Duration,
}

/// Evaluates the master enable and every trigger for one sample.
#[derive(Debug, Clone)]
pub struct TriggerGate {
    enable: InputBinding,
    policy: GatePolicy,
    specs: [TriggerSpec; TriggerId::COUNT],
}

impl TriggerGate {
    /// `specs` must be indexed by [`TriggerId::index`].
    pub fn new(
        enable: InputBinding,
        policy: GatePolicy,
        specs: [TriggerSpec; TriggerId::COUNT],
    ) -> Self {
        debug_assert!(specs.iter().enumerate().all(|(i, s)| s.id.index() == i));
        Self { enable, policy, specs }
    }

    #[inline]
    pub fn is_enabled(&self, sample: &InputSample) -> bool {
        self.enable.holds(sample)
    }

    #[inline]
    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    #[inline]
    pub fn spec(&self, id: TriggerId) -> &TriggerSpec {
        &self.specs[id.index()]
    }

    /// Triggers whose binding holds in `sample`, ignoring enable and gating.
    pub fn raw_levels(&self, sample: &InputSample) -> TriggerSet {
        self.specs
            .iter()
            .filter(|spec| spec.binding.holds(sample))
            .fold(TriggerSet::empty(), |set, spec| set | spec.id.flag())
    }

    /// Triggers eligible to fire this sample.
    ///
    /// Returns an empty set without touching `pause` when the master enable
    /// does not hold. Otherwise unlatches released triggers. An edge trigger
    /// that lost arbitration or was held while busy stays eligible until it
    /// fires.
    pub fn evaluate(
        &self,
        sample: &InputSample,
        pause: &mut PauseState,
        now: Instant,
    ) -> TriggerSet {
        if !self.is_enabled(sample) {
            return TriggerSet::empty();
        }

        let levels = self.raw_levels(sample);
        pause.unlatch_released(levels);
        let latched = pause.latched();
        trace!(?levels, ?latched, busy = pause.is_busy(), "enabled sample");

        let mut fired = TriggerSet::empty();
        for spec in &self.specs {
            if !levels.has(spec.id) {
                continue;
            }
            if spec.sampling == SamplingRule::Edge && latched.has(spec.id) {
                continue;
            }
            if self.admits(spec, pause, now) {
                fired |= spec.id.flag();
            } else {
                debug!(trigger = ?spec.id, policy = ?self.policy, "trigger suppressed");
            }
        }
        fired
    }

    fn admits(&self, spec: &TriggerSpec, pause: &PauseState, now: Instant) -> bool {
        match self.policy {
            GatePolicy::SharedPause => !pause.is_busy(),
            GatePolicy::PerTrigger => match pause.last_fired(spec.id) {
                None => true,
                Some(_) if spec.min_interval.is_zero() => true,
                Some(last) => now.saturating_duration_since(last) >= spec.min_interval,
            },
        }
    }
}
