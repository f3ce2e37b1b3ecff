//! Per-sample driver.
//!
//! `Orchestrator::handle_sample` is the single entry point a host calls for
//! every joystick sample:
//!
//! 1. enable check and trigger gating, under the pause lock;
//! 2. arbitration, and arming of the winner, under the same lock;
//! 3. dispatch and settle wait, with the lock released.
//!
//! The orchestrator is `Sync`. Hosts that deliver samples from several
//! threads see later samples rejected while a dispatch is settling.

use parking_lot::Mutex;
use teleop_common::actuator::{MotionAuthority, RobotActuator};
use teleop_common::config::ConfigError;
use teleop_common::input::InputSample;
use teleop_common::presets::{LocomotionHint, StairsMode};
use tracing::{debug, info};

use crate::arbitration::Arbiter;
use crate::clock::{Clock, SystemClock};
use crate::config::ArbiterConfig;
use crate::dispatch::{CommandDispatcher, DispatchReport};
use crate::mode_cycle::ModeEntry;
use crate::pause::{GatePolicy, PauseState};
use crate::trigger::{TriggerGate, TriggerId};

/// Owns the gate, the pause state and the dispatcher.
pub struct Orchestrator<A, M, C = SystemClock> {
    gate: TriggerGate,
    pause: Mutex<PauseState>,
    dispatcher: CommandDispatcher<A, M>,
    clock: C,
}

impl<A, M, C> Orchestrator<A, M, C>
where
    A: RobotActuator,
    M: MotionAuthority,
    C: Clock,
{
    pub fn new(gate: TriggerGate, dispatcher: CommandDispatcher<A, M>, clock: C) -> Self {
        Self {
            gate,
            pause: Mutex::new(PauseState::default()),
            dispatcher,
            clock,
        }
    }

    /// Build everything from a configuration.
    ///
    /// # Errors
    /// Any validation error in `config`.
    pub fn from_config(
        config: &ArbiterConfig,
        actuator: A,
        authority: M,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let dispatcher = CommandDispatcher::new(
            actuator,
            authority,
            config.locomotion_cycle()?,
            config.stairs_cycle()?,
            config.settle_delays()?,
        );
        info!(
            policy = ?config.timing.policy,
            locomotion = %dispatcher.locomotion_mode().label,
            stairs = %dispatcher.stairs_mode().label,
            "arbiter ready"
        );
        Ok(Self::new(config.trigger_gate()?, dispatcher, clock))
    }

    /// Process one sample, dispatching at most one command.
    ///
    /// Blocks for the dispatched command's settle delay. Returns `None` when
    /// nothing fired.
    pub fn handle_sample(&self, sample: &InputSample) -> Option<DispatchReport> {
        let trigger = self.arm(sample)?;
        Some(self.dispatcher.dispatch(trigger, &self.pause, &self.clock))
    }

    /// Gate, arbitrate and arm without dispatching.
    ///
    /// The returned trigger holds an in-flight slot; pass it to
    /// [`Orchestrator::complete`] to run and release it.
    pub fn arm(&self, sample: &InputSample) -> Option<TriggerId> {
        if !self.gate.is_enabled(sample) {
            return None;
        }

        let mut pause = self.pause.lock();
        let now = self.clock.now();
        let fired = self.gate.evaluate(sample, &mut pause, now);
        let winner = Arbiter::select(fired)?;
        pause.arm(winner, now);

        let dropped = Arbiter::dropped(fired);
        if dropped.is_empty() {
            debug!(trigger = ?winner, "trigger fired");
        } else {
            debug!(trigger = ?winner, ?dropped, "trigger fired, lower priority dropped");
        }
        Some(winner)
    }

    /// Dispatch a trigger previously returned by [`Orchestrator::arm`].
    pub fn complete(&self, trigger: TriggerId) -> DispatchReport {
        self.dispatcher.dispatch(trigger, &self.pause, &self.clock)
    }

    pub fn is_busy(&self) -> bool {
        self.pause.lock().is_busy()
    }

    /// Copy of the current pause state.
    pub fn pause_state(&self) -> PauseState {
        self.pause.lock().clone()
    }

    pub fn policy(&self) -> GatePolicy {
        self.gate.policy()
    }

    pub fn locomotion_mode(&self) -> ModeEntry<LocomotionHint> {
        self.dispatcher.locomotion_mode()
    }

    pub fn stairs_mode(&self) -> ModeEntry<StairsMode> {
        self.dispatcher.stairs_mode()
    }

    pub fn actuator(&self) -> &A {
        self.dispatcher.actuator()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
