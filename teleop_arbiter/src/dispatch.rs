//! Command dispatch against the robot actuator.
//!
//! | Trigger          | Action                                        | Settle      |
//! |------------------|-----------------------------------------------|-------------|
//! | PowerToggle      | powered ? safe power off : power on           | `power`     |
//! | SitStandToggle   | authorized ? (sitting ? stand : sit) : denied | `sit_stand` |
//! | LocomotionCycle  | advance gait cycle, write locomotion hint     | `toggle`    |
//! | StairsCycle      | advance stairs cycle, write stairs hint       | `toggle`    |
//!
//! Actuator calls are fire-and-forget on the robot side, so each dispatch
//! waits out a settle delay before releasing the busy state. The pause lock
//! is not held during the action or the wait. Failures are reported in the
//! returned outcome and never retried.

use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;
use teleop_common::actuator::{ActuatorError, CommandResponse, MotionAuthority, RobotActuator};
use teleop_common::presets::{LocomotionHint, MobilityParams, StairsMode};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::mode_cycle::{ModeCycle, ModeEntry};
use crate::pause::PauseState;
use crate::trigger::TriggerId;

/// Reason surfaced when sit/stand is vetoed.
pub const MOTION_DENIED_MESSAGE: &str = "Not changing sit/stand. Robot motion not allowed!";

/// Post-dispatch wait per command class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    pub power: Duration,
    pub sit_stand: Duration,
    pub toggle: Duration,
}

impl SettleDelays {
    pub const ZERO: Self = Self {
        power: Duration::ZERO,
        sit_stand: Duration::ZERO,
        toggle: Duration::ZERO,
    };

    pub const fn for_trigger(&self, id: TriggerId) -> Duration {
        match id {
            TriggerId::PowerToggle => self.power,
            TriggerId::SitStandToggle => self.sit_stand,
            TriggerId::LocomotionCycle | TriggerId::StairsCycle => self.toggle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTransition {
    OffToOn,
    OnToOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostureTransition {
    SitToStand,
    StandToSit,
}

impl fmt::Display for PowerTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OffToOn => "OFF --> ON",
            Self::OnToOff => "ON --> OFF",
        })
    }
}

impl fmt::Display for PostureTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SitToStand => "SIT --> STAND",
            Self::StandToSit => "STAND --> SIT",
        })
    }
}

/// What a dispatch did.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Power {
        transition: PowerTransition,
        response: CommandResponse,
    },
    Posture {
        transition: PostureTransition,
        response: CommandResponse,
    },
    /// Motion authority vetoed sit/stand; no actuator call was made.
    PostureDenied { reason: &'static str },
    /// Gait cycle advanced; `applied` is the mobility write result.
    Locomotion {
        entry: ModeEntry<LocomotionHint>,
        applied: Result<(), ActuatorError>,
    },
    /// Stairs cycle advanced; `applied` is the mobility write result.
    Stairs {
        entry: ModeEntry<StairsMode>,
        applied: Result<(), ActuatorError>,
    },
}

impl DispatchOutcome {
    /// Whether the actuator accepted the request.
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Power { response, .. } | Self::Posture { response, .. } => response.success,
            Self::PostureDenied { .. } => false,
            Self::Locomotion { applied, .. } => applied.is_ok(),
            Self::Stairs { applied, .. } => applied.is_ok(),
        }
    }
}

/// Result of one dispatch, returned to the host for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub trigger: TriggerId,
    pub outcome: DispatchOutcome,
    /// Settle delay that was waited out before releasing busy.
    pub settle: Duration,
}

/// Releases one in-flight slot when dropped.
struct InFlight<'a> {
    pause: &'a Mutex<PauseState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.pause.lock().release();
    }
}

/// Both mode cycles, under one lock with the mobility write they drive.
struct ModeCycles {
    locomotion: ModeCycle<LocomotionHint>,
    stairs: ModeCycle<StairsMode>,
}

/// Executes arbitrated triggers against the actuator and the mode cycles.
pub struct CommandDispatcher<A, M> {
    actuator: A,
    authority: M,
    modes: Mutex<ModeCycles>,
    settle: SettleDelays,
}

impl<A: RobotActuator, M: MotionAuthority> CommandDispatcher<A, M> {
    pub fn new(
        actuator: A,
        authority: M,
        locomotion: ModeCycle<LocomotionHint>,
        stairs: ModeCycle<StairsMode>,
        settle: SettleDelays,
    ) -> Self {
        Self {
            actuator,
            authority,
            modes: Mutex::new(ModeCycles { locomotion, stairs }),
            settle,
        }
    }

    /// Run an armed trigger to completion: action, settle wait, release.
    ///
    /// The caller must have armed `trigger` in `pause`; exactly one
    /// in-flight slot is released on return. A denied sit/stand releases
    /// without waiting.
    pub fn dispatch<C: Clock>(
        &self,
        trigger: TriggerId,
        pause: &Mutex<PauseState>,
        clock: &C,
    ) -> DispatchReport {
        let _in_flight = InFlight { pause };

        let outcome = self.execute(trigger);
        let settle = match outcome {
            DispatchOutcome::PostureDenied { .. } => Duration::ZERO,
            _ => self.settle.for_trigger(trigger),
        };
        clock.sleep(settle);

        DispatchReport {
            trigger,
            outcome,
            settle,
        }
    }

    /// Perform the action for `trigger` without any settle wait.
    pub fn execute(&self, trigger: TriggerId) -> DispatchOutcome {
        match trigger {
            TriggerId::PowerToggle => self.toggle_power(),
            TriggerId::SitStandToggle => self.toggle_sit_stand(),
            TriggerId::LocomotionCycle => self.cycle_locomotion(),
            TriggerId::StairsCycle => self.cycle_stairs(),
        }
    }

    fn toggle_power(&self) -> DispatchOutcome {
        info!("Received power on/off command");
        let (transition, response) = if self.actuator.is_powered_on() {
            (PowerTransition::OnToOff, self.actuator.safe_power_off())
        } else {
            (PowerTransition::OffToOn, self.actuator.power_on())
        };
        log_response(&transition.to_string(), &response);
        DispatchOutcome::Power {
            transition,
            response,
        }
    }

    fn toggle_sit_stand(&self) -> DispatchOutcome {
        info!("Received sit/stand command");
        if !self.authority.is_motion_allowed(false) {
            info!("{MOTION_DENIED_MESSAGE}");
            return DispatchOutcome::PostureDenied {
                reason: MOTION_DENIED_MESSAGE,
            };
        }

        // A robot can report sitting and standing at once. Standing from an
        // ambiguous pose is the safe direction, so the sitting check wins.
        let (transition, response) = if self.actuator.is_sitting() {
            (PostureTransition::SitToStand, self.actuator.stand())
        } else {
            (PostureTransition::StandToSit, self.actuator.sit())
        };
        log_response(&transition.to_string(), &response);
        DispatchOutcome::Posture {
            transition,
            response,
        }
    }

    // `modes` stays locked from advance through the mobility write.
    fn cycle_locomotion(&self) -> DispatchOutcome {
        let mut modes = self.modes.lock();
        let entry = modes.locomotion.advance().clone();
        let applied = self.update_mobility(|params| params.locomotion_hint = entry.value);
        drop(modes);
        match &applied {
            Ok(()) => info!(mode = %entry.label, "Set locomotion mode"),
            Err(e) => warn!(mode = %entry.label, error = %e, "Error setting locomotion mode"),
        }
        DispatchOutcome::Locomotion { entry, applied }
    }

    fn cycle_stairs(&self) -> DispatchOutcome {
        let mut modes = self.modes.lock();
        let entry = modes.stairs.advance().clone();
        let applied = self.update_mobility(|params| params.stairs_mode = entry.value);
        drop(modes);
        match &applied {
            Ok(()) => info!(mode = %entry.label, "Set stairs mode"),
            Err(e) => warn!(mode = %entry.label, error = %e, "Error setting stairs mode"),
        }
        DispatchOutcome::Stairs { entry, applied }
    }

    /// Read-modify-write of the mobility parameters. Callers hold `modes`.
    fn update_mobility(
        &self,
        update: impl FnOnce(&mut MobilityParams),
    ) -> Result<(), ActuatorError> {
        let mut params = self.actuator.mobility_params()?;
        update(&mut params);
        self.actuator.set_mobility_params(params)
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn settle_delays(&self) -> SettleDelays {
        self.settle
    }

    /// Currently selected gait preset.
    pub fn locomotion_mode(&self) -> ModeEntry<LocomotionHint> {
        self.modes.lock().locomotion.current().clone()
    }

    /// Currently selected stairs preset.
    pub fn stairs_mode(&self) -> ModeEntry<StairsMode> {
        self.modes.lock().stairs.current().clone()
    }
}

fn log_response(transition: &str, response: &CommandResponse) {
    if response.success {
        info!(transition, message = %response.message, "actuator accepted");
    } else {
        warn!(transition, message = %response.message, "actuator refused");
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
