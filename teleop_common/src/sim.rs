//! In-process simulated robot.
//!
//! `SimulatedRobot` implements [`RobotActuator`] with a small pose model
//! (powered, sitting, mobility parameters), records every call it receives
//! and supports fault injection. It backs the replay host and the test
//! suites; it does not model timing, every request takes effect at once.

use crate::actuator::{ActuatorError, CommandResponse, RobotActuator};
use crate::presets::MobilityParams;
use parking_lot::Mutex;
use tracing::{debug, info};

/// One recorded actuator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActuatorCall {
    IsPoweredOn,
    PowerOn,
    SafePowerOff,
    IsSitting,
    Sit,
    Stand,
    GetMobilityParams,
    SetMobilityParams,
}

/// Fault injection switches.
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    /// `mobility_params` returns this error.
    pub read_mobility: Option<ActuatorError>,
    /// `set_mobility_params` returns this error.
    pub write_mobility: Option<ActuatorError>,
    /// Power, sit and stand requests are refused with this message.
    pub reject_commands: Option<String>,
}

#[derive(Debug)]
struct SimState {
    powered: bool,
    sitting: bool,
    params: MobilityParams,
    faults: FaultPlan,
    calls: Vec<ActuatorCall>,
    log_calls: bool,
}

/// Simulated robot wrapper.
#[derive(Debug)]
pub struct SimulatedRobot {
    state: Mutex<SimState>,
}

impl Default for SimulatedRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedRobot {
    /// Powered off and sitting, stock mobility parameters.
    pub fn new() -> Self {
        Self::with_pose(false, true)
    }

    /// Start from an explicit pose.
    pub fn with_pose(powered: bool, sitting: bool) -> Self {
        Self {
            state: Mutex::new(SimState {
                powered,
                sitting,
                params: MobilityParams::default(),
                faults: FaultPlan::default(),
                calls: Vec::new(),
                log_calls: true,
            }),
        }
    }

    pub fn set_faults(&self, faults: FaultPlan) {
        self.state.lock().faults = faults;
    }

    /// Snapshot of the recorded calls, oldest first.
    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.state.lock().calls.clone()
    }

    /// Number of recorded calls of one kind.
    pub fn call_count(&self, call: ActuatorCall) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == call).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Turn call recording on or off. Long-running hosts switch it off so
    /// the call log stays bounded; already recorded calls are kept.
    pub fn set_call_logging(&self, enabled: bool) {
        self.state.lock().log_calls = enabled;
    }

    /// Current mobility parameters, without recording a call.
    pub fn params(&self) -> MobilityParams {
        self.state.lock().params
    }

    /// Current `(powered, sitting)` pose, without recording a call.
    pub fn pose(&self) -> (bool, bool) {
        let state = self.state.lock();
        (state.powered, state.sitting)
    }

    fn record(&self, call: ActuatorCall) -> parking_lot::MutexGuard<'_, SimState> {
        let mut state = self.state.lock();
        if state.log_calls {
            state.calls.push(call);
        }
        debug!(?call, "simulated actuator call");
        state
    }
}

impl RobotActuator for SimulatedRobot {
    fn is_powered_on(&self) -> bool {
        self.record(ActuatorCall::IsPoweredOn).powered
    }

    fn power_on(&self) -> CommandResponse {
        let mut state = self.record(ActuatorCall::PowerOn);
        if let Some(reason) = &state.faults.reject_commands {
            return CommandResponse::failed(reason.clone());
        }
        state.powered = true;
        info!("simulated robot powered on");
        CommandResponse::ok("Success")
    }

    fn safe_power_off(&self) -> CommandResponse {
        let mut state = self.record(ActuatorCall::SafePowerOff);
        if let Some(reason) = &state.faults.reject_commands {
            return CommandResponse::failed(reason.clone());
        }
        state.powered = false;
        state.sitting = true;
        info!("simulated robot powered off");
        CommandResponse::ok("Success")
    }

    fn is_sitting(&self) -> bool {
        self.record(ActuatorCall::IsSitting).sitting
    }

    fn sit(&self) -> CommandResponse {
        let mut state = self.record(ActuatorCall::Sit);
        if let Some(reason) = &state.faults.reject_commands {
            return CommandResponse::failed(reason.clone());
        }
        if !state.powered {
            return CommandResponse::failed(ActuatorError::NotPowered.to_string());
        }
        state.sitting = true;
        CommandResponse::ok("Success")
    }

    fn stand(&self) -> CommandResponse {
        let mut state = self.record(ActuatorCall::Stand);
        if let Some(reason) = &state.faults.reject_commands {
            return CommandResponse::failed(reason.clone());
        }
        if !state.powered {
            return CommandResponse::failed(ActuatorError::NotPowered.to_string());
        }
        state.sitting = false;
        CommandResponse::ok("Success")
    }

    fn mobility_params(&self) -> Result<MobilityParams, ActuatorError> {
        let state = self.record(ActuatorCall::GetMobilityParams);
        match &state.faults.read_mobility {
            Some(err) => Err(err.clone()),
            None => Ok(state.params),
        }
    }

    fn set_mobility_params(&self, params: MobilityParams) -> Result<(), ActuatorError> {
        let mut state = self.record(ActuatorCall::SetMobilityParams);
        if let Some(err) = &state.faults.write_mobility {
            return Err(err.clone());
        }
        state.params = params;
        Ok(())
    }
}
