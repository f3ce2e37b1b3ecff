//! Robot actuator contract and error types.
//!
//! This module defines:
//! - `RobotActuator` trait - Interface to the robot wrapper
//! - `MotionAuthority` trait - Caller-supplied motion permission check
//! - `CommandResponse` - `(status, message)` pair returned by robot commands
//! - `ActuatorError` enum - Error types for mobility parameter access

use crate::presets::MobilityParams;
use std::sync::Arc;
use thiserror::Error;

/// Error types for actuator operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    /// Robot must be powered for this request
    #[error("Robot is not powered on")]
    NotPowered,

    /// Robot refused the request
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Transport or SDK communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Robot wrapper not connected or not yet initialized
    #[error("Actuator unavailable: {0}")]
    Unavailable(String),
}

/// Status and message returned by a robot command.
///
/// Commands are fire-and-forget at the SDK boundary: `success` only reports
/// that the request was accepted, not that the motion completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub success: bool,
    pub message: String,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Interface to the robot wrapper.
///
/// Calls are synchronous from the caller's point of view but may be
/// non-blocking on the robot side. Implementations own their retry policy;
/// callers never retry.
///
/// All methods take `&self` because a single wrapper is shared between the
/// sample path and any in-flight dispatch.
pub trait RobotActuator: Send + Sync {
    /// Whether motor power is currently on.
    fn is_powered_on(&self) -> bool;

    /// Request motor power on.
    fn power_on(&self) -> CommandResponse;

    /// Request a safe power off (sit first, then cut power).
    fn safe_power_off(&self) -> CommandResponse;

    /// Whether the robot reports a sitting pose.
    fn is_sitting(&self) -> bool;

    /// Request a sit.
    fn sit(&self) -> CommandResponse;

    /// Request a stand.
    fn stand(&self) -> CommandResponse;

    /// Read the current mobility parameters.
    ///
    /// # Errors
    /// Any [`ActuatorError`] the wrapper reports.
    fn mobility_params(&self) -> Result<MobilityParams, ActuatorError>;

    /// Replace the mobility parameters.
    ///
    /// # Errors
    /// Any [`ActuatorError`] the wrapper reports.
    fn set_mobility_params(&self, params: MobilityParams) -> Result<(), ActuatorError>;
}

impl<T: RobotActuator + ?Sized> RobotActuator for Arc<T> {
    fn is_powered_on(&self) -> bool {
        (**self).is_powered_on()
    }

    fn power_on(&self) -> CommandResponse {
        (**self).power_on()
    }

    fn safe_power_off(&self) -> CommandResponse {
        (**self).safe_power_off()
    }

    fn is_sitting(&self) -> bool {
        (**self).is_sitting()
    }

    fn sit(&self) -> CommandResponse {
        (**self).sit()
    }

    fn stand(&self) -> CommandResponse {
        (**self).stand()
    }

    fn mobility_params(&self) -> Result<MobilityParams, ActuatorError> {
        (**self).mobility_params()
    }

    fn set_mobility_params(&self, params: MobilityParams) -> Result<(), ActuatorError> {
        (**self).set_mobility_params(params)
    }
}

/// Answers "is this class of motion currently permitted?".
///
/// Implemented for any `Fn(bool) -> bool`, so hosts can pass a closure.
pub trait MotionAuthority: Send + Sync {
    fn is_motion_allowed(&self, autonomous: bool) -> bool;
}

impl<F> MotionAuthority for F
where
    F: Fn(bool) -> bool + Send + Sync,
{
    #[inline]
    fn is_motion_allowed(&self, autonomous: bool) -> bool {
        self(autonomous)
    }
}
