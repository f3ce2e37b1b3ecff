//! Prelude module for common re-exports.
//!
//! ```rust
//! use teleop_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Actuator contract ──────────────────────────────────────────────
pub use crate::actuator::{ActuatorError, CommandResponse, MotionAuthority, RobotActuator};

// ─── Presets ────────────────────────────────────────────────────────
pub use crate::presets::{LocomotionHint, MobilityParams, Preset, StairsMode, parse_preset};

// ─── Input ──────────────────────────────────────────────────────────
pub use crate::input::{InputBinding, InputSample};
