//! Teleop Common Library
//!
//! Shared types for the joystick command workspace: robot presets, the
//! actuator contract the arbiter drives, joystick samples and bindings, and
//! configuration loading.
//!
//! # Module Structure
//!
//! - [`presets`] - Locomotion/stairs presets and `parse_preset`
//! - [`actuator`] - `RobotActuator` and `MotionAuthority` contracts
//! - [`input`] - Joystick samples and input bindings
//! - [`config`] - Configuration loading traits and types
//! - [`sim`] - In-process simulated robot
//! - [`prelude`] - Common re-exports for convenience

pub mod actuator;
pub mod config;
pub mod input;
pub mod prelude;
pub mod presets;
pub mod sim;
