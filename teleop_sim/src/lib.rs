//! # Teleop Sim
//!
//! Replays recorded joystick samples (JSON lines) through the arbiter
//! against the simulated robot. Used for bench-testing bindings and timing
//! before a config is deployed on hardware.

pub mod replay;
