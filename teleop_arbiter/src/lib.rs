//! # Teleop Arbiter
//!
//! Turns a stream of joystick samples into discrete, mutually exclusive
//! robot commands: power toggle, sit/stand toggle, and cycling through
//! locomotion and stairs presets. Continuous velocity teleop is handled
//! elsewhere.
//!
//! ## Pipeline
//!
//! 1. **TriggerGate**: master enable, edge/level sampling, refractory policy
//! 2. **Arbiter**: one winner per sample, power > sit/stand > gait > stairs
//! 3. **CommandDispatcher**: actuator call, settle delay, busy release
//! 4. **Orchestrator**: owns the above plus the shared `PauseState`
//!
//! ## Refractory policies
//!
//! [`pause::GatePolicy::SharedPause`] (default) blocks every trigger while
//! any dispatch is settling. [`pause::GatePolicy::PerTrigger`] gates each
//! trigger on its own minimum interval, so mode cycling stays available
//! during a power or sit/stand settle.

pub mod arbitration;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod mode_cycle;
pub mod orchestrator;
pub mod pause;
pub mod trigger;

pub use orchestrator::Orchestrator;
