//! Mobility presets understood by the robot.
//!
//! Raw preset values come from configuration and from the robot itself, so
//! decoding never fails: anything unrecognized maps to the preset's default
//! variant (see [`parse_preset`]).

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A closed set of integer-coded presets with a defined fallback.
pub trait Preset: Copy + Eq + Debug + Send + Sync + 'static {
    /// Variant used for any raw value that does not decode.
    const DEFAULT: Self;

    /// Decode a raw value, `None` if it is not a known preset.
    fn from_raw(raw: i32) -> Option<Self>;

    /// Raw wire value of this preset.
    fn raw(self) -> i32;
}

/// Decode a raw preset value, falling back to `P::DEFAULT`.
#[inline]
pub fn parse_preset<P: Preset>(raw: i32) -> P {
    P::from_raw(raw).unwrap_or(P::DEFAULT)
}

/// Gait selection hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum LocomotionHint {
    Auto = 1,
    Trot = 2,
    SpeedSelectTrot = 3,
    Crawl = 4,
    Amble = 5,
    SpeedSelectAmble = 6,
    SpeedSelectCrawl = 10,
}

impl Preset for LocomotionHint {
    const DEFAULT: Self = Self::Auto;

    fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::Auto),
            2 => Some(Self::Trot),
            3 => Some(Self::SpeedSelectTrot),
            4 => Some(Self::Crawl),
            5 => Some(Self::Amble),
            6 => Some(Self::SpeedSelectAmble),
            10 => Some(Self::SpeedSelectCrawl),
            _ => None,
        }
    }

    #[inline]
    fn raw(self) -> i32 {
        self as i32
    }
}

impl Default for LocomotionHint {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Stairs handling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StairsMode {
    Off = 1,
    On = 2,
    Auto = 3,
}

impl Preset for StairsMode {
    const DEFAULT: Self = Self::Auto;

    fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::Off),
            2 => Some(Self::On),
            3 => Some(Self::Auto),
            _ => None,
        }
    }

    #[inline]
    fn raw(self) -> i32 {
        self as i32
    }
}

impl Default for StairsMode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Stock gait cycling order with operator-facing labels.
pub const DEFAULT_LOCOMOTION_PRESETS: [(LocomotionHint, &str); 7] = [
    (LocomotionHint::Auto, "AUTO"),
    (LocomotionHint::Trot, "TROT"),
    (LocomotionHint::SpeedSelectTrot, "TROT WITH STOP"),
    (LocomotionHint::Crawl, "CRAWL"),
    (LocomotionHint::SpeedSelectCrawl, "CRAWL WITH STOP"),
    (LocomotionHint::Amble, "AMBLE"),
    (LocomotionHint::SpeedSelectAmble, "AMBLE WITH STOP"),
];

/// Stock stairs cycling order with operator-facing labels.
pub const DEFAULT_STAIRS_PRESETS: [(StairsMode, &str); 3] = [
    (StairsMode::Off, "OFF"),
    (StairsMode::On, "ON"),
    (StairsMode::Auto, "AUTOSELECT"),
];

/// Actuator-side mobility configuration.
///
/// Only the two hint fields are touched by the arbiter; everything else is
/// carried through the read-modify-write untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MobilityParams {
    pub locomotion_hint: LocomotionHint,
    pub stairs_mode: StairsMode,
    /// Body height offset [m].
    pub body_height: f64,
    /// Whether stepping onto obstacles is avoided.
    pub obstacle_avoidance: bool,
}
