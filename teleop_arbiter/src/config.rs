//! TOML configuration for the arbiter, with validation.
//!
//! Every section is optional; an empty document yields the stock joystick
//! mapping and preset orders. Durations are given in seconds.
//!
//! ```toml
//! [timing]
//! policy = "shared_pause"
//! power_settle_secs = 3.0
//!
//! [enable]
//! axis = 2
//! below = -0.99
//!
//! [triggers.power]
//! input = { axis = 5, below = -0.9 }
//! sampling = "edge"
//!
//! [[locomotion]]
//! value = 1
//! label = "AUTO"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use teleop_common::config::{ConfigError, ConfigLoader, SharedConfig};
use teleop_common::input::InputBinding;
use teleop_common::presets::{
    DEFAULT_LOCOMOTION_PRESETS, DEFAULT_STAIRS_PRESETS, LocomotionHint, Preset, StairsMode,
    parse_preset,
};
use tracing::warn;

use crate::dispatch::SettleDelays;
use crate::mode_cycle::{MAX_MODE_ENTRIES, ModeCycle, ModeEntry};
use crate::pause::GatePolicy;
use crate::trigger::{SamplingRule, TriggerGate, TriggerId, TriggerSpec};

// ─── Defaults ───────────────────────────────────────────────────────

pub const POWER_SETTLE_SECS_DEFAULT: f64 = 3.0;
pub const SIT_STAND_SETTLE_SECS_DEFAULT: f64 = 5.0;
pub const TOGGLE_SETTLE_SECS_DEFAULT: f64 = 0.5;
pub const REFRACTORY_SECS_DEFAULT: f64 = 0.75;
pub const POLL_RATE_HZ_DEFAULT: f64 = 20.0;

/// Deadman: left trigger fully pressed.
pub const ENABLE_BINDING_DEFAULT: InputBinding = InputBinding::AxisBelow { axis: 2, below: -0.99 };

// ─── Sections ───────────────────────────────────────────────────────

/// Complete arbiter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArbiterConfig {
    pub shared: SharedConfig,
    pub timing: TimingConfig,
    /// Master enable binding.
    pub enable: InputBinding,
    pub triggers: TriggersConfig,
    /// Gait cycling order.
    pub locomotion: Vec<PresetEntry>,
    /// Stairs cycling order.
    pub stairs: Vec<PresetEntry>,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            timing: TimingConfig::default(),
            enable: ENABLE_BINDING_DEFAULT,
            triggers: TriggersConfig::default(),
            locomotion: PresetEntry::table(&DEFAULT_LOCOMOTION_PRESETS),
            stairs: PresetEntry::table(&DEFAULT_STAIRS_PRESETS),
        }
    }
}

/// Settle delays, refractory interval and policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub policy: GatePolicy,
    pub power_settle_secs: f64,
    pub sit_stand_settle_secs: f64,
    pub toggle_settle_secs: f64,
    /// Default minimum interval for the power and sit/stand triggers.
    pub refractory_secs: f64,
    /// Input sample rate the host polls at.
    pub poll_rate_hz: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            policy: GatePolicy::default(),
            power_settle_secs: POWER_SETTLE_SECS_DEFAULT,
            sit_stand_settle_secs: SIT_STAND_SETTLE_SECS_DEFAULT,
            toggle_settle_secs: TOGGLE_SETTLE_SECS_DEFAULT,
            refractory_secs: REFRACTORY_SECS_DEFAULT,
            poll_rate_hz: POLL_RATE_HZ_DEFAULT,
        }
    }
}

/// One trigger binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    pub input: InputBinding,
    #[serde(default)]
    pub sampling: SamplingRule,
    /// Overrides the default minimum interval for this trigger. Unset means
    /// `timing.refractory_secs` for power and sit/stand, zero for the mode
    /// cycles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refractory_secs: Option<f64>,
}

impl TriggerConfig {
    const fn bound(input: InputBinding) -> Self {
        Self {
            input,
            sampling: SamplingRule::Edge,
            refractory_secs: None,
        }
    }
}

/// Bindings for the four triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggersConfig {
    pub power: TriggerConfig,
    pub sit_stand: TriggerConfig,
    pub locomotion: TriggerConfig,
    pub stairs: TriggerConfig,
}

impl Default for TriggersConfig {
    fn default() -> Self {
        Self {
            power: TriggerConfig::bound(InputBinding::AxisBelow { axis: 5, below: -0.9 }),
            sit_stand: TriggerConfig::bound(InputBinding::AxisAbove { axis: 7, above: 0.9 }),
            locomotion: TriggerConfig::bound(InputBinding::AxisAbove { axis: 6, above: 0.9 }),
            stairs: TriggerConfig::bound(InputBinding::AxisBelow { axis: 6, below: -0.9 }),
        }
    }
}

impl TriggersConfig {
    pub fn get(&self, id: TriggerId) -> &TriggerConfig {
        match id {
            TriggerId::PowerToggle => &self.power,
            TriggerId::SitStandToggle => &self.sit_stand,
            TriggerId::LocomotionCycle => &self.locomotion,
            TriggerId::StairsCycle => &self.stairs,
        }
    }
}

/// Raw preset value plus operator label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresetEntry {
    pub value: i32,
    pub label: String,
}

impl PresetEntry {
    fn table<P: Preset>(pairs: &[(P, &str)]) -> Vec<Self> {
        pairs
            .iter()
            .map(|(value, label)| Self {
                value: value.raw(),
                label: (*label).to_string(),
            })
            .collect()
    }
}

// ─── Loading ────────────────────────────────────────────────────────

/// Load and validate an arbiter configuration file.
pub fn load_config(path: &Path) -> Result<ArbiterConfig, ConfigError> {
    let config = ArbiterConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate an in-memory TOML document.
pub fn load_config_from_str(toml: &str) -> Result<ArbiterConfig, ConfigError> {
    let config = ArbiterConfig::from_toml(toml)?;
    config.validate()?;
    Ok(config)
}

// ─── Validation & resolution ────────────────────────────────────────

impl ArbiterConfig {
    /// Check every bound. Unknown preset values are not errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.settle_delays()?;
        self.poll_period()?;
        validate_binding("enable", &self.enable)?;
        for id in TriggerId::ALL {
            let trigger = self.triggers.get(id);
            validate_binding(&format!("triggers.{id:?}"), &trigger.input)?;
            self.min_interval(id)?;
        }
        validate_presets("locomotion", &self.locomotion)?;
        validate_presets("stairs", &self.stairs)?;
        Ok(())
    }

    pub fn settle_delays(&self) -> Result<SettleDelays, ConfigError> {
        Ok(SettleDelays {
            power: secs("timing.power_settle_secs", self.timing.power_settle_secs)?,
            sit_stand: secs("timing.sit_stand_settle_secs", self.timing.sit_stand_settle_secs)?,
            toggle: secs("timing.toggle_settle_secs", self.timing.toggle_settle_secs)?,
        })
    }

    /// Time between input samples.
    pub fn poll_period(&self) -> Result<Duration, ConfigError> {
        let hz = self.timing.poll_rate_hz;
        if !hz.is_finite() || hz <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "timing.poll_rate_hz must be positive, got {hz}"
            )));
        }
        Ok(Duration::from_nanos((1e9 / hz).round() as u64))
    }

    /// Effective minimum interval for a trigger.
    pub fn min_interval(&self, id: TriggerId) -> Result<Duration, ConfigError> {
        let name = format!("triggers.{id:?}.refractory_secs");
        match self.triggers.get(id).refractory_secs {
            Some(value) => secs(&name, value),
            None if id.is_physical() => secs("timing.refractory_secs", self.timing.refractory_secs),
            None => Ok(Duration::ZERO),
        }
    }

    pub fn trigger_specs(&self) -> Result<[TriggerSpec; TriggerId::COUNT], ConfigError> {
        let spec = |id: TriggerId| -> Result<TriggerSpec, ConfigError> {
            let trigger = self.triggers.get(id);
            Ok(TriggerSpec {
                id,
                binding: trigger.input,
                sampling: trigger.sampling,
                min_interval: self.min_interval(id)?,
            })
        };
        Ok([
            spec(TriggerId::PowerToggle)?,
            spec(TriggerId::SitStandToggle)?,
            spec(TriggerId::LocomotionCycle)?,
            spec(TriggerId::StairsCycle)?,
        ])
    }

    pub fn trigger_gate(&self) -> Result<TriggerGate, ConfigError> {
        Ok(TriggerGate::new(
            self.enable,
            self.timing.policy,
            self.trigger_specs()?,
        ))
    }

    pub fn locomotion_cycle(&self) -> Result<ModeCycle<LocomotionHint>, ConfigError> {
        build_cycle("locomotion", &self.locomotion)
    }

    pub fn stairs_cycle(&self) -> Result<ModeCycle<StairsMode>, ConfigError> {
        build_cycle("stairs", &self.stairs)
    }
}

fn secs(name: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ConfigError::ValidationError(format!(
            "{name} must be a finite, non-negative number of seconds, got {value}"
        ))
    })
}

fn validate_binding(name: &str, binding: &InputBinding) -> Result<(), ConfigError> {
    match binding.threshold() {
        Some(t) if !t.is_finite() || !(-1.0..=1.0).contains(&t) => Err(
            ConfigError::ValidationError(format!("{name}: axis threshold {t} outside [-1, 1]")),
        ),
        _ => Ok(()),
    }
}

fn validate_presets(name: &str, entries: &[PresetEntry]) -> Result<(), ConfigError> {
    if entries.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{name}: preset list cannot be empty"
        )));
    }
    if entries.len() > MAX_MODE_ENTRIES {
        return Err(ConfigError::ValidationError(format!(
            "{name}: {} presets exceed the limit of {MAX_MODE_ENTRIES}",
            entries.len()
        )));
    }
    if let Some(entry) = entries.iter().find(|e| e.label.trim().is_empty()) {
        return Err(ConfigError::ValidationError(format!(
            "{name}: preset value {} has an empty label",
            entry.value
        )));
    }
    Ok(())
}

fn build_cycle<P: Preset>(
    name: &str,
    entries: &[PresetEntry],
) -> Result<ModeCycle<P>, ConfigError> {
    validate_presets(name, entries)?;
    ModeCycle::new(entries.iter().map(|entry| {
        let value = parse_preset::<P>(entry.value);
        if P::from_raw(entry.value).is_none() {
            warn!(
                list = name,
                raw = entry.value,
                label = %entry.label,
                fallback = ?value,
                "unknown preset value, using default"
            );
        }
        ModeEntry::new(value, entry.label.clone())
    }))
}

// ─── Tests ──────────────────────────────────────────────────────────
