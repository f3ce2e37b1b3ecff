//! Joystick samples and input bindings.
//!
//! A sample is one snapshot of every axis and button, delivered once per
//! poll tick. Bindings turn a sample into a boolean "held" condition.

use serde::{Deserialize, Serialize};

/// One joystick snapshot.
///
/// Axes are normalized to `[-1.0, 1.0]`; indices follow the transport's
/// layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSample {
    #[serde(default)]
    pub axes: Vec<f32>,
    #[serde(default)]
    pub buttons: Vec<bool>,
}

impl InputSample {
    pub fn new(axes: Vec<f32>, buttons: Vec<bool>) -> Self {
        Self { axes, buttons }
    }

    /// Axis value, `None` if the index is outside this sample.
    #[inline]
    pub fn axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied()
    }

    /// Button state; a missing button reads as released.
    #[inline]
    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }
}

/// Condition on a single axis or button.
///
/// # TOML forms
///
/// ```toml
/// input = { axis = 5, below = -0.9 }
/// input = { axis = 7, above = 0.9 }
/// input = { button = 3 }
/// ```
///
/// Any other combination of keys, or an unknown key, is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BindingFields", into = "BindingFields")]
pub enum InputBinding {
    /// Holds while the axis is strictly below `below`.
    AxisBelow { axis: usize, below: f32 },
    /// Holds while the axis is strictly above `above`.
    AxisAbove { axis: usize, above: f32 },
    /// Holds while the button is pressed.
    Button { button: usize },
}

impl InputBinding {
    /// Evaluate against a sample. Missing or NaN axis values never hold.
    pub fn holds(&self, sample: &InputSample) -> bool {
        match *self {
            Self::AxisBelow { axis, below } => sample.axis(axis).is_some_and(|v| v < below),
            Self::AxisAbove { axis, above } => sample.axis(axis).is_some_and(|v| v > above),
            Self::Button { button } => sample.button(button),
        }
    }

    /// Threshold of an axis binding.
    pub const fn threshold(&self) -> Option<f32> {
        match *self {
            Self::AxisBelow { below, .. } => Some(below),
            Self::AxisAbove { above, .. } => Some(above),
            Self::Button { .. } => None,
        }
    }
}

/// Flat table form of [`InputBinding`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BindingFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    axis: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    below: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    above: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    button: Option<usize>,
}

impl TryFrom<BindingFields> for InputBinding {
    type Error = &'static str;

    fn try_from(fields: BindingFields) -> Result<Self, Self::Error> {
        match (fields.axis, fields.below, fields.above, fields.button) {
            (Some(axis), Some(below), None, None) => Ok(Self::AxisBelow { axis, below }),
            (Some(axis), None, Some(above), None) => Ok(Self::AxisAbove { axis, above }),
            (None, None, None, Some(button)) => Ok(Self::Button { button }),
            _ => Err("expected `{ axis, below }`, `{ axis, above }` or `{ button }`"),
        }
    }
}

impl From<InputBinding> for BindingFields {
    fn from(binding: InputBinding) -> Self {
        match binding {
            InputBinding::AxisBelow { axis, below } => Self {
                axis: Some(axis),
                below: Some(below),
                ..Self::default()
            },
            InputBinding::AxisAbove { axis, above } => Self {
                axis: Some(axis),
                above: Some(above),
                ..Self::default()
            },
            InputBinding::Button { button } => Self {
                button: Some(button),
                ..Self::default()
            },
        }
    }
}
