//! Circular preset selector.
//!
//! The entry table is fixed at construction; only the index moves. Order is
//! the operator-visible cycling order.

use heapless::Vec;
use teleop_common::config::ConfigError;
use teleop_common::presets::Preset;

/// Maximum entries per cycle.
pub const MAX_MODE_ENTRIES: usize = 16;

/// One selectable preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeEntry<P> {
    pub value: P,
    pub label: String,
}

impl<P: Preset> ModeEntry<P> {
    pub fn new(value: P, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Ordered wrap-around preset list with a current selection.
#[derive(Debug, Clone)]
pub struct ModeCycle<P> {
    entries: Vec<ModeEntry<P>, MAX_MODE_ENTRIES>,
    index: usize,
}

impl<P: Preset> ModeCycle<P> {
    /// Build a cycle starting at the first entry.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` if the list is empty or holds more
    /// than [`MAX_MODE_ENTRIES`] entries.
    pub fn new<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = ModeEntry<P>>,
    {
        let mut table = Vec::new();
        for entry in entries {
            table.push(entry).map_err(|_| {
                ConfigError::ValidationError(format!(
                    "mode cycle holds more than {MAX_MODE_ENTRIES} entries"
                ))
            })?;
        }
        if table.is_empty() {
            return Err(ConfigError::ValidationError(
                "mode cycle needs at least one entry".to_string(),
            ));
        }
        Ok(Self {
            entries: table,
            index: 0,
        })
    }

    /// Build from `(value, label)` pairs.
    pub fn from_pairs(pairs: &[(P, &str)]) -> Result<Self, ConfigError> {
        Self::new(pairs.iter().map(|(value, label)| ModeEntry::new(*value, *label)))
    }

    #[inline]
    pub fn current(&self) -> &ModeEntry<P> {
        &self.entries[self.index]
    }

    /// Step to the next entry, wrapping at the end.
    pub fn advance(&mut self) -> &ModeEntry<P> {
        self.index = (self.index + 1) % self.entries.len();
        &self.entries[self.index]
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a cycle built through `new`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ModeEntry<P>] {
        &self.entries
    }
}
