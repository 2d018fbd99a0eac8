//! Slot settings
//!
//! The fixed-size settings array owned alongside the live chain. Values are
//! kept even while a slot is inactive or bypassed, so re-activating a slot
//! restores its previous tuning.

use std::fs;
use std::ops::Index;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::FilterFamily;
use crate::error::{ChainError, Result};

/// Number of slots in every chain
pub const SLOT_COUNT: usize = 8;

/// Settings of a single slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotSetting {
    /// Filter family, `Inactive` for an empty slot
    #[serde(alias = "type")]
    pub family: FilterFamily,
    /// Center/corner frequency in Hz
    pub frequency: f32,
    /// Resonance / bandwidth
    #[serde(alias = "Q")]
    pub q: f32,
    /// Gain in dB (shelf and peaking families only)
    pub gain: f32,
    /// Whether the slot is bypassed
    #[serde(default, alias = "bypass")]
    pub bypassed: bool,
}

impl Default for SlotSetting {
    fn default() -> Self {
        Self::inactive(350.0, 1.0)
    }
}

impl SlotSetting {
    /// Create an active, non-bypassed slot setting
    pub fn new(family: FilterFamily, frequency: f32, q: f32, gain: f32) -> Self {
        Self {
            family,
            frequency,
            q,
            gain,
            bypassed: false,
        }
    }

    /// Create an empty slot that remembers a tuning for later activation
    pub fn inactive(frequency: f32, q: f32) -> Self {
        Self::new(FilterFamily::Inactive, frequency, q, 0.0)
    }

    /// Whether this slot should have a live stage in the chain
    pub fn is_live(&self) -> bool {
        self.family.is_active() && !self.bypassed
    }

    /// Validate numeric parameters
    pub fn validate(&self) -> Result<()> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(ChainError::InvalidSettings {
                reason: format!("frequency must be a positive number, got {}", self.frequency),
            });
        }

        if !self.q.is_finite() || self.q <= 0.0 {
            return Err(ChainError::InvalidSettings {
                reason: format!("Q must be a positive number, got {}", self.q),
            });
        }

        if !self.gain.is_finite() {
            return Err(ChainError::InvalidSettings {
                reason: format!("gain must be finite, got {}", self.gain),
            });
        }

        Ok(())
    }
}

/// The full settings array of a chain, one entry per slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SlotSetting>", into = "Vec<SlotSetting>")]
pub struct ChainSettings {
    slots: [SlotSetting; SLOT_COUNT],
}

impl Default for ChainSettings {
    /// Factory preset: low shelf, two peaks and a high shelf, four empty slots
    fn default() -> Self {
        let empty = SlotSetting::inactive(350.0, 1.0);
        Self {
            slots: [
                SlotSetting::new(FilterFamily::LowShelf12, 30.0, 0.7, 0.0),
                SlotSetting::new(FilterFamily::Peaking12, 200.0, 0.7, 0.0),
                SlotSetting::new(FilterFamily::Peaking12, 1000.0, 0.7, 0.0),
                SlotSetting::new(FilterFamily::HighShelf12, 5000.0, 0.7, 0.0),
                empty,
                empty,
                empty,
                empty,
            ],
        }
    }
}

impl ChainSettings {
    pub fn new(slots: [SlotSetting; SLOT_COUNT]) -> Self {
        Self { slots }
    }

    /// All slots inactive
    pub fn empty() -> Self {
        Self::new([SlotSetting::default(); SLOT_COUNT])
    }

    pub fn slots(&self) -> &[SlotSetting; SLOT_COUNT] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&SlotSetting> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotSetting> {
        self.slots.iter()
    }

    /// Builder-style replacement of one slot.
    ///
    /// Panics if `index >= SLOT_COUNT`.
    pub fn with_slot(mut self, index: usize, setting: SlotSetting) -> Self {
        self.slots[index] = setting;
        self
    }

    /// Mutable access is crate-private: owners change settings through the
    /// manager so the live graph follows.
    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut SlotSetting {
        &mut self.slots[index]
    }

    /// Validate every slot
    pub fn validate(&self) -> Result<()> {
        for (index, slot) in self.slots.iter().enumerate() {
            slot.validate().map_err(|e| match e {
                ChainError::InvalidSettings { reason } => ChainError::InvalidSettings {
                    reason: format!("slot {}: {}", index, reason),
                },
                other => other,
            })?;
        }
        Ok(())
    }

    /// Load and validate a JSON preset file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse and validate a JSON preset
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: ChainSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

impl Index<usize> for ChainSettings {
    type Output = SlotSetting;

    fn index(&self, index: usize) -> &SlotSetting {
        &self.slots[index]
    }
}

impl TryFrom<Vec<SlotSetting>> for ChainSettings {
    type Error = ChainError;

    fn try_from(slots: Vec<SlotSetting>) -> Result<Self> {
        let len = slots.len();
        let slots: [SlotSetting; SLOT_COUNT] =
            slots
                .try_into()
                .map_err(|_| ChainError::InvalidSettings {
                    reason: format!("expected {} slots, found {}", SLOT_COUNT, len),
                })?;
        Ok(Self { slots })
    }
}

impl From<ChainSettings> for Vec<SlotSetting> {
    fn from(settings: ChainSettings) -> Self {
        settings.slots.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_factory_preset() {
        let settings = ChainSettings::default();
        assert_eq!(settings[0].family, FilterFamily::LowShelf12);
        assert_eq!(settings[3].frequency, 5000.0);
        assert_eq!(settings.iter().filter(|s| s.is_live()).count(), 4);
        assert!(settings.iter().skip(4).all(|s| s.family == FilterFamily::Inactive));
    }

    #[test]
    fn test_is_live() {
        let mut slot = SlotSetting::new(FilterFamily::Notch12, 60.0, 8.0, 0.0);
        assert!(slot.is_live());
        slot.bypassed = true;
        assert!(!slot.is_live());
        assert!(!SlotSetting::inactive(100.0, 1.0).is_live());
    }

    #[test]
    fn test_slot_validation() {
        assert!(SlotSetting::new(FilterFamily::Peaking12, 1000.0, 0.7, 3.0)
            .validate()
            .is_ok());
        assert!(SlotSetting::new(FilterFamily::Peaking12, 0.0, 0.7, 3.0)
            .validate()
            .is_err());
        assert!(SlotSetting::new(FilterFamily::Peaking12, 1000.0, -1.0, 3.0)
            .validate()
            .is_err());
        assert!(SlotSetting::new(FilterFamily::Peaking12, 1000.0, 0.7, f32::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = ChainSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.starts_with('['));
        let parsed = ChainSettings::from_json(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_rejects_wrong_slot_count() {
        let json = serde_json::to_string(&vec![SlotSetting::default(); 7]).unwrap();
        let err = ChainSettings::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("expected 8 slots"), "{}", err);
    }

    #[test]
    fn test_accepts_legacy_field_names() {
        let slot = r#"{"type": "peaking24", "frequency": 440.0, "Q": 2.0, "gain": -3.0, "bypass": true}"#;
        let json = format!("[{}]", vec![slot; SLOT_COUNT].join(","));
        let settings = ChainSettings::from_json(&json).unwrap();
        assert_eq!(settings[5].family, FilterFamily::Peaking24);
        assert_eq!(settings[5].q, 2.0);
        assert!(settings[5].bypassed);
    }

    #[test]
    fn test_validation_names_slot() {
        let mut settings = ChainSettings::default();
        settings.slot_mut(6).frequency = -10.0;
        let err = settings.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SETTINGS");
        assert!(err.to_string().contains("slot 6"));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");

        let mut settings = ChainSettings::empty();
        *settings.slot_mut(2) = SlotSetting::new(FilterFamily::HighPass24, 80.0, 0.7, 0.0);
        settings.save(&path).unwrap();

        let loaded = ChainSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }
}
