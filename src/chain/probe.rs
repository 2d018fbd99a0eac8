//! Response probe
//!
//! Read-only frequency/phase queries against single live sections, plus the
//! composite response of the whole chain built from them.

use super::TopologyManager;
use crate::error::{ChainError, Result};
use crate::host::FilterHost;
use crate::model::SLOT_COUNT;

/// Lowest frequency of [`log_spaced_frequencies`], in Hz
pub const RESPONSE_MIN_FREQUENCY: f32 = 10.0;

impl<H: FilterHost> TopologyManager<H> {
    /// Ask section `section` of slot `index` for its response at `frequencies`.
    ///
    /// Returns `Ok(false)` and leaves the outputs untouched when the slot has
    /// no live stage; such a slot contributes unity gain and zero phase.
    pub fn query_response(
        &self,
        index: usize,
        section: usize,
        frequencies: &[f32],
        magnitude: &mut [f32],
        phase: &mut [f32],
    ) -> Result<bool> {
        if index >= SLOT_COUNT {
            return Err(ChainError::SlotOutOfRange {
                index,
                slot_count: SLOT_COUNT,
            });
        }

        let Some(sections) = self.stage_sections(index) else {
            return Ok(false);
        };
        let node = sections
            .get(section)
            .copied()
            .ok_or(ChainError::SectionOutOfRange {
                slot: index,
                section,
                count: sections.len(),
            })?;

        self.host()
            .frequency_response(node, frequencies, magnitude, phase);
        Ok(true)
    }
}

/// `count` frequencies spaced logarithmically from 10 Hz towards Nyquist
pub fn log_spaced_frequencies(count: usize, sample_rate: f32) -> Vec<f32> {
    let min_log = RESPONSE_MIN_FREQUENCY.log10();
    let max_log = (sample_rate / 2.0).log10();
    (0..count)
        .map(|i| {
            let position = i as f32 / count as f32;
            10.0_f32.powf(min_log + position * (max_log - min_log))
        })
        .collect()
}

/// Composite response of every live section in a chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainResponse {
    pub frequencies: Vec<f32>,
    /// Linear magnitude, product over all sections
    pub magnitude: Vec<f32>,
    /// Phase in radians, sum over all sections
    pub phase: Vec<f32>,
}

impl ChainResponse {
    /// Measure the chain at `frequencies`
    pub fn measure<H: FilterHost>(
        manager: &TopologyManager<H>,
        frequencies: &[f32],
    ) -> Result<Self> {
        let mut magnitude = vec![1.0_f32; frequencies.len()];
        let mut phase = vec![0.0_f32; frequencies.len()];
        let mut section_magnitude = vec![0.0_f32; frequencies.len()];
        let mut section_phase = vec![0.0_f32; frequencies.len()];

        for (index, setting) in manager.settings().iter().enumerate() {
            for section in 0..setting.family.section_count() {
                let found = manager.query_response(
                    index,
                    section,
                    frequencies,
                    &mut section_magnitude,
                    &mut section_phase,
                )?;
                if !found {
                    break;
                }
                for (total, value) in magnitude.iter_mut().zip(&section_magnitude) {
                    *total *= value;
                }
                for (total, value) in phase.iter_mut().zip(&section_phase) {
                    *total += value;
                }
            }
        }

        Ok(Self {
            frequencies: frequencies.to_vec(),
            magnitude,
            phase,
        })
    }

    /// Magnitude in dB
    pub fn magnitude_db(&self) -> Vec<f32> {
        self.magnitude.iter().map(|m| 20.0 * m.log10()).collect()
    }
}
