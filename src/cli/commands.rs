//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use super::SlotEdit;
use crate::audio;
use crate::chain::{log_spaced_frequencies, ChainResponse};
use crate::model::ChainSettings;

/// Write the factory preset.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    ChainSettings::default()
        .save(path)
        .with_context(|| format!("Failed to write preset {}", path.display()))?;

    println!("Preset created: {}", path.display());
    Ok(())
}

/// Print every slot and the node path the chain is wired as.
pub fn show(preset: &Path, sample_rate: f64) -> Result<()> {
    let settings = load(preset)?;
    let chain = audio::software_chain(settings, sample_rate);

    println!(
        "{:<4} {:<22} {:>10} {:>6} {:>8}  {}",
        "Slot", "Family", "Freq (Hz)", "Q", "Gain", "State"
    );
    for (index, slot) in chain.settings().iter().enumerate() {
        let q = if slot.family.has_q() {
            format!("{:.2}", slot.q)
        } else {
            "-".to_string()
        };
        let gain = if slot.family.has_gain() {
            format!("{:+.1}", slot.gain)
        } else {
            "-".to_string()
        };
        let state = match (chain.stage_sections(index), slot.bypassed) {
            (Some(sections), _) => format!("live ({} sections)", sections.len()),
            (None, true) => "bypassed".to_string(),
            (None, false) => "empty".to_string(),
        };
        println!(
            "{:<4} {:<22} {:>10.1} {:>6} {:>8}  {}",
            index,
            slot.family.label(),
            slot.frequency,
            q,
            gain,
            state
        );
    }

    let path: Vec<String> = chain
        .signal_path()
        .iter()
        .map(|node| format!("{:?}", node))
        .collect();
    println!();
    println!("Path: {}", path.join(" -> "));
    Ok(())
}

/// Apply an edit through the manager and save the result.
pub fn set(preset: &Path, edit: &SlotEdit) -> Result<()> {
    let settings = load(preset)?;
    let mut chain = audio::software_chain(settings, 48000.0);
    let slot = edit.slot;

    if let Some(frequency) = edit.frequency {
        chain.set_frequency(slot, frequency)?;
    }
    if let Some(q) = edit.q {
        chain.set_q(slot, q)?;
    }
    if let Some(gain) = edit.gain {
        chain.set_gain(slot, gain)?;
    }
    if let Some(family) = edit.family {
        chain.set_family(slot, family)?;
    }
    if let Some(bypass) = edit.bypass {
        chain.set_bypass(slot, bypass)?;
    }
    debug!("Applied {} changes to slot {}", chain.revision(), slot);

    chain
        .settings()
        .validate()
        .context("Edited preset is invalid, not saved")?;
    chain
        .settings()
        .save(preset)
        .with_context(|| format!("Failed to write preset {}", preset.display()))?;

    let updated = chain.setting(slot)?;
    println!(
        "Slot {}: {} @ {:.1} Hz, Q {:.2}, {:+.1} dB{}",
        slot,
        updated.family.label(),
        updated.frequency,
        updated.q,
        updated.gain,
        if updated.bypassed { " (bypassed)" } else { "" }
    );
    Ok(())
}

/// Print magnitude and phase of the whole chain over a log grid.
pub fn response(preset: &Path, points: usize, sample_rate: f64) -> Result<()> {
    if points == 0 {
        bail!("--points must be at least 1");
    }

    let settings = load(preset)?;
    let chain = audio::software_chain(settings, sample_rate);
    let frequencies = log_spaced_frequencies(points, sample_rate as f32);
    let response = ChainResponse::measure(&chain, &frequencies)?;

    println!("{:>10} {:>10} {:>10}", "Freq (Hz)", "Mag (dB)", "Phase (°)");
    for ((frequency, db), phase) in response
        .frequencies
        .iter()
        .zip(response.magnitude_db())
        .zip(&response.phase)
    {
        println!("{:>10.1} {:>10.2} {:>10.1}", frequency, db, phase.to_degrees());
    }
    Ok(())
}

/// Render a WAV file through the preset.
pub fn render(preset: &Path, input: &Path, output: &Path) -> Result<()> {
    let settings = load(preset)?;
    audio::render_file(&settings, input, output)
        .with_context(|| format!("Failed to render {}", input.display()))?;

    println!("Rendered: {}", output.display());
    Ok(())
}

fn load(preset: &Path) -> Result<ChainSettings> {
    info!("Loading preset: {}", preset.display());
    ChainSettings::load(preset).with_context(|| format!("Failed to load preset {}", preset.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FilterFamily;

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eq.json");

        init(&path, false).unwrap();
        assert!(init(&path, false).is_err());
        init(&path, true).unwrap();
        assert_eq!(ChainSettings::load(&path).unwrap(), ChainSettings::default());
    }

    #[test]
    fn test_set_saves_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eq.json");
        init(&path, false).unwrap();

        let edit = SlotEdit {
            slot: 5,
            family: Some(FilterFamily::Notch24),
            frequency: Some(60.0),
            q: Some(8.0),
            ..Default::default()
        };
        set(&path, &edit).unwrap();

        let saved = ChainSettings::load(&path).unwrap();
        assert_eq!(saved[5].family, FilterFamily::Notch24);
        assert_eq!(saved[5].frequency, 60.0);
        assert_eq!(saved[5].q, 8.0);
        assert_eq!(saved[0], ChainSettings::default()[0]);
    }

    #[test]
    fn test_set_rejects_bad_slot_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eq.json");
        init(&path, false).unwrap();

        let bad_slot = SlotEdit {
            slot: 8,
            gain: Some(3.0),
            ..Default::default()
        };
        assert!(set(&path, &bad_slot).is_err());

        let bad_value = SlotEdit {
            slot: 1,
            frequency: Some(-5.0),
            ..Default::default()
        };
        assert!(set(&path, &bad_value).is_err());
        assert_eq!(ChainSettings::load(&path).unwrap(), ChainSettings::default());
    }

    #[test]
    fn test_response_and_show_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eq.json");
        init(&path, false).unwrap();

        show(&path, 48000.0).unwrap();
        response(&path, 8, 44100.0).unwrap();
        assert!(response(&path, 0, 44100.0).is_err());
    }
}
