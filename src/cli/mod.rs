//! CLI Module
//!
//! Command-line interface for editing equalizer presets, inspecting the live
//! chain they produce, and rendering WAV files through it.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::FilterFamily;

/// EQChain - live 8-slot parametric equalizer
#[derive(Parser, Debug)]
#[command(name = "eqchain")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the factory preset to a new file
    #[command(name = "init")]
    Init {
        /// Path of the preset to create
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the slot table and the live signal path
    #[command(name = "show")]
    Show {
        /// Preset file
        preset: PathBuf,

        /// Host sample rate in Hz
        #[arg(long, default_value_t = 48000.0)]
        sample_rate: f64,
    },

    /// Edit one slot of a preset
    #[command(name = "set")]
    Set {
        /// Preset file
        preset: PathBuf,

        #[command(flatten)]
        edit: SlotEdit,
    },

    /// Print the composite response of a preset
    #[command(name = "response")]
    Response {
        /// Preset file
        preset: PathBuf,

        /// Number of log-spaced frequency points
        #[arg(short, long, default_value_t = 32)]
        points: usize,

        /// Host sample rate in Hz
        #[arg(long, default_value_t = 48000.0)]
        sample_rate: f64,
    },

    /// Run a WAV file through a preset
    #[command(name = "render")]
    Render {
        /// Preset file
        preset: PathBuf,

        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,
    },
}

/// Changes to a single slot; omitted fields are left as they are
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SlotEdit {
    /// Slot index (0-7)
    #[arg(short, long)]
    pub slot: usize,

    /// Filter family, e.g. peaking12, lowpass24 or noop
    #[arg(long)]
    pub family: Option<FilterFamily>,

    /// Frequency in Hz
    #[arg(long)]
    pub frequency: Option<f32>,

    /// Resonance / bandwidth
    #[arg(long)]
    pub q: Option<f32>,

    /// Gain in dB
    #[arg(long, allow_hyphen_values = true)]
    pub gain: Option<f32>,

    /// Bypass the slot (true/false)
    #[arg(long)]
    pub bypass: Option<bool>,
}
