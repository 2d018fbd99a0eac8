//! WAV file rendering
//!
//! Reads a WAV file, runs every channel through a freshly reset filter chain
//! and writes the result with the input's format.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, info};

use crate::chain::TopologyManager;
use crate::error::{ChainError, Result};
use crate::host::{HostConfig, SoftwareHost};
use crate::model::ChainSettings;

/// Decoded audio, one buffer per channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBuffers {
    pub spec: WavSpec,
    pub channels: Vec<Vec<f32>>,
}

impl ChannelBuffers {
    pub fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }
}

/// Build a chain on a software host running at `sample_rate`
pub fn software_chain(settings: ChainSettings, sample_rate: f64) -> TopologyManager<SoftwareHost> {
    let host = SoftwareHost::new(HostConfig { sample_rate });
    let (head, tail) = (host.head(), host.tail());
    TopologyManager::new(host, head, tail, settings)
}

/// Read a WAV file into per-channel `f32` buffers
pub fn read_wav(path: &Path) -> Result<ChannelBuffers> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    let channels = deinterleave(&samples, spec.channels.max(1) as usize);

    debug!(
        "Read {}: {} channels, {} Hz, {}-bit",
        path.display(),
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample
    );
    Ok(ChannelBuffers { spec, channels })
}

/// Write per-channel buffers using `audio.spec`
pub fn write_wav(path: &Path, audio: &ChannelBuffers) -> Result<()> {
    let spec = audio.spec;
    let mut writer = WavWriter::create(path, spec)?;

    for sample in interleave(&audio.channels) {
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => writer.write_sample(sample)?,
            (SampleFormat::Int, 8) => {
                writer.write_sample((sample * 127.0).clamp(-128.0, 127.0) as i8)?
            }
            (SampleFormat::Int, 16) => {
                writer.write_sample((sample * 32767.0).clamp(-32768.0, 32767.0) as i16)?
            }
            // 24-bit stored as i32 in hound
            (SampleFormat::Int, 24) => {
                writer.write_sample((sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32)?
            }
            (SampleFormat::Int, 32) => {
                writer.write_sample((sample as f64 * 2147483647.0) as i32)?
            }
            (format, bits) => {
                return Err(ChainError::UnsupportedFormat {
                    format: format!("{}-bit {:?} audio", bits, format),
                })
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Run `audio` through a chain built from `settings`, channel by channel
pub fn process(settings: &ChainSettings, audio: &mut ChannelBuffers) {
    let mut chain = software_chain(*settings, audio.spec.sample_rate as f64);
    for channel in &mut audio.channels {
        chain.reset();
        chain.render(channel);
    }
}

/// Render `input` through the chain described by `settings` into `output`
pub fn render_file(settings: &ChainSettings, input: &Path, output: &Path) -> Result<()> {
    let mut audio = read_wav(input)?;
    process(settings, &mut audio);
    write_wav(output, &audio)?;

    info!(
        "Rendered {} -> {} ({} frames, {} channels)",
        input.display(),
        output.display(),
        audio.frames(),
        audio.channels.len()
    );
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let samples: Vec<f32> = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v as f64 / 2147483648.0) as f32))
            .collect::<std::result::Result<_, _>>()?,
        (format, bits) => {
            return Err(ChainError::UnsupportedFormat {
                format: format!("{}-bit {:?} audio", bits, format),
            })
        }
    };
    Ok(samples)
}

fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut result = vec![Vec::with_capacity(frames); channels];

    for (i, sample) in samples.iter().enumerate() {
        result[i % channels].push(*sample);
    }

    result
}

fn interleave(channels: &[Vec<f32>]) -> Vec<f32> {
    let frames = channels.first().map(Vec::len).unwrap_or(0);
    let mut result = Vec::with_capacity(frames * channels.len());

    for frame in 0..frames {
        for channel in channels {
            result.push(channel[frame]);
        }
    }

    result
}
