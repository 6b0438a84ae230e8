//! Offline WAV rendering
//!
//! Reads a mono or stereo WAV, runs it through [`EqProcessor`] in blocks as
//! a host would, and writes the filtered audio with the input's format.
//! The spectrum analyzer is ticked at the rate a 60 Hz display would poll
//! it; the loudest point it ever shows is reported.

use anyhow::{bail, Context};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use simple_eq_audio::{BusesLayout, EqProcessor, Point, Rect, SpectrumAnalyzer};
use simple_eq_core::{EqConfig, EqParameters};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Display refresh rate the analyzer cadence is derived from
pub const DISPLAY_RATE_HZ: f64 = 60.0;

/// Virtual display the analyzer draws into
const ANALYZER_BOUNDS: Rect = Rect::new(0.0, 0.0, 1000.0, 500.0);

/// What to render and how
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub block_size: usize,
}

/// Loudest point the analyzer displayed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerPeak {
    pub frequency_hz: f64,
    pub level_db: f64,
}

/// Summary of a finished render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: usize,
    pub analyzer_ticks: usize,
    pub dropped_blocks: u64,
    pub peak: Option<AnalyzerPeak>,
}

/// Render `options.input` to `options.output` through an engine reading `params`
pub fn render(options: &RenderOptions, params: Arc<EqParameters>, config: &EqConfig) -> anyhow::Result<RenderReport> {
    let reader = WavReader::open(&options.input)
        .with_context(|| format!("Failed to open {}", options.input.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);

    let layout = match channels {
        1 => BusesLayout::MONO,
        2 => BusesLayout::STEREO,
        n => bail!("Unsupported channel count {} in {}", n, options.input.display()),
    };

    let mut samples = read_samples(reader)?;
    let frames = samples.len() / channels;

    tracing::info!(
        "Rendering {} ({} Hz, {} channel(s), {} frames)",
        options.input.display(),
        spec.sample_rate,
        channels,
        frames
    );

    let sample_rate = f64::from(spec.sample_rate);
    let mut eq = EqProcessor::new(params, config.clone());
    eq.set_buses_layout(layout)?;
    eq.prepare(sample_rate, options.block_size)?;

    let feed = eq
        .take_analyzer_feed()
        .context("Engine did not provide an analyzer feed")?;
    let mut analyzer = SpectrumAnalyzer::new(feed, config)?;

    let tick_frames = ((sample_rate / DISPLAY_RATE_HZ).round() as usize).max(1);
    let mut since_tick = 0;
    let mut ticks = 0;
    let mut peak: Option<AnalyzerPeak> = None;

    for chunk in samples.chunks_mut(options.block_size * channels) {
        eq.process_interleaved(chunk, channels);

        since_tick += chunk.len() / channels;
        if since_tick >= tick_frames {
            since_tick %= tick_frames;
            tick(&mut analyzer, &eq, sample_rate, config, &mut peak);
            ticks += 1;
        }
    }

    // Pick up whatever is still queued
    tick(&mut analyzer, &eq, sample_rate, config, &mut peak);
    ticks += 1;

    write_samples(&options.output, spec, &samples)?;

    if let Some(peak) = peak {
        tracing::info!(
            "Strongest analyzer peak: {:.1} dB at {:.1} Hz",
            peak.level_db,
            peak.frequency_hz
        );
    }

    let dropped_blocks = analyzer.dropped_blocks();
    if dropped_blocks > 0 {
        tracing::warn!("Analyzer dropped {} sample blocks", dropped_blocks);
    }
    tracing::info!("Wrote {} ({} analyzer ticks)", options.output.display(), ticks);

    Ok(RenderReport {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        frames,
        analyzer_ticks: ticks,
        dropped_blocks,
        peak,
    })
}

fn tick(
    analyzer: &mut SpectrumAnalyzer,
    eq: &EqProcessor,
    sample_rate: f64,
    config: &EqConfig,
    peak: &mut Option<AnalyzerPeak>,
) {
    analyzer.process(ANALYZER_BOUNDS, sample_rate, eq.chain_settings().analyzer_enabled);
    if !analyzer.is_enabled() {
        return;
    }

    for path in [analyzer.left_path(), analyzer.right_path()] {
        let Some(point) = path.highest_point() else {
            continue;
        };
        let candidate = point_to_peak(point, config);
        let louder = match *peak {
            Some(current) => candidate.level_db > current.level_db,
            None => true,
        };
        if louder {
            *peak = Some(candidate);
        }
    }
}

/// Invert the analyzer's display mapping for one point
fn point_to_peak(point: Point, config: &EqConfig) -> AnalyzerPeak {
    let bounds = ANALYZER_BOUNDS;
    let proportion = f64::from(point.x - bounds.x) / f64::from(bounds.width);
    let frequency_hz = config.min_display_freq * (config.max_display_freq / config.min_display_freq).powf(proportion);

    let depth = f64::from(point.y - bounds.y) / f64::from(bounds.height);
    let level_db = f64::from(config.analyzer_floor_db) * depth;

    AnalyzerPeak { frequency_hz, level_db }
}

/// Interleaved samples scaled to `-1.0..1.0`
fn read_samples<R: std::io::Read>(reader: WavReader<R>) -> anyhow::Result<Vec<f32>> {
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(samples)
}

fn write_samples(path: &Path, spec: WavSpec, samples: &[f32]) -> anyhow::Result<()> {
    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("Failed to create {}", path.display()))?;

    match spec.sample_format {
        SampleFormat::Float => {
            for &sample in samples {
                writer.write_sample(sample)?;
            }
        }
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            let max = scale - 1.0;
            for &sample in samples {
                let value = (sample * scale).round().clamp(-scale, max);
                writer.write_sample(value as i32)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

fn int_scale(bits_per_sample: u16) -> f32 {
    (1_u64 << (bits_per_sample.clamp(1, 32) - 1)) as f32
}
