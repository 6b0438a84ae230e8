//! Stereo spectrum analyzer, polled from the display timer

use simple_eq_core::EqConfig;

use super::producer::PathProducer;
use crate::error::Result;
use crate::fifo::BlockConsumer;
use crate::geometry::{Polyline, Rect};

/// Consumer halves of the engine's per-channel sample queues
///
/// Handed out by [`crate::EqProcessor::take_analyzer_feed`] after `prepare`.
#[derive(Debug)]
pub struct AnalyzerFeed {
    /// Post-filter left channel blocks
    pub left: BlockConsumer,
    /// Post-filter right channel blocks (stays empty for mono)
    pub right: BlockConsumer,
    /// Sample rate the engine was prepared with
    pub sample_rate: f64,
}

/// Left and right path producers; the two channels never share state
#[derive(Debug)]
pub struct SpectrumAnalyzer {
    left: PathProducer,
    right: PathProducer,
    sample_rate: f64,
    enabled: bool,
}

impl SpectrumAnalyzer {
    /// Build an analyzer over an engine's feed
    pub fn new(feed: AnalyzerFeed, config: &EqConfig) -> Result<Self> {
        Ok(Self {
            left: PathProducer::new(feed.left, config)?,
            right: PathProducer::new(feed.right, config)?,
            sample_rate: feed.sample_rate,
            enabled: true,
        })
    }

    /// One display tick
    ///
    /// When enabled both channels are analyzed into `bounds`. When disabled,
    /// pending audio is discarded so stale blocks never pile up in the
    /// queues. A sample rate that is not finite and positive is ignored in
    /// favor of the last good one.
    pub fn process(&mut self, bounds: Rect, sample_rate: f64, enabled: bool) {
        if enabled != self.enabled {
            tracing::debug!("Spectrum analyzer {}", if enabled { "enabled" } else { "disabled" });
            self.enabled = enabled;
        }
        if sample_rate.is_finite() && sample_rate > 0.0 {
            self.sample_rate = sample_rate;
        }

        if enabled {
            self.left.process(bounds, self.sample_rate);
            self.right.process(bounds, self.sample_rate);
        } else {
            self.left.discard_pending();
            self.right.discard_pending();
        }
    }

    /// Latest left channel path
    pub fn left_path(&self) -> &Polyline {
        self.left.path()
    }

    /// Latest right channel path
    pub fn right_path(&self) -> &Polyline {
        self.right.path()
    }

    /// Sample rate used on the last tick (the feed's until a valid one arrives)
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Whether the last tick analyzed audio
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// FFT length in samples
    pub fn fft_size(&self) -> usize {
        self.left.fft_size()
    }

    /// Sample blocks the engine dropped on both channels combined
    pub fn dropped_blocks(&self) -> u64 {
        self.left.dropped_blocks() + self.right.dropped_blocks()
    }
}
