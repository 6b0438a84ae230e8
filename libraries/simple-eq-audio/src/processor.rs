//! Audio engine
//!
//! Owns one [`FilterChain`] per channel, the producer halves of the sample
//! queues, and the coefficient publisher. The host calls [`EqProcessor::prepare`]
//! before playback and then one of the block callbacks per audio block.
//!
//! # Real-Time Constraints
//! `process_block` and `process_interleaved`:
//! - No allocations
//! - No locks and no logging
//! - Never fail; unsupported shapes leave the buffer untouched

use simple_eq_core::{ChainSettings, EqConfig, EqParameters};
use std::sync::Arc;

use crate::dsp::{ChainCoefficients, ChainPosition, FilterChain};
use crate::error::{AudioError, Result};
use crate::fifo::{sample_queue, SingleChannelSampleFifo};
use crate::publish::{BandCoefficients, CoefficientPublisher, CoefficientReader};
use crate::spectrum::AnalyzerFeed;

/// Channel counts of the host's input and output buses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusesLayout {
    pub input_channels: usize,
    pub output_channels: usize,
}

impl BusesLayout {
    pub const MONO: Self = Self::new(1, 1);
    pub const STEREO: Self = Self::new(2, 2);

    pub const fn new(input_channels: usize, output_channels: usize) -> Self {
        Self {
            input_channels,
            output_channels,
        }
    }
}

impl Default for BusesLayout {
    fn default() -> Self {
        Self::STEREO
    }
}

/// Three-band equalizer engine
pub struct EqProcessor {
    params: Arc<EqParameters>,
    config: EqConfig,
    layout: BusesLayout,

    sample_rate: f64,
    max_block_size: usize,
    prepared: bool,

    left_chain: FilterChain,
    right_chain: FilterChain,
    left_fifo: Option<SingleChannelSampleFifo>,
    right_fifo: Option<SingleChannelSampleFifo>,
    analyzer_feed: Option<AnalyzerFeed>,

    publisher: CoefficientPublisher,
    scratch: [Vec<f32>; 2],
}

impl EqProcessor {
    /// Create an unprepared engine reading from `params`
    pub fn new(params: Arc<EqParameters>, config: EqConfig) -> Self {
        let publisher = CoefficientPublisher::new(config.publish_slots);

        Self {
            params,
            config,
            layout: BusesLayout::default(),
            sample_rate: 0.0,
            max_block_size: 0,
            prepared: false,
            left_chain: FilterChain::new(),
            right_chain: FilterChain::new(),
            left_fifo: None,
            right_fifo: None,
            analyzer_feed: None,
            publisher,
            scratch: [Vec::new(), Vec::new()],
        }
    }

    /// Only mono→mono and stereo→stereo are supported
    pub fn is_buses_layout_supported(layout: &BusesLayout) -> bool {
        matches!(layout.output_channels, 1 | 2) && layout.input_channels == layout.output_channels
    }

    /// Switch the bus layout
    pub fn set_buses_layout(&mut self, layout: BusesLayout) -> Result<()> {
        if !Self::is_buses_layout_supported(&layout) {
            tracing::warn!(
                "Rejecting bus layout {} in / {} out",
                layout.input_channels,
                layout.output_channels
            );
            return Err(AudioError::UnsupportedLayout {
                inputs: layout.input_channels,
                outputs: layout.output_channels,
            });
        }

        self.layout = layout;
        Ok(())
    }

    /// Current bus layout
    pub fn buses_layout(&self) -> BusesLayout {
        self.layout
    }

    /// Get ready to process at `sample_rate` with blocks of at most
    /// `max_block_size` frames
    ///
    /// Resets both chains, replaces both sample queues (a fresh
    /// [`AnalyzerFeed`] becomes available) and rebuilds all coefficients.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> Result<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(AudioError::InvalidSampleRate(sample_rate));
        }
        if max_block_size == 0 {
            return Err(AudioError::InvalidBlockSize(max_block_size));
        }
        self.config.validate()?;

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;

        self.left_chain.reset();
        self.right_chain.reset();

        let (left_producer, left_consumer) = sample_queue(max_block_size, self.config.fifo_depth);
        let (right_producer, right_consumer) = sample_queue(max_block_size, self.config.fifo_depth);
        self.left_fifo = Some(SingleChannelSampleFifo::new(left_producer));
        self.right_fifo = Some(SingleChannelSampleFifo::new(right_producer));
        self.analyzer_feed = Some(AnalyzerFeed {
            left: left_consumer,
            right: right_consumer,
            sample_rate,
        });

        self.scratch = [vec![0.0; max_block_size], vec![0.0; max_block_size]];

        self.update_filters();
        self.prepared = true;

        tracing::info!(
            "Prepared EQ: {} Hz, max block {} frames, {} channel(s)",
            sample_rate,
            max_block_size,
            self.layout.output_channels
        );

        Ok(())
    }

    /// Recompute every coefficient from the current parameters
    fn update_filters(&mut self) {
        let settings = self.params.snapshot().clamped();
        let coefficients = ChainCoefficients::from_settings(&settings, self.sample_rate);

        self.left_chain.apply(&coefficients);
        self.right_chain.apply(&coefficients);

        // A full pool is retried on the next block
        let _ = self.publisher.publish(&coefficients, self.sample_rate);
    }

    /// Process one planar block in place
    ///
    /// `channels[0]` is left, `channels[1]` right. A mono layout or a single
    /// channel uses the left chain and left queue only. Extra channels are
    /// left untouched, as is everything before `prepare`.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]]) {
        if !self.prepared || channels.is_empty() {
            return;
        }

        self.update_filters();

        let active = channels.len().min(self.layout.output_channels).min(2);

        if let Some(left) = channels.first_mut() {
            let left: &mut [f32] = left;
            self.left_chain.process(left);
            if let Some(fifo) = self.left_fifo.as_mut() {
                fifo.update(left);
            }
        }

        if active == 2 {
            if let Some(right) = channels.get_mut(1) {
                let right: &mut [f32] = right;
                self.right_chain.process(right);
                if let Some(fifo) = self.right_fifo.as_mut() {
                    fifo.update(right);
                }
            }
        }
    }

    /// Process interleaved frames in place
    ///
    /// Frames are split into chunks of `max_block_size`, deinterleaved into
    /// pre-allocated scratch, processed as planar blocks and written back.
    /// Trailing samples that do not form a whole frame are left untouched.
    pub fn process_interleaved(&mut self, data: &mut [f32], num_channels: usize) {
        if !self.prepared || num_channels == 0 {
            return;
        }

        let active = num_channels.min(self.layout.output_channels).min(2);
        let frames = data.len() / num_channels;
        let mut scratch = std::mem::take(&mut self.scratch);

        let mut start = 0;
        while start < frames {
            let len = (frames - start).min(self.max_block_size);
            let chunk = &mut data[start * num_channels..(start + len) * num_channels];

            for (frame_index, frame) in chunk.chunks_exact(num_channels).enumerate() {
                for (channel, buffer) in scratch.iter_mut().enumerate().take(active) {
                    buffer[frame_index] = frame[channel];
                }
            }

            {
                let (left, right) = scratch.split_at_mut(1);
                let left = &mut left[0][..len];
                let right = &mut right[0][..len];

                if active == 2 {
                    self.process_block(&mut [left, right]);
                } else {
                    self.process_block(&mut [left]);
                }
            }

            for (frame_index, frame) in chunk.chunks_exact_mut(num_channels).enumerate() {
                for (channel, buffer) in scratch.iter().enumerate().take(active) {
                    frame[channel] = buffer[frame_index];
                }
            }

            start += len;
        }

        self.scratch = scratch;
    }

    /// Current parameter snapshot, for the display
    pub fn chain_settings(&self) -> ChainSettings {
        self.params.snapshot()
    }

    /// Shared parameter store
    pub fn parameters(&self) -> &Arc<EqParameters> {
        &self.params
    }

    /// Reader for the coefficients published by this engine
    pub fn coefficient_reader(&self) -> CoefficientReader {
        self.publisher.reader()
    }

    /// Latest published coefficients of one chain group
    pub fn coefficients(&self, position: ChainPosition) -> BandCoefficients {
        self.publisher.reader().band(position)
    }

    /// Left channel chain, read-only
    pub fn left_chain(&self) -> &FilterChain {
        &self.left_chain
    }

    /// Right channel chain, read-only
    pub fn right_chain(&self) -> &FilterChain {
        &self.right_chain
    }

    /// Consumer side of the sample queues created by the last `prepare`
    pub fn take_analyzer_feed(&mut self) -> Option<AnalyzerFeed> {
        self.analyzer_feed.take()
    }

    /// Serialize all parameters
    pub fn get_state(&self) -> Result<Vec<u8>> {
        self.params.save_state().map_err(AudioError::from)
    }

    /// Restore parameters and rebuild every coefficient
    ///
    /// The rebuild also happens when the blob is rejected and the
    /// parameters fall back to their defaults.
    pub fn set_state(&mut self, data: &[u8]) -> Result<()> {
        let result = self.params.load_state(data);
        if self.prepared {
            self.update_filters();
        }
        result.map_err(AudioError::from)
    }

    /// Sample rate from the last `prepare` (0 before)
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Maximum block size from the last `prepare` (0 before)
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Whether `prepare` has succeeded
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Configuration in use
    pub fn config(&self) -> &EqConfig {
        &self.config
    }
}

impl std::fmt::Debug for EqProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EqProcessor")
            .field("layout", &self.layout)
            .field("sample_rate", &self.sample_rate)
            .field("max_block_size", &self.max_block_size)
            .field("prepared", &self.prepared)
            .finish_non_exhaustive()
    }
}
