//! Per-channel analyzer pipeline: sample blocks → FFT data → path

use simple_eq_core::EqConfig;

use super::fft::FftDataGenerator;
use super::path::AnalyzerPathGenerator;
use crate::error::Result;
use crate::fifo::BlockConsumer;
use crate::geometry::{Polyline, Rect};

/// Drains one channel's sample queue and keeps its latest analyzer path
#[derive(Debug)]
pub struct PathProducer {
    consumer: BlockConsumer,
    window: Vec<f32>,
    fft: FftDataGenerator,
    paths: AnalyzerPathGenerator,
    path: Polyline,
    floor_db: f32,
    dropped_seen: u64,
}

impl PathProducer {
    /// Build the pipeline for one channel
    pub fn new(consumer: BlockConsumer, config: &EqConfig) -> Result<Self> {
        let fft = FftDataGenerator::new(config.fft_order, config.fft_queue_depth)?;
        let paths = AnalyzerPathGenerator::new(
            config.path_resolution,
            config.path_queue_depth,
            config.min_display_freq,
            config.max_display_freq,
        );

        Ok(Self {
            consumer,
            window: vec![0.0; fft.fft_size()],
            fft,
            paths,
            path: Polyline::new(),
            floor_db: config.analyzer_floor_db,
            dropped_seen: 0,
        })
    }

    /// Consume every pending block and refresh the path
    ///
    /// Each block is shifted into a rolling window of `fft_size` samples
    /// which is analyzed once per block. Every resulting FFT block becomes a
    /// path; only the most recent one is kept.
    pub fn process(&mut self, bounds: Rect, sample_rate: f64) {
        let size = self.window.len();

        while let Some(block) = self.consumer.pop() {
            let samples = block.samples();
            let take = samples.len().min(size);
            if take == 0 {
                continue;
            }

            self.window.copy_within(take.., 0);
            self.window[size - take..].copy_from_slice(&samples[samples.len() - take..]);
            drop(block);

            self.fft
                .produce_fft_data_for_rendering(&self.window, self.floor_db);
        }

        let bin_width = (sample_rate / size as f64) as f32;
        while let Some(data) = self.fft.get_fft_data() {
            self.paths
                .generate_path(&data, bounds, size, bin_width, self.floor_db);
        }

        while let Some(path) = self.paths.get_path() {
            self.path = path;
        }

        self.report_drops();
    }

    /// Throw away pending audio without analyzing it
    pub fn discard_pending(&mut self) -> usize {
        let discarded = self.consumer.clear();
        self.report_drops();
        discarded
    }

    /// Latest generated path
    pub fn path(&self) -> &Polyline {
        &self.path
    }

    /// FFT length used by this producer
    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Blocks the audio thread dropped because this consumer fell behind
    pub fn dropped_blocks(&self) -> u64 {
        self.consumer.dropped()
    }

    fn report_drops(&mut self) {
        let dropped = self.consumer.dropped();
        if dropped > self.dropped_seen {
            tracing::debug!(
                "Analyzer fell behind, {} sample blocks dropped ({} total)",
                dropped - self.dropped_seen,
                dropped
            );
            self.dropped_seen = dropped;
        }
    }
}
