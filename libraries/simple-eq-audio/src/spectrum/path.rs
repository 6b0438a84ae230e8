//! Analyzer path generator
//!
//! Maps a block of dB magnitudes onto a log-frequency polyline inside the
//! display bounds and queues the result (oldest dropped when full).

use ringbuf::traits::{Consumer, Observer, RingBuffer};
use ringbuf::HeapRb;

use crate::geometry::{map_from_log10, map_range, Point, Polyline, Rect};

/// Builds display polylines from FFT magnitude blocks
pub struct AnalyzerPathGenerator {
    resolution: usize,
    min_freq: f64,
    max_freq: f64,
    queue: HeapRb<Polyline>,
}

impl AnalyzerPathGenerator {
    /// `resolution`: emit a point every `resolution` bins.
    /// `min_freq..max_freq`: the displayed frequency span.
    pub fn new(resolution: usize, queue_depth: usize, min_freq: f64, max_freq: f64) -> Self {
        Self {
            resolution: resolution.max(1),
            min_freq,
            max_freq,
            queue: HeapRb::new(queue_depth.max(1)),
        }
    }

    /// Turn one magnitude block into a polyline and queue it
    ///
    /// The path starts at the left edge with bin 0's level. Each following
    /// point takes bin `1 + k·resolution`: x is the bin's center frequency
    /// on a log axis (floored to whole pixels), y maps `floor_db..0 dB` to
    /// `bottom..top`. Points with a non-finite coordinate are skipped, and bins above the
    /// displayed span end the path.
    pub fn generate_path(
        &mut self,
        data: &[f32],
        bounds: Rect,
        fft_size: usize,
        bin_width: f32,
        floor_db: f32,
    ) {
        let num_bins = (fft_size / 2).min(data.len());
        let top = f64::from(bounds.y);
        let bottom = f64::from(bounds.bottom());
        let width = f64::from(bounds.width);

        let map_level = |db: f32| map_range(f64::from(db), f64::from(floor_db), 0.0, bottom, top);

        let mut path = Polyline::with_capacity(num_bins / self.resolution + 1);

        if let Some(&first) = data.first() {
            let y = map_level(first);
            if y.is_finite() {
                path.push(Point::new(bounds.x, y as f32));
            }
        }

        for bin in (1..num_bins).step_by(self.resolution) {
            let frequency = bin as f64 * f64::from(bin_width);
            if frequency > self.max_freq {
                break;
            }

            let y = map_level(data[bin]);
            if !y.is_finite() {
                continue;
            }

            let proportion = map_from_log10(frequency, self.min_freq, self.max_freq);
            let x = (proportion * width).floor();
            if !x.is_finite() {
                continue;
            }
            path.push(Point::new(bounds.x + x as f32, y as f32));
        }

        self.queue.push_overwrite(path);
    }

    /// Number of queued paths
    pub fn num_paths_available(&self) -> usize {
        self.queue.occupied_len()
    }

    /// Oldest queued path
    pub fn get_path(&mut self) -> Option<Polyline> {
        self.queue.try_pop()
    }
}

impl std::fmt::Debug for AnalyzerPathGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerPathGenerator")
            .field("resolution", &self.resolution)
            .field("queued", &self.num_paths_available())
            .finish_non_exhaustive()
    }
}
