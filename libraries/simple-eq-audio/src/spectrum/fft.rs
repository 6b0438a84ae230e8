//! FFT data generator
//!
//! Turns a window of time-domain samples into `fft_size / 2` magnitudes in
//! dB. Finished blocks are queued in a small ring that overwrites the
//! oldest entry when the renderer falls behind.

use ringbuf::traits::{Consumer, Observer, RingBuffer};
use ringbuf::HeapRb;
use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use simple_eq_core::config::{MAX_FFT_ORDER, MIN_FFT_ORDER};
use std::sync::Arc;

use crate::error::{AudioError, Result};

/// Windowed forward FFT with a queue of finished magnitude blocks
pub struct FftDataGenerator {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex32>,
    scratch: Vec<Complex32>,
    queue: HeapRb<Vec<f32>>,
}

impl FftDataGenerator {
    /// Create a generator for `2^order` points, keeping up to `queue_depth`
    /// finished blocks
    pub fn new(order: usize, queue_depth: usize) -> Result<Self> {
        if !(MIN_FFT_ORDER..=MAX_FFT_ORDER).contains(&order) {
            return Err(AudioError::InvalidFftOrder(order));
        }

        let size = 1 << order;
        let fft = FftPlanner::<f32>::new().plan_fft_forward(size);
        let scratch = vec![Complex32::default(); fft.get_inplace_scratch_len()];

        Ok(Self {
            fft,
            window: blackman_harris(size),
            buffer: vec![Complex32::default(); size],
            scratch,
            queue: HeapRb::new(queue_depth.max(1)),
        })
    }

    /// FFT length in samples
    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Number of magnitude bins per block
    pub fn num_bins(&self) -> usize {
        self.fft_size() / 2
    }

    /// Analyze `audio` and queue the result
    ///
    /// Uses the first `fft_size` samples (zero-padded when shorter). Each
    /// bin is normalized by the bin count and converted to dB; anything
    /// quieter than `floor_db` reads as `floor_db`.
    pub fn produce_fft_data_for_rendering(&mut self, audio: &[f32], floor_db: f32) {
        let size = self.fft_size();
        let available = audio.len().min(size);

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < available { audio[i] } else { 0.0 };
            *slot = Complex32::new(sample * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let num_bins = self.num_bins();
        let data: Vec<f32> = self.buffer[..num_bins]
            .iter()
            .map(|bin| gain_to_decibels(bin.norm() / num_bins as f32, floor_db))
            .collect();

        self.queue.push_overwrite(data);
    }

    /// Number of queued magnitude blocks
    pub fn num_available_fft_data_blocks(&self) -> usize {
        self.queue.occupied_len()
    }

    /// Oldest queued magnitude block
    pub fn get_fft_data(&mut self) -> Option<Vec<f32>> {
        self.queue.try_pop()
    }
}

impl std::fmt::Debug for FftDataGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftDataGenerator")
            .field("fft_size", &self.fft_size())
            .field("queued", &self.num_available_fft_data_blocks())
            .finish_non_exhaustive()
    }
}

/// Linear gain to dB, clamped at `floor_db`
pub fn gain_to_decibels(gain: f32, floor_db: f32) -> f32 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(floor_db)
    } else {
        floor_db
    }
}

/// Four-term Blackman-Harris window, scaled so its samples sum to `size`
///
/// The scaling makes a full-scale sine centered on a bin read 0 dB.
fn blackman_harris(size: usize) -> Vec<f32> {
    const A0: f64 = 0.35875;
    const A1: f64 = 0.48829;
    const A2: f64 = 0.14128;
    const A3: f64 = 0.01168;

    let span = (size - 1).max(1) as f64;
    let raw: Vec<f64> = (0..size)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * i as f64 / span;
            A0 - A1 * phase.cos() + A2 * (2.0 * phase).cos() - A3 * (3.0 * phase).cos()
        })
        .collect();

    let sum: f64 = raw.iter().sum();
    let scale = if sum > 0.0 { size as f64 / sum } else { 1.0 };

    raw.into_iter().map(|w| (w * scale) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn rejects_bad_orders() {
        assert!(matches!(
            FftDataGenerator::new(2, 4),
            Err(AudioError::InvalidFftOrder(2))
        ));
        assert!(FftDataGenerator::new(20, 4).is_err());
    }

    #[test]
    fn window_is_normalized() {
        let window = blackman_harris(2048);
        let sum: f32 = window.iter().sum();
        assert!((sum - 2048.0).abs() < 0.5);
        assert!(window[0] < 1e-3);
    }

    #[test]
    fn silence_reads_floor() {
        let mut generator = FftDataGenerator::new(9, 4).unwrap();
        generator.produce_fft_data_for_rendering(&[0.0; 512], -48.0);

        let data = generator.get_fft_data().unwrap();
        assert_eq!(data.len(), 256);
        assert!(data.iter().all(|&db| db == -48.0));
    }

    #[test]
    fn bin_centered_sine_reads_near_zero_db() {
        // 1500 Hz at 48 kHz with 1024 points is exactly bin 32
        let mut generator = FftDataGenerator::new(10, 4).unwrap();
        generator.produce_fft_data_for_rendering(&sine(1500.0, 48000.0, 1024), -48.0);

        let data = generator.get_fft_data().unwrap();
        let (peak_bin, peak_db) = data
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();

        assert_eq!(peak_bin, 32);
        assert!(peak_db.abs() < 0.5, "peak {peak_db} dB");
    }

    #[test]
    fn queue_drops_oldest() {
        let mut generator = FftDataGenerator::new(5, 2).unwrap();
        generator.produce_fft_data_for_rendering(&[0.0; 32], -48.0);
        generator.produce_fft_data_for_rendering(&sine(3000.0, 48000.0, 32), -48.0);
        generator.produce_fft_data_for_rendering(&sine(6000.0, 48000.0, 32), -48.0);

        assert_eq!(generator.num_available_fft_data_blocks(), 2);

        // The silent block was overwritten
        let first = generator.get_fft_data().unwrap();
        assert!(first.iter().any(|&db| db > -48.0));
    }
}
