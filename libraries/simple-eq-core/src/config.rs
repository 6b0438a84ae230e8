//! Engine and analyzer configuration

use serde::{Deserialize, Serialize};

use crate::error::{EqError, Result};

/// Smallest FFT order accepted by the analyzer (32 points)
pub const MIN_FFT_ORDER: usize = 5;

/// Largest FFT order accepted by the analyzer (32768 points)
pub const MAX_FFT_ORDER: usize = 15;

/// Tunables for the sample FIFOs, spectrum pipeline and display mapping
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EqConfig {
    /// FFT size is `2^fft_order`
    #[serde(default = "default_fft_order")]
    pub fft_order: usize,

    /// Analyzer floor in dB; quieter bins clamp to it
    #[serde(default = "default_analyzer_floor_db")]
    pub analyzer_floor_db: f32,

    /// Depth of each channel's sample FIFO, in blocks
    #[serde(default = "default_fifo_depth")]
    pub fifo_depth: usize,

    /// Depth of the FFT data queue per channel
    #[serde(default = "default_fft_queue_depth")]
    pub fft_queue_depth: usize,

    /// Depth of the generated path queue per channel
    #[serde(default = "default_path_queue_depth")]
    pub path_queue_depth: usize,

    /// Emit one path point every `path_resolution` bins
    #[serde(default = "default_path_resolution")]
    pub path_resolution: usize,

    /// Lowest displayed frequency in Hz
    #[serde(default = "default_min_display_freq")]
    pub min_display_freq: f64,

    /// Highest displayed frequency in Hz
    #[serde(default = "default_max_display_freq")]
    pub max_display_freq: f64,

    /// Response curve spans `-response_range_db..=response_range_db`
    #[serde(default = "default_response_range_db")]
    pub response_range_db: f64,

    /// Pre-allocated coefficient handles the engine cycles through
    #[serde(default = "default_publish_slots")]
    pub publish_slots: usize,
}

impl EqConfig {
    /// FFT length in samples
    pub fn fft_size(&self) -> usize {
        1 << self.fft_order
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FFT_ORDER..=MAX_FFT_ORDER).contains(&self.fft_order) {
            return Err(EqError::config(format!(
                "fft_order must be within {}..={}, got {}",
                MIN_FFT_ORDER, MAX_FFT_ORDER, self.fft_order
            )));
        }

        if !self.analyzer_floor_db.is_finite() || self.analyzer_floor_db >= 0.0 {
            return Err(EqError::config(format!(
                "analyzer_floor_db must be negative, got {}",
                self.analyzer_floor_db
            )));
        }

        if self.fifo_depth == 0 || self.fft_queue_depth == 0 || self.path_queue_depth == 0 {
            return Err(EqError::config("queue depths must be at least 1"));
        }

        if self.path_resolution == 0 {
            return Err(EqError::config("path_resolution must be at least 1"));
        }

        if !(self.min_display_freq > 0.0 && self.min_display_freq < self.max_display_freq) {
            return Err(EqError::config(format!(
                "display range {}..{} Hz is empty",
                self.min_display_freq, self.max_display_freq
            )));
        }

        if !(self.response_range_db.is_finite() && self.response_range_db > 0.0) {
            return Err(EqError::config("response_range_db must be positive"));
        }

        if self.publish_slots < 2 {
            return Err(EqError::config("publish_slots must be at least 2"));
        }

        Ok(())
    }
}

// Default values
fn default_fft_order() -> usize {
    11
}

fn default_analyzer_floor_db() -> f32 {
    -48.0
}

fn default_fifo_depth() -> usize {
    30
}

fn default_fft_queue_depth() -> usize {
    30
}

fn default_path_queue_depth() -> usize {
    4
}

fn default_path_resolution() -> usize {
    2
}

fn default_min_display_freq() -> f64 {
    20.0
}

fn default_max_display_freq() -> f64 {
    20000.0
}

fn default_response_range_db() -> f64 {
    24.0
}

fn default_publish_slots() -> usize {
    4
}

impl Default for EqConfig {
    fn default() -> Self {
        Self {
            fft_order: default_fft_order(),
            analyzer_floor_db: default_analyzer_floor_db(),
            fifo_depth: default_fifo_depth(),
            fft_queue_depth: default_fft_queue_depth(),
            path_queue_depth: default_path_queue_depth(),
            path_resolution: default_path_resolution(),
            min_display_freq: default_min_display_freq(),
            max_display_freq: default_max_display_freq(),
            response_range_db: default_response_range_db(),
            publish_slots: default_publish_slots(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EqConfig::default();
        config.validate().unwrap();
        assert_eq!(config.fft_size(), 2048);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EqConfig = serde_json::from_str(r#"{"fft_order": 12}"#).unwrap();
        assert_eq!(config.fft_size(), 4096);
        assert_eq!(config.analyzer_floor_db, -48.0);
        assert_eq!(config.path_queue_depth, 4);
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            EqConfig { fft_order: 3, ..EqConfig::default() },
            EqConfig { analyzer_floor_db: 6.0, ..EqConfig::default() },
            EqConfig { fifo_depth: 0, ..EqConfig::default() },
            EqConfig { path_resolution: 0, ..EqConfig::default() },
            EqConfig { min_display_freq: 500.0, max_display_freq: 100.0, ..EqConfig::default() },
            EqConfig { publish_slots: 1, ..EqConfig::default() },
        ];

        for config in bad {
            assert!(matches!(config.validate(), Err(EqError::Config(_))));
        }
    }
}
