//! Settings snapshot consumed by the filter chain

use serde::{Deserialize, Serialize};

use super::params::ParamId;

/// Cut filter slope
///
/// Each step adds one second-order section (12 dB/octave) to the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Slope {
    /// 12 dB/octave, one section
    #[default]
    Slope12,
    /// 24 dB/octave, two sections
    Slope24,
    /// 36 dB/octave, three sections
    Slope36,
    /// 48 dB/octave, four sections
    Slope48,
}

impl Slope {
    /// All slopes, steepest last
    pub const ALL: [Slope; 4] = [Slope::Slope12, Slope::Slope24, Slope::Slope36, Slope::Slope48];

    /// Slope from a choice index, clamped into `0..=3`
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Slope::Slope12,
            1 => Slope::Slope24,
            2 => Slope::Slope36,
            _ => Slope::Slope48,
        }
    }

    /// Choice index `0..=3`
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Number of cascaded biquad sections
    pub const fn stage_count(self) -> usize {
        self.index() + 1
    }

    /// Butterworth filter order realized by the cascade
    pub const fn order(self) -> usize {
        2 * self.stage_count()
    }

    /// Roll-off in dB per octave
    pub const fn db_per_octave(self) -> u32 {
        12 * self.stage_count() as u32
    }
}

/// Snapshot of every user-facing parameter for one update cycle
///
/// Built atomically per field from [`crate::EqParameters`] once per audio
/// block and once on state restore. Immutable once captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainSettings {
    /// Low-cut cutoff in Hz
    pub low_cut_freq: f32,
    /// High-cut cutoff in Hz
    pub high_cut_freq: f32,
    /// Peak center frequency in Hz
    pub peak_freq: f32,
    /// Peak gain in dB
    pub peak_gain_db: f32,
    /// Peak quality factor
    pub peak_quality: f32,
    /// Low-cut slope
    pub low_cut_slope: Slope,
    /// High-cut slope
    pub high_cut_slope: Slope,
    /// Low-cut group bypassed
    pub low_cut_bypassed: bool,
    /// Peak band bypassed
    pub peak_bypassed: bool,
    /// High-cut group bypassed
    pub high_cut_bypassed: bool,
    /// Analyzer overlay enabled
    pub analyzer_enabled: bool,
}

impl ChainSettings {
    /// Copy with every numeric field forced into its parameter domain
    ///
    /// Non-finite values fall back to the parameter default.
    pub fn clamped(&self) -> Self {
        let clamp = |id: ParamId, value: f32| {
            if value.is_finite() {
                let range = id.spec().range();
                value.clamp(range.start, range.end)
            } else {
                id.default_value()
            }
        };

        Self {
            low_cut_freq: clamp(ParamId::LowCutFreq, self.low_cut_freq),
            high_cut_freq: clamp(ParamId::HighCutFreq, self.high_cut_freq),
            peak_freq: clamp(ParamId::PeakFreq, self.peak_freq),
            peak_gain_db: clamp(ParamId::PeakGain, self.peak_gain_db),
            peak_quality: clamp(ParamId::PeakQuality, self.peak_quality),
            ..*self
        }
    }

    /// Plain parameter value as stored by the parameter store
    pub fn value(&self, id: ParamId) -> f32 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        match id {
            ParamId::LowCutFreq => self.low_cut_freq,
            ParamId::HighCutFreq => self.high_cut_freq,
            ParamId::PeakFreq => self.peak_freq,
            ParamId::PeakGain => self.peak_gain_db,
            ParamId::PeakQuality => self.peak_quality,
            ParamId::LowCutSlope => self.low_cut_slope.index() as f32,
            ParamId::HighCutSlope => self.high_cut_slope.index() as f32,
            ParamId::LowCutBypassed => flag(self.low_cut_bypassed),
            ParamId::PeakBypassed => flag(self.peak_bypassed),
            ParamId::HighCutBypassed => flag(self.high_cut_bypassed),
            ParamId::AnalyzerEnabled => flag(self.analyzer_enabled),
        }
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            low_cut_freq: ParamId::LowCutFreq.default_value(),
            high_cut_freq: ParamId::HighCutFreq.default_value(),
            peak_freq: ParamId::PeakFreq.default_value(),
            peak_gain_db: ParamId::PeakGain.default_value(),
            peak_quality: ParamId::PeakQuality.default_value(),
            low_cut_slope: Slope::Slope12,
            high_cut_slope: Slope::Slope12,
            low_cut_bypassed: false,
            peak_bypassed: false,
            high_cut_bypassed: false,
            analyzer_enabled: true,
        }
    }
}
