//! Lock-free parameter store
//!
//! One atomic 32-bit cell per parameter holding the plain `f32` value. Any
//! thread may write (host automation, UI, state restore); the audio thread
//! only reads, once per block, through [`EqParameters::snapshot`].

use std::sync::atomic::{AtomicU32, Ordering};

use crate::types::{ChainSettings, ParamId, Slope, PARAM_COUNT};

/// Shared parameter values for one equalizer instance
#[derive(Debug)]
pub struct EqParameters {
    values: [AtomicU32; PARAM_COUNT],
}

impl EqParameters {
    /// Create a store holding every parameter's default
    pub fn new() -> Self {
        let values = std::array::from_fn(|i| AtomicU32::new(ParamId::ALL[i].default_value().to_bits()));
        Self { values }
    }

    /// Create a store initialized from a settings snapshot
    pub fn with_settings(settings: &ChainSettings) -> Self {
        let params = Self::new();
        params.apply(settings);
        params
    }

    /// Current plain value
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Acquire))
    }

    /// Store a plain value, clamped and snapped to the parameter's range
    ///
    /// Returns the value actually stored.
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        let snapped = id.spec().range().snap(value);
        self.values[id.index()].store(snapped.to_bits(), Ordering::Release);
        snapped
    }

    /// Current value in `0.0..=1.0`
    pub fn get_normalized(&self, id: ParamId) -> f32 {
        id.spec().range().to_normalized(self.get(id))
    }

    /// Store a normalized `0.0..=1.0` value (host automation path)
    pub fn set_normalized(&self, id: ParamId, normalized: f32) -> f32 {
        let value = id.spec().range().from_normalized(normalized);
        self.values[id.index()].store(value.to_bits(), Ordering::Release);
        value
    }

    /// Toggle-style read for bool parameters
    #[inline]
    pub fn get_bool(&self, id: ParamId) -> bool {
        self.get(id) > 0.5
    }

    /// Toggle-style write for bool parameters
    pub fn set_bool(&self, id: ParamId, value: bool) {
        self.set(id, if value { 1.0 } else { 0.0 });
    }

    /// Capture every parameter into a settings snapshot
    ///
    /// Reads are atomic per field. Never allocates, safe on the audio thread.
    pub fn snapshot(&self) -> ChainSettings {
        ChainSettings {
            low_cut_freq: self.get(ParamId::LowCutFreq),
            high_cut_freq: self.get(ParamId::HighCutFreq),
            peak_freq: self.get(ParamId::PeakFreq),
            peak_gain_db: self.get(ParamId::PeakGain),
            peak_quality: self.get(ParamId::PeakQuality),
            low_cut_slope: Slope::from_index(self.get(ParamId::LowCutSlope) as usize),
            high_cut_slope: Slope::from_index(self.get(ParamId::HighCutSlope) as usize),
            low_cut_bypassed: self.get_bool(ParamId::LowCutBypassed),
            peak_bypassed: self.get_bool(ParamId::PeakBypassed),
            high_cut_bypassed: self.get_bool(ParamId::HighCutBypassed),
            analyzer_enabled: self.get_bool(ParamId::AnalyzerEnabled),
        }
    }

    /// Write every field of a settings snapshot
    pub fn apply(&self, settings: &ChainSettings) {
        for id in ParamId::ALL {
            self.set(id, settings.value(id));
        }
    }

    /// Restore every parameter to its default
    pub fn reset_to_defaults(&self) {
        for id in ParamId::ALL {
            self.values[id.index()].store(id.default_value().to_bits(), Ordering::Release);
        }
    }
}

impl Default for EqParameters {
    fn default() -> Self {
        Self::new()
    }
}
