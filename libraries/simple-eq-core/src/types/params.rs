//! Parameter registry for Simple EQ
//!
//! Every user-facing knob is named by a single [`ParamId`] variant. The
//! stable string ID of each variant is what the persisted state is keyed by.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of registered parameters
pub const PARAM_COUNT: usize = 11;

/// Cut slope choices, index 0..=3
const SLOPE_CHOICES: &[&str] = &["12 db/Oct", "24 db/Oct", "36 db/Oct", "48 db/Oct"];

/// Identifier of a registered parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    /// Low-cut (high-pass) cutoff frequency in Hz
    LowCutFreq,
    /// High-cut (low-pass) cutoff frequency in Hz
    HighCutFreq,
    /// Peak band center frequency in Hz
    PeakFreq,
    /// Peak band gain in dB
    PeakGain,
    /// Peak band quality factor
    PeakQuality,
    /// Low-cut slope choice index
    LowCutSlope,
    /// High-cut slope choice index
    HighCutSlope,
    /// Low-cut group bypass
    LowCutBypassed,
    /// Peak band bypass
    PeakBypassed,
    /// High-cut group bypass
    HighCutBypassed,
    /// Spectrum analyzer overlay toggle
    AnalyzerEnabled,
}

impl ParamId {
    /// All parameters in registry order
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::LowCutFreq,
        ParamId::HighCutFreq,
        ParamId::PeakFreq,
        ParamId::PeakGain,
        ParamId::PeakQuality,
        ParamId::LowCutSlope,
        ParamId::HighCutSlope,
        ParamId::LowCutBypassed,
        ParamId::PeakBypassed,
        ParamId::HighCutBypassed,
        ParamId::AnalyzerEnabled,
    ];

    /// Position of this parameter in [`ParamId::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable string ID, also used as the display name
    pub const fn id(self) -> &'static str {
        match self {
            ParamId::LowCutFreq => "LowCut Freq",
            ParamId::HighCutFreq => "HighCut Freq",
            ParamId::PeakFreq => "Peak Freq",
            ParamId::PeakGain => "Peak Gain",
            ParamId::PeakQuality => "Peak Quality",
            ParamId::LowCutSlope => "LowCut Slope",
            ParamId::HighCutSlope => "HighCut Slope",
            ParamId::LowCutBypassed => "LowCut Bypassed",
            ParamId::PeakBypassed => "Peak Bypassed",
            ParamId::HighCutBypassed => "HighCut Bypassed",
            ParamId::AnalyzerEnabled => "Analyzer Enabled",
        }
    }

    /// Look up a parameter by its string ID
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|param| param.id() == id)
    }

    /// Registry entry (kind, range, default, unit)
    pub const fn spec(self) -> ParamSpec {
        const FREQ: ParamRange = ParamRange::new(20.0, 20000.0, 1.0, 0.25);

        match self {
            ParamId::LowCutFreq => ParamSpec::float(FREQ, 20.0, "Hz"),
            ParamId::HighCutFreq => ParamSpec::float(FREQ, 20000.0, "Hz"),
            ParamId::PeakFreq => ParamSpec::float(FREQ, 750.0, "Hz"),
            ParamId::PeakGain => ParamSpec::float(ParamRange::new(-24.0, 24.0, 0.5, 1.0), 0.0, "dB"),
            ParamId::PeakQuality => ParamSpec::float(ParamRange::new(0.1, 10.0, 0.05, 1.0), 1.0, ""),
            ParamId::LowCutSlope | ParamId::HighCutSlope => ParamSpec {
                kind: ParamKind::Choice(SLOPE_CHOICES),
                default: 0.0,
                unit: "db/Oct",
            },
            ParamId::LowCutBypassed | ParamId::PeakBypassed | ParamId::HighCutBypassed => {
                ParamSpec::toggle(false)
            }
            ParamId::AnalyzerEnabled => ParamSpec::toggle(true),
        }
    }

    /// Default plain value
    pub const fn default_value(self) -> f32 {
        self.spec().default
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Value kind of a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Continuous value within a range
    Float(ParamRange),
    /// Index into a list of labels
    Choice(&'static [&'static str]),
    /// On/off, stored as 0.0 / 1.0
    Bool,
}

/// Registry entry for a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Value kind
    pub kind: ParamKind,
    /// Default plain value
    pub default: f32,
    /// Display unit suffix
    pub unit: &'static str,
}

impl ParamSpec {
    const fn float(range: ParamRange, default: f32, unit: &'static str) -> Self {
        Self {
            kind: ParamKind::Float(range),
            default,
            unit,
        }
    }

    const fn toggle(default: bool) -> Self {
        Self {
            kind: ParamKind::Bool,
            default: if default { 1.0 } else { 0.0 },
            unit: "",
        }
    }

    /// Plain-value range of the parameter, choices and toggles included
    pub fn range(&self) -> ParamRange {
        match self.kind {
            ParamKind::Float(range) => range,
            ParamKind::Choice(choices) => {
                ParamRange::new(0.0, choices.len().saturating_sub(1) as f32, 1.0, 1.0)
            }
            ParamKind::Bool => ParamRange::new(0.0, 1.0, 1.0, 1.0),
        }
    }

    /// Label of a choice value, `None` for non-choice parameters
    pub fn choice_label(&self, value: f32) -> Option<&'static str> {
        match self.kind {
            ParamKind::Choice(choices) => {
                let index = (self.range().snap(value) as usize).min(choices.len().saturating_sub(1));
                choices.get(index).copied()
            }
            _ => None,
        }
    }
}

/// Plain-value range with snapping interval and skew
///
/// Normalized values live in `0.0..=1.0`. A skew below 1.0 spends more of
/// the normalized travel on the low end of the range, which is what makes
/// the frequency knobs feel logarithmic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Lowest plain value
    pub start: f32,
    /// Highest plain value
    pub end: f32,
    /// Snapping interval, 0.0 for continuous
    pub interval: f32,
    /// Skew exponent applied to the normalized proportion
    pub skew: f32,
}

impl ParamRange {
    /// Create a new range
    pub const fn new(start: f32, end: f32, interval: f32, skew: f32) -> Self {
        Self {
            start,
            end,
            interval,
            skew,
        }
    }

    /// Clamp into the range and round to the nearest interval step
    ///
    /// Rounding is done in f64 so on-grid values such as `1.0` on a
    /// `0.1..10.0 / 0.05` range come back bit-identical.
    pub fn snap(&self, value: f32) -> f32 {
        let start = f64::from(self.start);
        let end = f64::from(self.end);

        let value = if value.is_nan() { start } else { f64::from(value) };
        let mut snapped = value.clamp(start, end);

        if self.interval > 0.0 {
            let interval = f64::from(self.interval);
            snapped = start + interval * ((snapped - start) / interval).round();
            snapped = snapped.clamp(start, end);
        }

        snapped as f32
    }

    /// Convert a plain value to `0.0..=1.0`
    pub fn to_normalized(&self, value: f32) -> f32 {
        let span = f64::from(self.end) - f64::from(self.start);
        if span <= 0.0 {
            return 0.0;
        }

        let proportion = ((f64::from(value) - f64::from(self.start)) / span).clamp(0.0, 1.0);

        if (self.skew - 1.0).abs() > f32::EPSILON && proportion > 0.0 {
            proportion.powf(f64::from(self.skew)) as f32
        } else {
            proportion as f32
        }
    }

    /// Convert `0.0..=1.0` to a snapped plain value
    pub fn from_normalized(&self, normalized: f32) -> f32 {
        let mut proportion = f64::from(normalized.clamp(0.0, 1.0));

        if (self.skew - 1.0).abs() > f32::EPSILON && proportion > 0.0 {
            proportion = (proportion.ln() / f64::from(self.skew)).exp();
        }

        let span = f64::from(self.end) - f64::from(self.start);
        self.snap((f64::from(self.start) + span * proportion) as f32)
    }
}
