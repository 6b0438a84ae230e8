//! Filter coefficient factory
//!
//! Pure functions turning a [`ChainSettings`] snapshot into normalized biquad
//! coefficients. Everything is computed in f64 and rounded once to f32.
//!
//! - Peak band: RBJ peaking EQ
//! - Cut bands: Butterworth design of order `2 * (slope + 1)`, realized as
//!   `slope + 1` second-order sections with bilinear-transform prewarping

use rustfft::num_complex::Complex64;
use simple_eq_core::{ChainSettings, Slope};
use std::f64::consts::PI;

/// Maximum number of sections in a cut cascade (48 dB/oct)
pub const MAX_CUT_STAGES: usize = 4;

/// Lowest cutoff the factory will design for
const MIN_CUTOFF_HZ: f64 = 20.0;

/// Cutoffs are clamped above this fraction of the sample rate
///
/// Keeps `1 + a1 + a2` of a cut section (about `4·tan²(π·f/fs)`) several
/// f32 ulps above zero, so rounding cannot put a pole on the unit circle.
const MIN_CUTOFF_RATIO: f64 = 1e-4;

/// Cutoffs are clamped below this fraction of the sample rate
const MAX_CUTOFF_RATIO: f64 = 0.45;

/// Normalized biquad coefficients (a0 == 1)
///
/// Transfer function:
/// `H(z) = (b0 + b1·z⁻¹ + b2·z⁻²) / (1 + a1·z⁻¹ + a2·z⁻²)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Pass-through section
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Normalize raw coefficients by `a0` and round to f32
    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: (b0 / a0) as f32,
            b1: (b1 / a0) as f32,
            b2: (b2 / a0) as f32,
            a1: (a1 / a0) as f32,
            a2: (a2 / a0) as f32,
        }
    }

    /// Linear magnitude of the response at `frequency`
    pub fn magnitude_for_frequency(&self, frequency: f64, sample_rate: f64) -> f64 {
        if !valid_sample_rate(sample_rate) || !frequency.is_finite() {
            return 1.0;
        }

        let omega = 2.0 * PI * frequency / sample_rate;
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;

        let numerator = Complex64::new(f64::from(self.b0), 0.0)
            + z1 * f64::from(self.b1)
            + z2 * f64::from(self.b2);
        let denominator =
            Complex64::new(1.0, 0.0) + z1 * f64::from(self.a1) + z2 * f64::from(self.a2);

        (numerator / denominator).norm()
    }

    /// Both poles strictly inside the unit circle (stability triangle)
    pub fn is_stable(&self) -> bool {
        let a1 = f64::from(self.a1);
        let a2 = f64::from(self.a2);
        a2.abs() < 1.0 && a1.abs() < 1.0 + a2
    }

    /// Every coefficient is a finite number
    pub fn is_finite(&self) -> bool {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
            .iter()
            .all(|c| c.is_finite())
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Direction of a cut filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// Removes content below the cutoff (high-pass)
    LowCut,
    /// Removes content above the cutoff (low-pass)
    HighCut,
}

/// Fixed-capacity cascade of 1..=4 biquad sections
///
/// Stored inline so building one on the audio thread never allocates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutCoefficients {
    sections: [BiquadCoefficients; MAX_CUT_STAGES],
    len: usize,
}

impl CutCoefficients {
    /// Single pass-through section
    pub const IDENTITY: Self = Self {
        sections: [BiquadCoefficients::IDENTITY; MAX_CUT_STAGES],
        len: 1,
    };

    /// Cascade from a slice of sections, truncated to [`MAX_CUT_STAGES`]
    pub fn from_sections(sections: &[BiquadCoefficients]) -> Self {
        let mut cut = Self {
            sections: [BiquadCoefficients::IDENTITY; MAX_CUT_STAGES],
            len: sections.len().min(MAX_CUT_STAGES),
        };
        cut.sections[..cut.len].copy_from_slice(&sections[..cut.len]);
        cut
    }

    /// Number of active sections
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the cascade holds no sections
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Active sections in processing order
    pub fn as_slice(&self) -> &[BiquadCoefficients] {
        &self.sections[..self.len]
    }

    /// Section at `index`, if active
    pub fn get(&self, index: usize) -> Option<&BiquadCoefficients> {
        self.as_slice().get(index)
    }

    /// Iterate over active sections
    pub fn iter(&self) -> std::slice::Iter<'_, BiquadCoefficients> {
        self.as_slice().iter()
    }

    /// Product of the section magnitudes at `frequency`
    pub fn magnitude_for_frequency(&self, frequency: f64, sample_rate: f64) -> f64 {
        self.iter()
            .map(|section| section.magnitude_for_frequency(frequency, sample_rate))
            .product()
    }
}

impl Default for CutCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl<'a> IntoIterator for &'a CutCoefficients {
    type Item = &'a BiquadCoefficients;
    type IntoIter = std::slice::Iter<'a, BiquadCoefficients>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn valid_sample_rate(sample_rate: f64) -> bool {
    sample_rate.is_finite() && sample_rate > 0.0
}

fn clamp_cutoff(frequency: f64, sample_rate: f64) -> f64 {
    let frequency = if frequency.is_finite() {
        frequency
    } else {
        MIN_CUTOFF_HZ
    };
    let upper = sample_rate * MAX_CUTOFF_RATIO;
    let lower = MIN_CUTOFF_HZ.max(sample_rate * MIN_CUTOFF_RATIO).min(upper);
    frequency.clamp(lower, upper)
}

/// RBJ peaking EQ section for the settings' peak band
///
/// The linear gain at the center frequency is `10^(gain_db / 20)`.
pub fn make_peak_filter(settings: &ChainSettings, sample_rate: f64) -> BiquadCoefficients {
    if !valid_sample_rate(sample_rate) {
        return BiquadCoefficients::IDENTITY;
    }

    let frequency = clamp_cutoff(f64::from(settings.peak_freq), sample_rate);
    let quality = finite_or(settings.peak_quality, 1.0).clamp(0.1, 10.0);
    let gain_db = finite_or(settings.peak_gain_db, 0.0).clamp(-24.0, 24.0);

    let a = 10.0_f64.powf(gain_db / 40.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let sin_omega = omega.sin();
    let cos_omega = omega.cos();
    let alpha = sin_omega / (2.0 * quality);

    BiquadCoefficients::normalized(
        1.0 + alpha * a,
        -2.0 * cos_omega,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos_omega,
        1.0 - alpha / a,
    )
}

fn finite_or(value: f32, fallback: f64) -> f64 {
    if value.is_finite() {
        f64::from(value)
    } else {
        fallback
    }
}

/// Butterworth section quality for section `index` of an `order`-pole design
fn butterworth_q(index: usize, order: usize) -> f64 {
    let angle = (2 * index + 1) as f64 * PI / (2 * order) as f64;
    1.0 / (2.0 * angle.cos())
}

fn high_pass_section(frequency: f64, sample_rate: f64, quality: f64) -> BiquadCoefficients {
    let n = (PI * frequency / sample_rate).tan();
    let n2 = n * n;
    let c1 = 1.0 / (1.0 + n / quality + n2);

    // Double zero at DC: b1 == -2·b0 exactly after rounding
    let b0 = c1 as f32;
    BiquadCoefficients {
        b0,
        b1: -2.0 * b0,
        b2: b0,
        a1: (c1 * 2.0 * (n2 - 1.0)) as f32,
        a2: (c1 * (1.0 - n / quality + n2)) as f32,
    }
}

fn low_pass_section(frequency: f64, sample_rate: f64, quality: f64) -> BiquadCoefficients {
    let n = 1.0 / (PI * frequency / sample_rate).tan();
    let n2 = n * n;
    let c1 = 1.0 / (1.0 + n / quality + n2);

    // Double zero at Nyquist: b1 == 2·b0 exactly after rounding
    let b0 = c1 as f32;
    BiquadCoefficients {
        b0,
        b1: 2.0 * b0,
        b2: b0,
        a1: (c1 * 2.0 * (1.0 - n2)) as f32,
        a2: (c1 * (1.0 - n / quality + n2)) as f32,
    }
}

/// Butterworth cut cascade of `slope.stage_count()` sections
pub fn make_cut_coefficients(
    kind: CutKind,
    cutoff_hz: f64,
    sample_rate: f64,
    slope: Slope,
) -> CutCoefficients {
    let stages = slope.stage_count();

    if !valid_sample_rate(sample_rate) {
        let mut cut = CutCoefficients::IDENTITY;
        cut.len = stages;
        return cut;
    }

    let frequency = clamp_cutoff(cutoff_hz, sample_rate);
    let order = slope.order();

    let mut sections = [BiquadCoefficients::IDENTITY; MAX_CUT_STAGES];
    for (index, section) in sections.iter_mut().take(stages).enumerate() {
        let quality = butterworth_q(index, order);
        *section = match kind {
            CutKind::LowCut => high_pass_section(frequency, sample_rate, quality),
            CutKind::HighCut => low_pass_section(frequency, sample_rate, quality),
        };
    }

    CutCoefficients {
        sections,
        len: stages,
    }
}

/// High-pass cascade for the settings' low-cut band
pub fn make_low_cut_filter(settings: &ChainSettings, sample_rate: f64) -> CutCoefficients {
    make_cut_coefficients(
        CutKind::LowCut,
        f64::from(settings.low_cut_freq),
        sample_rate,
        settings.low_cut_slope,
    )
}

/// Low-pass cascade for the settings' high-cut band
pub fn make_high_cut_filter(settings: &ChainSettings, sample_rate: f64) -> CutCoefficients {
    make_cut_coefficients(
        CutKind::HighCut,
        f64::from(settings.high_cut_freq),
        sample_rate,
        settings.high_cut_slope,
    )
}

/// Every coefficient one processing block needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainCoefficients {
    /// Low-cut cascade
    pub low_cut: CutCoefficients,
    /// Peak band
    pub peak: BiquadCoefficients,
    /// High-cut cascade
    pub high_cut: CutCoefficients,
    /// Low-cut group bypassed
    pub low_cut_bypassed: bool,
    /// Peak band bypassed
    pub peak_bypassed: bool,
    /// High-cut group bypassed
    pub high_cut_bypassed: bool,
}

impl ChainCoefficients {
    /// Build the whole chain from a settings snapshot
    pub fn from_settings(settings: &ChainSettings, sample_rate: f64) -> Self {
        Self {
            low_cut: make_low_cut_filter(settings, sample_rate),
            peak: make_peak_filter(settings, sample_rate),
            high_cut: make_high_cut_filter(settings, sample_rate),
            low_cut_bypassed: settings.low_cut_bypassed,
            peak_bypassed: settings.peak_bypassed,
            high_cut_bypassed: settings.high_cut_bypassed,
        }
    }

    /// Combined magnitude of every non-bypassed section, linear
    pub fn magnitude_for_frequency(&self, frequency: f64, sample_rate: f64) -> f64 {
        let mut magnitude = 1.0;

        if !self.low_cut_bypassed {
            magnitude *= self.low_cut.magnitude_for_frequency(frequency, sample_rate);
        }
        if !self.peak_bypassed {
            magnitude *= self.peak.magnitude_for_frequency(frequency, sample_rate);
        }
        if !self.high_cut_bypassed {
            magnitude *= self.high_cut.magnitude_for_frequency(frequency, sample_rate);
        }

        magnitude
    }

    /// Combined magnitude in dB
    ///
    /// 0 dB when the sample rate is unknown. Very deep notches are floored
    /// at -300 dB rather than returning negative infinity.
    pub fn magnitude_db(&self, frequency: f64, sample_rate: f64) -> f64 {
        if !valid_sample_rate(sample_rate) {
            return 0.0;
        }
        gain_to_db(self.magnitude_for_frequency(frequency, sample_rate))
    }
}

impl Default for ChainCoefficients {
    fn default() -> Self {
        Self {
            low_cut: CutCoefficients::IDENTITY,
            peak: BiquadCoefficients::IDENTITY,
            high_cut: CutCoefficients::IDENTITY,
            low_cut_bypassed: false,
            peak_bypassed: false,
            high_cut_bypassed: false,
        }
    }
}

fn gain_to_db(gain: f64) -> f64 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(-300.0)
    } else {
        -300.0
    }
}
