//! Direct Form I biquad section
//!
//! Two input and two output delay samples. Coefficients can be swapped at
//! any time without touching the delay line, so filter state carries over
//! parameter changes.

use super::coefficients::BiquadCoefficients;

/// Outputs below this magnitude are flushed to zero (denormal guard)
const DENORMAL_THRESHOLD: f32 = 1e-15;

/// Single biquad filter with running state
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coefficients: BiquadCoefficients,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Create a filter with the given coefficients and cleared state
    pub fn new(coefficients: BiquadCoefficients) -> Self {
        Self {
            coefficients,
            ..Self::default()
        }
    }

    /// Current coefficients
    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coefficients
    }

    /// Replace coefficients, keeping state
    #[inline]
    pub fn set_coefficients(&mut self, coefficients: BiquadCoefficients) {
        self.coefficients = coefficients;
    }

    /// Filter one sample
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let mut output =
            c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        if output.abs() < DENORMAL_THRESHOLD {
            output = 0.0;
        }

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Filter a buffer in place
    #[inline]
    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Clear the delay line (coefficients are kept)
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}
