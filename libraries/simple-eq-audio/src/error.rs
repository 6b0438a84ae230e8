//! Audio engine errors

use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
///
/// Only raised at configuration time. The block callback never fails.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Bus layout other than mono→mono or stereo→stereo
    #[error("Unsupported bus layout: {inputs} in, {outputs} out")]
    UnsupportedLayout {
        /// Input channel count
        inputs: usize,
        /// Output channel count
        outputs: usize,
    },

    /// Sample rate not finite or not positive
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    /// Maximum block size of zero
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),

    /// FFT order outside the supported range
    #[error("Invalid FFT order: {0}")]
    InvalidFftOrder(usize),

    /// Parameter, state or configuration error
    #[error(transparent)]
    Core(#[from] simple_eq_core::EqError),
}
