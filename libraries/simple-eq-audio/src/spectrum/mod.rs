//! Spectrum analyzer pipeline
//!
//! Runs on the display thread. Sample blocks from the engine's queues flow
//! through:
//!
//! ```text
//! BlockConsumer → PathProducer (rolling window)
//!               → FftDataGenerator (window, FFT, dB)
//!               → AnalyzerPathGenerator (log-x polyline)
//! ```

pub mod analyzer;
pub mod fft;
pub mod path;
pub mod producer;

pub use analyzer::{AnalyzerFeed, SpectrumAnalyzer};
pub use fft::{gain_to_decibels, FftDataGenerator};
pub use path::AnalyzerPathGenerator;
pub use producer::PathProducer;
