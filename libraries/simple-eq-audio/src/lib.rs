//! Simple EQ Audio
//!
//! Real-time processing and analysis for the Simple EQ three-band equalizer.
//!
//! This crate provides:
//! - Coefficient factory: RBJ peak and Butterworth cut cascades
//! - Per-channel nine-stage filter chain with slope selection and bypass
//! - [`EqProcessor`]: the host-facing engine (layout, prepare, block callback)
//! - Lock-free hand-off to the display: published coefficients and
//!   post-filter sample queues
//! - Spectrum pipeline turning queued audio into analyzer polylines
//! - Magnitude response curve for the display
//!
//! # Threads
//!
//! ```text
//! audio thread                         display thread
//! ------------                         --------------
//! EqProcessor::process_block
//!   ├─ EqParameters::snapshot  ◀────── parameter writes (any thread)
//!   ├─ FilterChain × 2
//!   ├─ CoefficientPublisher ─────────▶ CoefficientReader → ResponseCurve
//!   └─ SingleChannelSampleFifo × 2 ──▶ AnalyzerFeed → SpectrumAnalyzer
//! ```
//!
//! # Example
//!
//! ```rust
//! use simple_eq_audio::{EqProcessor, Rect, SpectrumAnalyzer};
//! use simple_eq_core::{EqConfig, EqParameters, ParamId};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = Arc::new(EqParameters::new());
//! params.set(ParamId::PeakFreq, 1000.0);
//! params.set(ParamId::PeakGain, 6.0);
//!
//! let config = EqConfig::default();
//! let mut eq = EqProcessor::new(Arc::clone(&params), config.clone());
//! eq.prepare(48000.0, 512)?;
//!
//! let feed = eq.take_analyzer_feed().expect("fresh after prepare");
//! let mut analyzer = SpectrumAnalyzer::new(feed, &config)?;
//!
//! let mut left = vec![0.0_f32; 512];
//! let mut right = vec![0.0_f32; 512];
//! eq.process_block(&mut [&mut left, &mut right]);
//!
//! analyzer.process(Rect::new(0.0, 0.0, 600.0, 300.0), 48000.0, true);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod dsp;
mod error;
pub mod fifo;
pub mod geometry;
mod processor;
pub mod publish;
pub mod response;
pub mod spectrum;

pub use dsp::{BiquadCoefficients, ChainCoefficients, ChainPosition, CutCoefficients, CutKind, FilterChain};
pub use error::{AudioError, Result};
pub use fifo::{sample_queue, BlockConsumer, BlockProducer, SingleChannelSampleFifo};
pub use geometry::{Point, Polyline, Rect};
pub use processor::{BusesLayout, EqProcessor};
pub use publish::{BandCoefficients, CoefficientPublisher, CoefficientReader, PublishedCoefficients};
pub use response::ResponseCurve;
pub use spectrum::{AnalyzerFeed, SpectrumAnalyzer};
