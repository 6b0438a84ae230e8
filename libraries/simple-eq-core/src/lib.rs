//! Simple EQ Core
//!
//! Host-agnostic parameter model, settings snapshot, persisted state and
//! configuration for the Simple EQ three-band equalizer.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Parameter registry**: [`ParamId`], its [`ParamRange`] and defaults
//! - **Settings snapshot**: [`ChainSettings`] captured once per audio block
//! - **Parameter store**: [`EqParameters`], lock-free per-parameter atomics
//!   shared between the host, the audio thread and the display
//! - **Persisted state**: JSON parameter tree save/restore
//! - **Error Handling**: Unified `EqError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use simple_eq_core::{EqParameters, ParamId, Slope};
//!
//! let params = EqParameters::new();
//! params.set(ParamId::PeakFreq, 1200.0);
//! params.set(ParamId::PeakGain, 4.5);
//! params.set(ParamId::LowCutSlope, 2.0);
//!
//! let settings = params.snapshot();
//! assert_eq!(settings.peak_freq, 1200.0);
//! assert_eq!(settings.low_cut_slope, Slope::Slope36);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod state;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::EqConfig;
pub use error::{EqError, Result};
pub use state::{PersistedState, STATE_VERSION};
pub use store::EqParameters;
pub use types::{ChainSettings, ParamId, ParamKind, ParamRange, ParamSpec, Slope, PARAM_COUNT};
