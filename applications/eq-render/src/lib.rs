//! Simple EQ Render Library
//!
//! Offline host for the Simple EQ engine: WAV rendering with analyzer
//! reporting, magnitude response export, and state file creation.
//!
//! This library exposes the command implementations for testing purposes.

pub mod config;
pub mod params;
pub mod render;
pub mod response;

// Re-export commonly used types for convenience
pub use params::{build_parameters, ParamOverride};
pub use render::{render, AnalyzerPeak, RenderOptions, RenderReport};
pub use response::{response_points, ResponsePoint};
