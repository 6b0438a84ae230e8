//! Domain types for Simple EQ

pub mod params;
pub mod settings;

pub use params::{ParamId, ParamKind, ParamRange, ParamSpec, PARAM_COUNT};
pub use settings::{ChainSettings, Slope};
