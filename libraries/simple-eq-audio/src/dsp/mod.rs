//! Filter design and per-channel processing
//!
//! - [`coefficients`]: pure coefficient factory
//! - [`biquad`]: Direct Form I section
//! - [`chain`]: nine-stage cascade with group and stage bypass

pub mod biquad;
pub mod chain;
pub mod coefficients;

pub use biquad::Biquad;
pub use chain::{
    CascadeStage, ChainPosition, FilterChain, HIGH_CUT_START, LOW_CUT_START, PEAK_INDEX,
    STAGE_COUNT,
};
pub use coefficients::{
    make_cut_coefficients, make_high_cut_filter, make_low_cut_filter, make_peak_filter,
    BiquadCoefficients, ChainCoefficients, CutCoefficients, CutKind, MAX_CUT_STAGES,
};
