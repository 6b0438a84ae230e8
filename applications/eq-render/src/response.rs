//! Magnitude response export

use serde::Serialize;
use simple_eq_audio::{EqProcessor, ResponseCurve};
use simple_eq_core::{EqConfig, EqParameters};
use std::sync::Arc;

/// One sample of the response curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponsePoint {
    pub frequency_hz: f64,
    pub magnitude_db: f64,
}

/// Sample the chain's magnitude response at `points` log-spaced frequencies
///
/// The curve is read back through the same publisher the display uses.
pub fn response_points(
    params: Arc<EqParameters>,
    config: &EqConfig,
    sample_rate: f64,
    points: usize,
) -> anyhow::Result<Vec<ResponsePoint>> {
    let mut eq = EqProcessor::new(params, config.clone());
    eq.prepare(sample_rate, 64)?;

    let curve = ResponseCurve::new(eq.coefficient_reader(), config);
    let points = points.max(2);

    let response = curve
        .magnitudes(points)
        .into_iter()
        .enumerate()
        .map(|(i, magnitude_db)| ResponsePoint {
            frequency_hz: curve.frequency_at(i, points),
            magnitude_db,
        })
        .collect();

    Ok(response)
}
