//! Magnitude response curve for the display
//!
//! Reads the latest published coefficients and evaluates the combined chain
//! response at one log-spaced frequency per pixel column.

use simple_eq_core::EqConfig;

use crate::geometry::{map_range, map_to_log10, Point, Polyline, Rect};
use crate::publish::CoefficientReader;

/// Response curve renderer glue
#[derive(Debug, Clone)]
pub struct ResponseCurve {
    reader: CoefficientReader,
    min_freq: f64,
    max_freq: f64,
    range_db: f64,
}

impl ResponseCurve {
    pub fn new(reader: CoefficientReader, config: &EqConfig) -> Self {
        Self {
            reader,
            min_freq: config.min_display_freq,
            max_freq: config.max_display_freq,
            range_db: config.response_range_db,
        }
    }

    /// Frequency shown at column `index` of `width`
    pub fn frequency_at(&self, index: usize, width: usize) -> f64 {
        if width == 0 {
            return self.min_freq;
        }
        map_to_log10(index as f64 / width as f64, self.min_freq, self.max_freq)
    }

    /// Combined magnitude in dB for each of `width` columns
    pub fn magnitudes(&self, width: usize) -> Vec<f64> {
        let published = self.reader.load();
        (0..width)
            .map(|i| published.magnitude_db(self.frequency_at(i, width)))
            .collect()
    }

    /// Response as a polyline; `±range_db` spans `bottom..top`
    pub fn path(&self, bounds: Rect) -> Polyline {
        let width = bounds.width.max(0.0) as usize;
        let top = f64::from(bounds.y);
        let bottom = f64::from(bounds.bottom());

        let mut path = Polyline::with_capacity(width);
        for (i, db) in self.magnitudes(width).into_iter().enumerate() {
            let y = map_range(db, -self.range_db, self.range_db, bottom, top);
            path.push(Point::new(bounds.x + i as f32, y as f32));
        }
        path
    }
}
