//! Coefficient hand-off from the audio thread to the display
//!
//! The engine owns a [`CoefficientPublisher`]; display code holds any number
//! of [`CoefficientReader`] clones. Publishing swaps an `Arc` handle
//! atomically, so readers always see a complete coefficient set.
//!
//! The publisher cycles through a fixed pool of `Arc` slots. A slot is only
//! rewritten when `Arc::get_mut` proves nobody else holds it, so a publish
//! never allocates and never waits on a reader. If every slot is still
//! referenced the publish is skipped and retried on the next block.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::dsp::{ChainCoefficients, ChainPosition, CutCoefficients};

/// An immutable coefficient set as seen by readers
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedCoefficients {
    /// Coefficients of every chain group
    pub coefficients: ChainCoefficients,
    /// Sample rate the coefficients were designed for
    pub sample_rate: f64,
    /// Incremented on every successful publish
    pub generation: u64,
}

impl PublishedCoefficients {
    /// Combined chain magnitude in dB
    pub fn magnitude_db(&self, frequency: f64) -> f64 {
        self.coefficients.magnitude_db(frequency, self.sample_rate)
    }
}

impl Default for PublishedCoefficients {
    fn default() -> Self {
        Self {
            coefficients: ChainCoefficients::default(),
            sample_rate: 0.0,
            generation: 0,
        }
    }
}

/// Writer side, owned by the audio engine
#[derive(Debug)]
pub struct CoefficientPublisher {
    shared: Arc<ArcSwap<PublishedCoefficients>>,
    pool: Vec<Arc<PublishedCoefficients>>,
    current: usize,
    generation: u64,
}

impl CoefficientPublisher {
    /// Create a publisher with `pool_size` pre-allocated slots (at least 2)
    pub fn new(pool_size: usize) -> Self {
        let pool: Vec<_> = (0..pool_size.max(2))
            .map(|_| Arc::new(PublishedCoefficients::default()))
            .collect();
        let shared = Arc::new(ArcSwap::new(Arc::clone(&pool[0])));

        Self {
            shared,
            pool,
            current: 0,
            generation: 0,
        }
    }

    /// New reader handle
    pub fn reader(&self) -> CoefficientReader {
        CoefficientReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Currently published coefficient set
    pub fn current(&self) -> &PublishedCoefficients {
        &self.pool[self.current]
    }

    /// Publish a coefficient set
    ///
    /// Returns `true` when readers now see `coefficients`. Identical sets are
    /// not republished and return `true` without a swap. Returns `false` when
    /// every free slot is still referenced by a reader.
    pub fn publish(&mut self, coefficients: &ChainCoefficients, sample_rate: f64) -> bool {
        {
            let current = self.current();
            if current.coefficients == *coefficients && current.sample_rate == sample_rate {
                return true;
            }
        }

        let slots = self.pool.len();
        for offset in 1..slots {
            let index = (self.current + offset) % slots;

            if let Some(slot) = Arc::get_mut(&mut self.pool[index]) {
                self.generation += 1;
                slot.coefficients = *coefficients;
                slot.sample_rate = sample_rate;
                slot.generation = self.generation;

                self.shared.store(Arc::clone(&self.pool[index]));
                self.current = index;
                return true;
            }
        }

        false
    }
}

/// Read-only coefficient handle for the display thread
#[derive(Debug, Clone)]
pub struct CoefficientReader {
    shared: Arc<ArcSwap<PublishedCoefficients>>,
}

impl CoefficientReader {
    /// Latest published coefficient set
    ///
    /// Holding the returned `Arc` pins its pool slot; drop it once the frame
    /// is drawn.
    pub fn load(&self) -> Arc<PublishedCoefficients> {
        self.shared.load_full()
    }

    /// Generation of the latest published set
    pub fn generation(&self) -> u64 {
        self.shared.load().generation
    }

    /// Read-only view of one chain group
    pub fn band(&self, position: ChainPosition) -> BandCoefficients {
        let published = self.shared.load();
        let coefficients = &published.coefficients;

        let (stages, bypassed) = match position {
            ChainPosition::LowCut => (coefficients.low_cut, coefficients.low_cut_bypassed),
            ChainPosition::Peak => (
                CutCoefficients::from_sections(&[coefficients.peak]),
                coefficients.peak_bypassed,
            ),
            ChainPosition::HighCut => (coefficients.high_cut, coefficients.high_cut_bypassed),
        };

        BandCoefficients {
            position,
            stages,
            bypassed,
            sample_rate: published.sample_rate,
        }
    }
}

/// Snapshot of one chain group's active sections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandCoefficients {
    /// Which group
    pub position: ChainPosition,
    /// Active sections in processing order
    pub stages: CutCoefficients,
    /// Group bypass flag
    pub bypassed: bool,
    /// Sample rate the sections were designed for
    pub sample_rate: f64,
}

impl BandCoefficients {
    /// Magnitude of this group alone in dB (0 dB when bypassed)
    pub fn magnitude_db(&self, frequency: f64) -> f64 {
        if self.bypassed || !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return 0.0;
        }
        20.0 * self
            .stages
            .magnitude_for_frequency(frequency, self.sample_rate)
            .max(1e-15)
            .log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_eq_core::{ChainSettings, Slope};

    fn coefficients(gain: f32) -> ChainCoefficients {
        let settings = ChainSettings {
            peak_gain_db: gain,
            low_cut_slope: Slope::Slope24,
            ..ChainSettings::default()
        };
        ChainCoefficients::from_settings(&settings, 48000.0)
    }

    #[test]
    fn reader_sees_published_set() {
        let mut publisher = CoefficientPublisher::new(4);
        let reader = publisher.reader();
        assert_eq!(reader.generation(), 0);

        assert!(publisher.publish(&coefficients(6.0), 48000.0));

        let published = reader.load();
        assert_eq!(published.coefficients, coefficients(6.0));
        assert_eq!(published.sample_rate, 48000.0);
        assert_eq!(published.generation, 1);
    }

    #[test]
    fn identical_set_is_not_republished() {
        let mut publisher = CoefficientPublisher::new(4);
        let reader = publisher.reader();

        publisher.publish(&coefficients(3.0), 48000.0);
        publisher.publish(&coefficients(3.0), 48000.0);
        assert_eq!(reader.generation(), 1);

        publisher.publish(&coefficients(3.0), 44100.0);
        assert_eq!(reader.generation(), 2);
    }

    #[test]
    fn held_handles_are_never_overwritten() {
        let mut publisher = CoefficientPublisher::new(2);
        let reader = publisher.reader();

        publisher.publish(&coefficients(1.0), 48000.0);
        let held = reader.load();

        // Slot 0 is free, slot 1 is live and held
        assert!(publisher.publish(&coefficients(2.0), 48000.0));
        let held_too = reader.load();

        // Both slots are referenced now: publish must back off
        assert!(!publisher.publish(&coefficients(3.0), 48000.0));
        assert_eq!(held.coefficients, coefficients(1.0));
        assert_eq!(held_too.coefficients, coefficients(2.0));

        drop(held);
        assert!(publisher.publish(&coefficients(3.0), 48000.0));
        assert_eq!(reader.load().coefficients, coefficients(3.0));
    }

    #[test]
    fn band_views() {
        let mut publisher = CoefficientPublisher::new(3);
        let reader = publisher.reader();
        publisher.publish(&coefficients(6.0), 48000.0);

        let low_cut = reader.band(ChainPosition::LowCut);
        assert_eq!(low_cut.stages.len(), 2);
        assert!(!low_cut.bypassed);

        let peak = reader.band(ChainPosition::Peak);
        assert_eq!(peak.stages.len(), 1);
        assert!((peak.magnitude_db(750.0) - 6.0).abs() < 0.01);
    }
}
