//! Per-channel cascade filter chain
//!
//! A flat array of nine stages in processing order:
//!
//! ```text
//! [ LowCut 0..4 ][ Peak ][ HighCut 0..4 ]
//!   0  1  2  3      4      5  6  7  8
//! ```
//!
//! Each of the three groups has its own bypass flag. Inside a cut group each
//! stage also carries a bypass flag, and exactly `slope + 1` stages are
//! active after [`FilterChain::update_cut_filter`].

use super::biquad::Biquad;
use super::coefficients::{BiquadCoefficients, ChainCoefficients, CutCoefficients, MAX_CUT_STAGES};

/// First stage of the low-cut group
pub const LOW_CUT_START: usize = 0;

/// The peak stage
pub const PEAK_INDEX: usize = LOW_CUT_START + MAX_CUT_STAGES;

/// First stage of the high-cut group
pub const HIGH_CUT_START: usize = PEAK_INDEX + 1;

/// Total number of stages in a chain
pub const STAGE_COUNT: usize = HIGH_CUT_START + MAX_CUT_STAGES;

/// Stage group within the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainPosition {
    /// High-pass cascade
    LowCut,
    /// Peaking bell
    Peak,
    /// Low-pass cascade
    HighCut,
}

impl ChainPosition {
    /// All positions in processing order
    pub const ALL: [ChainPosition; 3] = [
        ChainPosition::LowCut,
        ChainPosition::Peak,
        ChainPosition::HighCut,
    ];

    /// Stage indices belonging to this group
    pub const fn stage_range(self) -> std::ops::Range<usize> {
        match self {
            ChainPosition::LowCut => LOW_CUT_START..LOW_CUT_START + MAX_CUT_STAGES,
            ChainPosition::Peak => PEAK_INDEX..PEAK_INDEX + 1,
            ChainPosition::HighCut => HIGH_CUT_START..HIGH_CUT_START + MAX_CUT_STAGES,
        }
    }

    /// Number of stage slots in this group
    pub const fn capacity(self) -> usize {
        let range = self.stage_range();
        range.end - range.start
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// One biquad plus its bypass flag
///
/// Allocated once with the chain; only the coefficients are ever replaced.
#[derive(Debug, Clone, Default)]
pub struct CascadeStage {
    filter: Biquad,
    bypassed: bool,
}

impl CascadeStage {
    /// Current coefficients
    pub fn coefficients(&self) -> &BiquadCoefficients {
        self.filter.coefficients()
    }

    /// Whether the stage is skipped
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }
}

/// Filter chain for one channel
#[derive(Debug, Clone)]
pub struct FilterChain {
    stages: [CascadeStage; STAGE_COUNT],
    group_bypassed: [bool; 3],
}

impl FilterChain {
    /// Create a chain of pass-through stages
    ///
    /// Each cut group starts with a single active stage.
    pub fn new() -> Self {
        let mut chain = Self {
            stages: std::array::from_fn(|_| CascadeStage::default()),
            group_bypassed: [false; 3],
        };
        chain.update_cut_filter(ChainPosition::LowCut, &CutCoefficients::IDENTITY);
        chain.update_cut_filter(ChainPosition::HighCut, &CutCoefficients::IDENTITY);
        chain
    }

    /// Run every active stage over the buffer, in place
    ///
    /// Stages are applied in order; bypassed groups and bypassed stages are
    /// skipped. Never allocates.
    pub fn process(&mut self, buffer: &mut [f32]) {
        for position in ChainPosition::ALL {
            if self.group_bypassed[position.index()] {
                continue;
            }

            for stage in &mut self.stages[position.stage_range()] {
                if !stage.bypassed {
                    stage.filter.process(buffer);
                }
            }
        }
    }

    /// Load coefficients into one stage of a group
    ///
    /// Out-of-range stage indices are ignored. Filter state is kept.
    pub fn set_stage_coefficients(
        &mut self,
        position: ChainPosition,
        stage_index: usize,
        coefficients: BiquadCoefficients,
    ) {
        if let Some(stage) = self.stage_mut(position, stage_index) {
            stage.filter.set_coefficients(coefficients);
        }
    }

    /// Bypass or enable a whole group
    pub fn set_bypassed(&mut self, position: ChainPosition, bypassed: bool) {
        self.group_bypassed[position.index()] = bypassed;
    }

    /// Whether a whole group is bypassed
    pub fn is_bypassed(&self, position: ChainPosition) -> bool {
        self.group_bypassed[position.index()]
    }

    /// Bypass or enable a single stage of a group
    pub fn set_stage_bypassed(&mut self, position: ChainPosition, stage_index: usize, bypassed: bool) {
        if let Some(stage) = self.stage_mut(position, stage_index) {
            stage.bypassed = bypassed;
        }
    }

    /// Whether a single stage is bypassed; out-of-range stages count as bypassed
    pub fn is_stage_bypassed(&self, position: ChainPosition, stage_index: usize) -> bool {
        self.stage(position, stage_index)
            .map_or(true, CascadeStage::is_bypassed)
    }

    /// Stage of a group, if the index is in range
    pub fn stage(&self, position: ChainPosition, stage_index: usize) -> Option<&CascadeStage> {
        if stage_index < position.capacity() {
            self.stages.get(position.stage_range().start + stage_index)
        } else {
            None
        }
    }

    fn stage_mut(&mut self, position: ChainPosition, stage_index: usize) -> Option<&mut CascadeStage> {
        if stage_index < position.capacity() {
            self.stages.get_mut(position.stage_range().start + stage_index)
        } else {
            None
        }
    }

    /// Number of active (non-bypassed) stages in a group
    pub fn active_stage_count(&self, position: ChainPosition) -> usize {
        self.stages[position.stage_range()]
            .iter()
            .filter(|stage| !stage.bypassed)
            .count()
    }

    /// Load a cascade into a group
    ///
    /// Bypasses every stage of the group, then loads and activates the
    /// first `cascade.len()` stages. Inactive stages keep their state.
    pub fn update_cut_filter(&mut self, position: ChainPosition, cascade: &CutCoefficients) {
        for stage in &mut self.stages[position.stage_range()] {
            stage.bypassed = true;
        }

        for (index, coefficients) in cascade.iter().take(position.capacity()).enumerate() {
            self.set_stage_coefficients(position, index, *coefficients);
            self.set_stage_bypassed(position, index, false);
        }
    }

    /// Load every group and its bypass flag
    pub fn apply(&mut self, coefficients: &ChainCoefficients) {
        self.update_cut_filter(ChainPosition::LowCut, &coefficients.low_cut);
        self.set_stage_coefficients(ChainPosition::Peak, 0, coefficients.peak);
        self.set_stage_bypassed(ChainPosition::Peak, 0, false);
        self.update_cut_filter(ChainPosition::HighCut, &coefficients.high_cut);

        self.set_bypassed(ChainPosition::LowCut, coefficients.low_cut_bypassed);
        self.set_bypassed(ChainPosition::Peak, coefficients.peak_bypassed);
        self.set_bypassed(ChainPosition::HighCut, coefficients.high_cut_bypassed);
    }

    /// Clear the running state of every stage
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.filter.reset();
        }
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::biquad::Biquad;
    use crate::dsp::coefficients::{make_cut_coefficients, CutKind};
    use simple_eq_core::Slope;

    const SR: f64 = 48000.0;

    fn sine(frequency: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * frequency * i as f32 / SR as f32).sin())
            .collect()
    }

    #[test]
    fn index_layout() {
        assert_eq!(LOW_CUT_START, 0);
        assert_eq!(PEAK_INDEX, 4);
        assert_eq!(HIGH_CUT_START, 5);
        assert_eq!(STAGE_COUNT, 9);
        assert_eq!(ChainPosition::HighCut.stage_range(), 5..9);
    }

    #[test]
    fn new_chain_is_transparent() {
        let mut chain = FilterChain::new();
        let input = sine(440.0, 256);
        let mut buffer = input.clone();

        chain.process(&mut buffer);
        assert_eq!(buffer, input);
        assert_eq!(chain.active_stage_count(ChainPosition::LowCut), 1);
    }

    #[test]
    fn update_cut_filter_activates_first_n_stages() {
        let mut chain = FilterChain::new();

        for slope in Slope::ALL {
            let cascade = make_cut_coefficients(CutKind::LowCut, 100.0, SR, slope);
            chain.update_cut_filter(ChainPosition::LowCut, &cascade);

            for index in 0..MAX_CUT_STAGES {
                assert_eq!(
                    chain.is_stage_bypassed(ChainPosition::LowCut, index),
                    index >= slope.stage_count()
                );
            }
        }

        // Shrinking back leaves the trailing stages bypassed
        let cascade = make_cut_coefficients(CutKind::LowCut, 100.0, SR, Slope::Slope12);
        chain.update_cut_filter(ChainPosition::LowCut, &cascade);
        assert_eq!(chain.active_stage_count(ChainPosition::LowCut), 1);
    }

    #[test]
    fn slope_switch_keeps_inactive_stage_state() {
        let steep = make_cut_coefficients(CutKind::LowCut, 300.0, SR, Slope::Slope48);
        let gentle = make_cut_coefficients(CutKind::LowCut, 300.0, SR, Slope::Slope12);
        let blocks = [sine(120.0, 256), sine(500.0, 256), sine(90.0, 256)];

        let mut chain = FilterChain::new();
        chain.set_bypassed(ChainPosition::Peak, true);
        chain.set_bypassed(ChainPosition::HighCut, true);

        let mut outputs = blocks.clone();
        chain.update_cut_filter(ChainPosition::LowCut, &steep);
        chain.process(&mut outputs[0]);
        chain.update_cut_filter(ChainPosition::LowCut, &gentle);
        chain.process(&mut outputs[1]);
        chain.update_cut_filter(ChainPosition::LowCut, &steep);
        chain.process(&mut outputs[2]);

        // Same cascade built from bare sections: stages 1..4 sit out the
        // middle block and resume with the state the first block left
        let mut stages: Vec<Biquad> = steep.iter().map(|c| Biquad::new(*c)).collect();
        let mut expected = blocks.clone();
        for stage in &mut stages {
            stage.process(&mut expected[0]);
        }
        stages[0].set_coefficients(gentle.as_slice()[0]);
        stages[0].process(&mut expected[1]);
        stages[0].set_coefficients(steep.as_slice()[0]);
        for stage in &mut stages {
            stage.process(&mut expected[2]);
        }
        assert_eq!(outputs, expected);

        // A chain whose idle stages had been cleared would sound different
        let mut reference = blocks.clone();
        let mut stages: Vec<Biquad> = steep.iter().map(|c| Biquad::new(*c)).collect();
        for stage in &mut stages {
            stage.process(&mut reference[0]);
        }
        stages[0].set_coefficients(gentle.as_slice()[0]);
        stages[0].process(&mut reference[1]);
        stages[0].set_coefficients(steep.as_slice()[0]);
        for stage in &mut stages[1..] {
            stage.reset();
        }
        for stage in &mut stages {
            stage.process(&mut reference[2]);
        }
        assert_ne!(outputs[2], reference[2]);
        assert_eq!(chain.active_stage_count(ChainPosition::LowCut), 4);
    }

    #[test]
    fn all_bypassed_is_exact_identity() {
        let mut chain = FilterChain::new();
        let settings = simple_eq_core::ChainSettings {
            low_cut_freq: 500.0,
            low_cut_slope: Slope::Slope48,
            peak_gain_db: 12.0,
            high_cut_freq: 2000.0,
            ..Default::default()
        };
        chain.apply(&ChainCoefficients::from_settings(&settings, SR));
        for position in ChainPosition::ALL {
            chain.set_bypassed(position, true);
        }

        let input = sine(1000.0, 512);
        let mut buffer = input.clone();
        chain.process(&mut buffer);
        assert_eq!(buffer, input);
    }

    #[test]
    fn out_of_range_stage_is_ignored() {
        let mut chain = FilterChain::new();
        chain.set_stage_coefficients(ChainPosition::Peak, 1, BiquadCoefficients::default());
        chain.set_stage_bypassed(ChainPosition::Peak, 3, true);

        assert!(chain.is_stage_bypassed(ChainPosition::Peak, 1));
        assert!(!chain.is_stage_bypassed(ChainPosition::Peak, 0));
        assert!(chain.stage(ChainPosition::LowCut, 4).is_none());
    }

    #[test]
    fn reset_clears_state_only() {
        let settings = simple_eq_core::ChainSettings {
            peak_gain_db: 9.0,
            ..Default::default()
        };
        let coefficients = ChainCoefficients::from_settings(&settings, SR);

        let mut warm = FilterChain::new();
        warm.apply(&coefficients);
        let mut noise = sine(313.0, 300);
        warm.process(&mut noise);
        warm.reset();

        let mut fresh = FilterChain::new();
        fresh.apply(&coefficients);

        let mut a = sine(750.0, 128);
        let mut b = a.clone();
        warm.process(&mut a);
        fresh.process(&mut b);
        assert_eq!(a, b);
        assert_eq!(
            *warm.stage(ChainPosition::Peak, 0).unwrap().coefficients(),
            coefficients.peak
        );
    }
}
