//! Spectrum analyzer end-to-end tests
//!
//! Audio goes through the engine, across the sample queues, and comes out
//! as analyzer polylines on the display side.

use simple_eq_audio::{EqProcessor, Point, Rect, SpectrumAnalyzer};
use simple_eq_core::{EqConfig, EqParameters, ParamId};
use std::f32::consts::PI;
use std::sync::Arc;

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZE: usize = 512;

/// Very wide so one pixel is a fraction of a hertz around 1 kHz
const BOUNDS: Rect = Rect::new(10.0, 20.0, 10000.0, 480.0);

fn generate_sine(frequency: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

/// Inverse of the analyzer's log-frequency x mapping
fn frequency_at(point: Point, config: &EqConfig) -> f64 {
    let proportion = f64::from(point.x - BOUNDS.x) / f64::from(BOUNDS.width);
    config.min_display_freq * (config.max_display_freq / config.min_display_freq).powf(proportion)
}

fn setup(params: Arc<EqParameters>) -> (EqProcessor, SpectrumAnalyzer, EqConfig) {
    let config = EqConfig::default();
    let mut eq = EqProcessor::new(params, config.clone());
    eq.prepare(SAMPLE_RATE, BLOCK_SIZE).unwrap();

    let feed = eq.take_analyzer_feed().unwrap();
    let analyzer = SpectrumAnalyzer::new(feed, &config).unwrap();
    (eq, analyzer, config)
}

fn run(eq: &mut EqProcessor, left: &[f32], right: &[f32]) {
    let mut left = left.to_vec();
    let mut right = right.to_vec();
    for (l, r) in left.chunks_mut(BLOCK_SIZE).zip(right.chunks_mut(BLOCK_SIZE)) {
        eq.process_block(&mut [l, r]);
    }
}

#[test]
fn test_sine_peak_lands_on_its_frequency() {
    let (mut eq, mut analyzer, config) = setup(Arc::new(EqParameters::new()));
    assert_eq!(analyzer.fft_size(), 2048);

    let sine = generate_sine(1000.0, 8 * BLOCK_SIZE);
    run(&mut eq, &sine, &sine);
    analyzer.process(BOUNDS, SAMPLE_RATE, true);

    let bin_width = SAMPLE_RATE / 2048.0;
    for path in [analyzer.left_path(), analyzer.right_path()] {
        let peak = path.highest_point().unwrap();
        let frequency = frequency_at(peak, &config);

        assert!(
            (frequency - 1000.0).abs() <= bin_width,
            "peak at {frequency} Hz"
        );
        assert!(BOUNDS.contains(peak));
    }
}

#[test]
fn test_peak_level_tracks_eq_gain() {
    // A +12 dB bell at 1 kHz lifts the analyzer peak toward the top
    let flat = {
        let (mut eq, mut analyzer, _) = setup(Arc::new(EqParameters::new()));
        let sine = generate_sine(1000.0, 8 * BLOCK_SIZE);
        let quiet: Vec<f32> = sine.iter().map(|s| s * 0.1).collect();
        run(&mut eq, &quiet, &quiet);
        analyzer.process(BOUNDS, SAMPLE_RATE, true);
        analyzer.left_path().highest_point().unwrap().y
    };

    let boosted = {
        let params = Arc::new(EqParameters::new());
        params.set(ParamId::PeakFreq, 1000.0);
        params.set(ParamId::PeakGain, 12.0);
        let (mut eq, mut analyzer, _) = setup(params);
        let sine = generate_sine(1000.0, 8 * BLOCK_SIZE);
        let quiet: Vec<f32> = sine.iter().map(|s| s * 0.1).collect();
        run(&mut eq, &quiet, &quiet);
        analyzer.process(BOUNDS, SAMPLE_RATE, true);
        analyzer.left_path().highest_point().unwrap().y
    };

    // 12 dB on a 48 dB tall, 480 px display is 120 px
    assert!((flat - boosted - 120.0).abs() < 10.0, "flat {flat}, boosted {boosted}");
}

#[test]
fn test_left_and_right_are_analyzed_independently() {
    let (mut eq, mut analyzer, config) = setup(Arc::new(EqParameters::new()));

    let left = generate_sine(500.0, 8 * BLOCK_SIZE);
    let right = generate_sine(5000.0, 8 * BLOCK_SIZE);
    run(&mut eq, &left, &right);
    analyzer.process(BOUNDS, SAMPLE_RATE, true);

    let bin_width = SAMPLE_RATE / 2048.0;
    let left_peak = frequency_at(analyzer.left_path().highest_point().unwrap(), &config);
    let right_peak = frequency_at(analyzer.right_path().highest_point().unwrap(), &config);

    assert!((left_peak - 500.0).abs() <= bin_width, "left {left_peak}");
    assert!((right_peak - 5000.0).abs() <= bin_width, "right {right_peak}");
}

#[test]
fn test_disabled_analyzer_keeps_queues_flowing() {
    let (mut eq, mut analyzer, _) = setup(Arc::new(EqParameters::new()));
    let sine = generate_sine(1000.0, 40 * BLOCK_SIZE);

    // 40 blocks total would overflow the 30 block queue without the discard
    run(&mut eq, &sine[..20 * BLOCK_SIZE], &sine[..20 * BLOCK_SIZE]);
    analyzer.process(BOUNDS, SAMPLE_RATE, false);
    assert!(analyzer.left_path().is_empty());
    assert!(!analyzer.is_enabled());

    run(&mut eq, &sine[20 * BLOCK_SIZE..], &sine[20 * BLOCK_SIZE..]);
    analyzer.process(BOUNDS, SAMPLE_RATE, true);
    assert!(!analyzer.left_path().is_empty());
    assert!(!analyzer.right_path().is_empty());
}
