//! State save/restore through the engine
//!
//! A state blob captured from one engine must rebuild bit-identical
//! coefficients in another, and a bad blob must leave a usable engine.

use simple_eq_audio::{AudioError, ChainPosition, EqProcessor};
use simple_eq_core::{ChainSettings, EqConfig, EqError, EqParameters, ParamId, Slope};
use std::sync::Arc;

const SAMPLE_RATE: f64 = 44100.0;

fn prepared(settings: &ChainSettings) -> EqProcessor {
    let params = Arc::new(EqParameters::with_settings(settings));
    let mut eq = EqProcessor::new(params, EqConfig::default());
    eq.prepare(SAMPLE_RATE, 256).unwrap();
    eq
}

fn custom_settings() -> ChainSettings {
    ChainSettings {
        low_cut_freq: 85.0,
        high_cut_freq: 9500.0,
        peak_freq: 2400.0,
        peak_gain_db: -9.5,
        peak_quality: 3.2,
        low_cut_slope: Slope::Slope36,
        high_cut_slope: Slope::Slope24,
        low_cut_bypassed: false,
        peak_bypassed: false,
        high_cut_bypassed: true,
        analyzer_enabled: false,
    }
}

#[test]
fn test_restored_engine_has_identical_coefficients() {
    let source = prepared(&custom_settings());
    let blob = source.get_state().unwrap();

    let mut restored = prepared(&ChainSettings::default());
    restored.set_state(&blob).unwrap();

    assert_eq!(restored.chain_settings(), source.chain_settings());

    let expected = source.coefficient_reader().load();
    let actual = restored.coefficient_reader().load();
    assert_eq!(actual.coefficients, expected.coefficients);
    assert_eq!(actual.sample_rate, expected.sample_rate);

    for position in ChainPosition::ALL {
        assert_eq!(
            restored.left_chain().active_stage_count(position),
            source.left_chain().active_stage_count(position)
        );
        assert_eq!(
            restored.right_chain().is_bypassed(position),
            source.right_chain().is_bypassed(position)
        );
    }
}

#[test]
fn test_restored_engine_processes_identically() {
    let mut source = prepared(&custom_settings());
    let blob = source.get_state().unwrap();

    let mut restored = prepared(&ChainSettings::default());
    restored.set_state(&blob).unwrap();

    let input: Vec<f32> = (0..1024).map(|i| ((i * 37 % 101) as f32 / 50.0) - 1.0).collect();
    let mut a = input.clone();
    let mut b = input;

    for block in a.chunks_mut(256) {
        source.process_block(&mut [block]);
    }
    for block in b.chunks_mut(256) {
        restored.process_block(&mut [block]);
    }

    assert_eq!(a, b);
}

#[test]
fn test_state_before_prepare_applies_on_prepare() {
    let source = prepared(&custom_settings());
    let blob = source.get_state().unwrap();

    let mut restored = EqProcessor::new(Arc::new(EqParameters::new()), EqConfig::default());
    restored.set_state(&blob).unwrap();
    restored.prepare(SAMPLE_RATE, 256).unwrap();

    assert_eq!(
        restored.coefficient_reader().load().coefficients,
        source.coefficient_reader().load().coefficients
    );
}

#[test]
fn test_invalid_state_rebuilds_with_defaults() {
    let mut eq = prepared(&custom_settings());
    let before = eq.coefficient_reader().generation();

    let result = eq.set_state(b"{\"version\": \"nope\"");
    assert!(matches!(result, Err(AudioError::Core(EqError::InvalidState(_)))));

    assert_eq!(eq.chain_settings(), ChainSettings::default());
    assert_eq!(eq.left_chain().active_stage_count(ChainPosition::LowCut), 1);
    assert!(!eq.left_chain().is_bypassed(ChainPosition::HighCut));
    assert!(eq.coefficient_reader().generation() > before);

    let defaults = prepared(&ChainSettings::default());
    assert_eq!(
        eq.coefficient_reader().load().coefficients,
        defaults.coefficient_reader().load().coefficients
    );
}

#[test]
fn test_state_survives_text_round_trip() {
    // Hosts may store the blob as text; it is plain UTF-8 JSON
    let eq = prepared(&custom_settings());
    let blob = eq.get_state().unwrap();
    let text = String::from_utf8(blob).unwrap();
    assert!(text.contains("\"Peak Gain\":-9.5"));

    let params = EqParameters::new();
    params.load_state(text.as_bytes()).unwrap();
    assert_eq!(params.get(ParamId::PeakGain), -9.5);
    assert_eq!(params.snapshot().low_cut_slope, Slope::Slope36);
}
