//! Parameter setup from a state file and `--set` overrides

use anyhow::Context;
use simple_eq_core::{EqError, EqParameters, ParamId};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// One `"Name=value"` assignment from the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamOverride {
    pub id: ParamId,
    pub value: f32,
}

impl FromStr for ParamOverride {
    type Err = EqError;

    /// Accepts the parameter's stable ID, then a number or `true`/`false`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| EqError::UnknownParameter(format!("expected NAME=VALUE, got {s:?}")))?;

        let name = name.trim();
        let id = ParamId::from_id(name).ok_or_else(|| EqError::UnknownParameter(name.to_string()))?;

        let value = match value.trim() {
            "true" | "on" => 1.0,
            "false" | "off" => 0.0,
            other => other
                .parse::<f32>()
                .map_err(|_| EqError::config(format!("{name}: not a number: {other:?}")))?,
        };

        Ok(Self { id, value })
    }
}

/// Build a parameter store from an optional state file plus overrides
///
/// Overrides are applied after the state, each clamped to its range.
pub fn build_parameters(state: Option<&Path>, overrides: &[ParamOverride]) -> anyhow::Result<Arc<EqParameters>> {
    let params = Arc::new(EqParameters::new());

    if let Some(path) = state {
        let data = std::fs::read(path).with_context(|| format!("Failed to read state file {}", path.display()))?;
        params
            .load_state(&data)
            .with_context(|| format!("Failed to load state from {}", path.display()))?;
    }

    for entry in overrides {
        let stored = params.set(entry.id, entry.value);
        tracing::debug!("{} = {}", entry.id, stored);
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_flags() {
        let entry: ParamOverride = "Peak Gain=6.5".parse().unwrap();
        assert_eq!(entry, ParamOverride { id: ParamId::PeakGain, value: 6.5 });

        let entry: ParamOverride = " LowCut Bypassed = true ".parse().unwrap();
        assert_eq!(entry.id, ParamId::LowCutBypassed);
        assert_eq!(entry.value, 1.0);
    }

    #[test]
    fn rejects_unknown_names_and_bad_values() {
        assert!(matches!(
            "Peak Width=2".parse::<ParamOverride>(),
            Err(EqError::UnknownParameter(name)) if name == "Peak Width"
        ));
        assert!("Peak Gain".parse::<ParamOverride>().is_err());
        assert!(matches!("Peak Gain=loud".parse::<ParamOverride>(), Err(EqError::Config(_))));
    }

    #[test]
    fn overrides_apply_after_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let source = EqParameters::new();
        source.set(ParamId::PeakFreq, 2000.0);
        source.set(ParamId::PeakGain, -3.0);
        std::fs::write(&path, source.save_state().unwrap()).unwrap();

        let overrides = [ParamOverride { id: ParamId::PeakGain, value: 100.0 }];
        let params = build_parameters(Some(&path), &overrides).unwrap();

        assert_eq!(params.get(ParamId::PeakFreq), 2000.0);
        assert_eq!(params.get(ParamId::PeakGain), 24.0);
    }

    #[test]
    fn unreadable_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"not a state").unwrap();

        assert!(build_parameters(Some(&path), &[]).is_err());
    }
}
