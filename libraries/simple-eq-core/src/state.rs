//! Persisted parameter state
//!
//! The host treats the state as an opaque byte blob. Internally it is a
//! versioned JSON object mapping parameter IDs to plain values:
//!
//! ```json
//! { "version": 1, "parameters": { "Peak Freq": 750.0, "Peak Gain": 6.0 } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EqError, Result};
use crate::store::EqParameters;
use crate::types::ParamId;

/// Current state format version
pub const STATE_VERSION: u32 = 1;

/// Serialized parameter tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Format version
    pub version: u32,
    /// Plain values keyed by parameter ID
    pub parameters: BTreeMap<String, f32>,
}

impl PersistedState {
    /// Capture the current parameter values
    pub fn capture(params: &EqParameters) -> Self {
        let parameters = ParamId::ALL
            .into_iter()
            .map(|id| (id.id().to_string(), params.get(id)))
            .collect();

        Self {
            version: STATE_VERSION,
            parameters,
        }
    }

    /// Decode a state blob
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(EqError::invalid_state("empty state blob"));
        }

        let state: Self = serde_json::from_slice(data)?;

        if state.version == 0 || state.version > STATE_VERSION {
            return Err(EqError::invalid_state(format!(
                "unsupported state version {}",
                state.version
            )));
        }

        Ok(state)
    }

    /// Encode as a state blob
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Write the values into a parameter store
    ///
    /// Missing parameters take their default, unknown keys are skipped,
    /// every value goes through the parameter's clamp/snap.
    pub fn restore_into(&self, params: &EqParameters) {
        for id in ParamId::ALL {
            let value = self
                .parameters
                .get(id.id())
                .copied()
                .unwrap_or_else(|| id.default_value());
            params.set(id, value);
        }

        for key in self.parameters.keys() {
            if ParamId::from_id(key).is_none() {
                tracing::debug!("Ignoring unknown parameter in state: {}", key);
            }
        }
    }
}

impl EqParameters {
    /// Serialize every parameter into a state blob
    pub fn save_state(&self) -> Result<Vec<u8>> {
        PersistedState::capture(self).to_bytes()
    }

    /// Restore parameters from a state blob
    ///
    /// A malformed or unreadable blob leaves every parameter at its default
    /// and returns [`EqError::InvalidState`]; it never panics.
    pub fn load_state(&self, data: &[u8]) -> Result<()> {
        match PersistedState::from_bytes(data) {
            Ok(state) => {
                state.restore_into(self);
                tracing::info!("Restored {} parameters from state", state.parameters.len());
                Ok(())
            }
            Err(err) => {
                self.reset_to_defaults();
                tracing::warn!("Discarding unreadable state, using defaults: {}", err);
                Err(match err {
                    EqError::InvalidState(msg) => EqError::InvalidState(msg),
                    other => EqError::InvalidState(other.to_string()),
                })
            }
        }
    }
}
