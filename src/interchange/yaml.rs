//! YAML format support.
//!
//! YAML documents have the same structure as the JSON ones, in YAML syntax.
//!
//! ## State-model document
//!
//! ```yaml
//! domain: Building
//! lifecycle_class: Door
//! events:
//!   - name: Install
//!     type: creation
//!   - name: Open
//! states:
//!   - name: Closed
//!     type: creation
//!     event: Install
//!     transitions:
//!       - event: Open
//!         target: Opened
//!   - name: Opened
//!     type: normal
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::hir::ResolvedModel;
use crate::syntax::{ModelInput, StateModelDecl, SubsystemDecl};

use super::{DocumentFormat, InterchangeError};

/// YAML format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml;

impl Yaml {
    /// Decode any serde-readable document.
    pub fn decode<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, InterchangeError> {
        let content = std::str::from_utf8(input)
            .map_err(|e| InterchangeError::yaml(format!("Invalid UTF-8: {e}")))?;
        serde_yaml::from_str(content).map_err(|e| InterchangeError::yaml(e.to_string()))
    }

    /// Encode any serde-writable value as YAML.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, InterchangeError> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| InterchangeError::yaml(e.to_string()))
    }
}

impl DocumentFormat for Yaml {
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn mime_type(&self) -> &'static str {
        "application/x-yaml"
    }

    fn read_subsystem(&self, input: &[u8]) -> Result<SubsystemDecl, InterchangeError> {
        let subsystem: SubsystemDecl = self.decode(input)?;
        tracing::trace!(
            "[YAML] subsystem '{}': {} classes, {} relationships",
            subsystem.name,
            subsystem.classes.len(),
            subsystem.relationships.len()
        );
        Ok(subsystem)
    }

    fn read_state_model(&self, input: &[u8]) -> Result<StateModelDecl, InterchangeError> {
        let model: StateModelDecl = self.decode(input)?;
        tracing::trace!("[YAML] state model '{}'", model.name());
        Ok(model)
    }

    fn read_input(&self, input: &[u8]) -> Result<ModelInput, InterchangeError> {
        self.decode(input)
    }

    fn write_model(&self, model: &ResolvedModel) -> Result<Vec<u8>, InterchangeError> {
        self.encode(model)
    }
}
