//! JSON format support.
//!
//! ## Subsystem document
//!
//! ```json
//! {
//!   "name": "Air Traffic Control",
//!   "alias": "ATC",
//!   "classes": [
//!     { "name": "Controller", "attributes": [
//!       { "name": "ID", "type": "Employee ID", "identifier_group_memberships": ["I"] }
//!     ]}
//!   ],
//!   "relationships": [
//!     { "id": "R1",
//!       "p_side": { "class": "Controller", "phrase": "is logged into", "multiplicity": "1" },
//!       "t_side": { "class": "Station", "phrase": "is logged in by", "multiplicity": "1" } }
//!   ]
//! }
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::hir::ResolvedModel;
use crate::syntax::{ModelInput, StateModelDecl, SubsystemDecl};

use super::{DocumentFormat, InterchangeError};

/// JSON format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Json {
    /// Decode any serde-readable document.
    pub fn decode<T: DeserializeOwned>(&self, input: &[u8]) -> Result<T, InterchangeError> {
        serde_json::from_slice(input).map_err(|e| InterchangeError::json(e.to_string()))
    }

    /// Encode any serde-writable value as pretty-printed JSON.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, InterchangeError> {
        serde_json::to_vec_pretty(value).map_err(|e| InterchangeError::json(e.to_string()))
    }
}

impl DocumentFormat for Json {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn read_subsystem(&self, input: &[u8]) -> Result<SubsystemDecl, InterchangeError> {
        let subsystem: SubsystemDecl = self.decode(input)?;
        tracing::trace!(
            "[JSON] subsystem '{}': {} classes, {} relationships",
            subsystem.name,
            subsystem.classes.len(),
            subsystem.relationships.len()
        );
        Ok(subsystem)
    }

    fn read_state_model(&self, input: &[u8]) -> Result<StateModelDecl, InterchangeError> {
        let model: StateModelDecl = self.decode(input)?;
        tracing::trace!("[JSON] state model '{}'", model.name());
        Ok(model)
    }

    fn read_input(&self, input: &[u8]) -> Result<ModelInput, InterchangeError> {
        self.decode(input)
    }

    fn write_model(&self, model: &ResolvedModel) -> Result<Vec<u8>, InterchangeError> {
        self.encode(model)
    }
}
