//! Model document interchange.
//!
//! The external model parser hands its results over as structured
//! documents. This module reads them into [`crate::syntax`] declarations
//! and writes the [`ResolvedModel`](crate::hir::ResolvedModel) back out:
//!
//! - **JSON** - `serde_json`
//! - **YAML** - `serde_yaml`
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐
//! │  JSON File   │     │  YAML File   │
//! └──────┬───────┘     └──────┬───────┘
//!        │                    │
//!        ▼                    ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                  DocumentFormat trait                     │
//! │  - read_subsystem(&[u8]) -> Result<SubsystemDecl>        │
//! │  - read_state_model(&[u8]) -> Result<StateModelDecl>     │
//! │  - write_model(&ResolvedModel) -> Result<Vec<u8>>        │
//! └──────────────────────────────────────────────────────────┘
//!        │
//!        ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │             ModelInput  ──analyze──▶  ResolvedModel       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use mana::interchange::{DocumentFormat, Json, Yaml};
//!
//! let subsystem = Yaml.read_subsystem(&std::fs::read("atc.yaml")?)?;
//! let model = mana::analyze(&ModelInput::new().with_subsystem(subsystem))?;
//! let out = Json.write_model(&model)?;
//! ```

mod error;
mod format;
mod json;
mod yaml;

pub use error::InterchangeError;
pub use format::DocumentFormat;
pub use json::Json;
pub use yaml::Yaml;

/// Supported file extensions for model documents.
pub fn supported_extensions() -> &'static [&'static str] {
    &["json", "yaml", "yml"]
}

/// Detect format from file extension.
pub fn detect_format(path: &std::path::Path) -> Option<Box<dyn DocumentFormat>> {
    let ext = path.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "json" => Some(Box::new(Json)),
        "yaml" | "yml" => Some(Box::new(Yaml)),
        _ => None,
    }
}

/// Detect format from MIME type.
pub fn detect_format_from_mime(mime: &str) -> Option<Box<dyn DocumentFormat>> {
    match mime {
        "application/json" => Some(Box::new(Json)),
        "application/x-yaml" | "text/yaml" => Some(Box::new(Yaml)),
        _ => None,
    }
}
