//! Project loading: one manifest, many model documents, one analysis run.
//!
//! A manifest names the subsystem and state-model documents that make up a
//! run, relative to the manifest's own directory, plus the analysis options.
//!
//! ```yaml
//! name: Air Traffic Control
//! subsystems:
//!   - atc/subsystem.yaml
//! state_models:
//!   - atc/controller.yaml
//! options:
//!   import_policy: deny
//! ```

mod error;
mod loader;
mod manifest;

pub use error::ProjectError;
pub use loader::ProjectLoader;
pub use manifest::ProjectManifest;
