//! Analysis options

#[cfg(feature = "interchange")]
use serde::{Deserialize, Serialize};

/// What to do with a class imported from a subsystem that is not part of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ImportPolicy {
    /// Partial analysis: keep the imported declaration and emit a warning.
    #[default]
    Warn,
    /// Treat the import as a fatal error.
    Deny,
}

/// Options for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct AnalysisOptions {
    /// Handling of imports from subsystems missing in the run
    #[cfg_attr(feature = "interchange", serde(default))]
    pub import_policy: ImportPolicy,
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_import_policy(mut self, policy: ImportPolicy) -> Self {
        self.import_policy = policy;
        self
    }
}
