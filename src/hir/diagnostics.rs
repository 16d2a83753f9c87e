//! Diagnostics — user-facing analysis messages.
//!
//! Fatal findings travel as [`AnalysisError`](super::AnalysisError); the
//! non-fatal ones are collected here and returned with the resolved model.

#[cfg(feature = "interchange")]
use serde::{Deserialize, Serialize};

use crate::base::Name;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with the model element it refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Error/warning code (e.g., "E0002").
    pub code: Option<Name>,
    /// The diagnostic message.
    pub message: Name,
    /// Class the diagnostic is about, if any.
    pub class: Option<Name>,
    /// Subsystem the diagnostic is about, if any.
    pub subsystem: Option<Name>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<Name>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            class: None,
            subsystem: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<Name>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(message)
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Name>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<Name>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_subsystem(mut self, subsystem: impl Into<Name>) -> Self {
        self.subsystem = Some(subsystem.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<&str> = self.message.split('\n').collect();
        write!(f, "Model-Analysis: [{}]", rows.join("\n                 "))
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
///
/// ## Code Ranges
///
/// - **E0001-E0009**: Declaration merging
/// - **E0010-E0019**: Navigation
/// - **E0020-E0029**: Referential attributes
/// - **E0030-E0039**: Ordinal relationships
/// - **E0040-E0049**: Types
/// - **E0050-E0059**: State models
/// - **W0001-W0099**: Warnings
pub mod codes {
    // ========================================================================
    // DECLARATION MERGING (E0001-E0009)
    // ========================================================================

    pub const DUPLICATE_SUBSYSTEM: &str = "E0001";
    pub const DUPLICATE_CLASS: &str = "E0002";
    pub const IMPORT_WRONG_SUBSYSTEM: &str = "E0003";
    pub const IMPORT_MISSING_CLASS: &str = "E0004";
    /// Import from a subsystem outside the run, under `ImportPolicy::Deny`.
    pub const IMPORT_MISSING_SUBSYSTEM: &str = "E0005";
    pub const DUPLICATE_RELATIONSHIP: &str = "E0006";
    pub const UNKNOWN_CLASS_IN_RELATIONSHIP: &str = "E0007";
    pub const ORDINAL_NOT_REFLEXIVE: &str = "E0008";

    // ========================================================================
    // NAVIGATION (E0010-E0019)
    // ========================================================================

    pub const BAD_NAVIGATION: &str = "E0010";
    pub const DUPLICATE_NAVIGATION: &str = "E0011";
    pub const INVALID_NAVIGATION: &str = "E0012";
    pub const REDUNDANT_RENAME: &str = "E0013";

    // ========================================================================
    // REFERENTIAL ATTRIBUTES (E0020-E0029)
    // ========================================================================

    pub const UNKNOWN_REFERENTIAL: &str = "E0020";
    pub const INVALID_REFERENTIAL: &str = "E0021";
    pub const BAD_NAMING: &str = "E0022";
    pub const REF_ATTR_NOT_FOUND: &str = "E0023";

    // ========================================================================
    // ORDINAL RELATIONSHIPS (E0030-E0039)
    // ========================================================================

    pub const ORDINAL_IDENTIFIER: &str = "E0030";
    pub const ORDINAL_RANKING: &str = "E0031";

    // ========================================================================
    // TYPES (E0040-E0049)
    // ========================================================================

    pub const MULTIPLE_TYPE_DEFINITIONS: &str = "E0040";
    pub const TYPE_NOT_DEFINED: &str = "E0041";
    pub const CONFLICTING_UNION_ALIAS: &str = "E0042";

    // ========================================================================
    // STATE MODELS (E0050-E0059)
    // ========================================================================

    pub const UNKNOWN_LIFECYCLE_CLASS: &str = "E0050";
    pub const UNKNOWN_ASSIGNER_RELATIONSHIP: &str = "E0051";
    pub const DUPLICATE_STATE: &str = "E0052";
    pub const DUPLICATE_EVENT: &str = "E0053";
    pub const UNKNOWN_EVENT: &str = "E0054";
    pub const UNKNOWN_STATE: &str = "E0055";
    pub const DUPLICATE_TRANSITION: &str = "E0056";
    pub const CONFLICTING_CREATION_EVENT: &str = "E0057";

    // ========================================================================
    // WARNINGS (W0001-W0099)
    // ========================================================================

    /// Class imported from a subsystem that is not part of this run.
    pub const IMPORT_FROM_MISSING_SUBSYSTEM: &str = "W0001";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate over warnings only.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take the collected diagnostics.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
