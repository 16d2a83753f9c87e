//! # mana-base
//!
//! Semantic analysis for executable-UML (Shlaer-Mellor) class models.
//!
//! Takes the declarations produced by an external model parser and turns
//! them into one resolved, internally consistent model: classes numbered,
//! referential attributes matched to the identifiers they formalize, every
//! attribute typed, and every state model given a complete transition table.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project      → Manifest loading, one run over many documents
//!   ↓
//! interchange  → JSON/YAML documents ⇄ declarations, resolved model
//!   ↓
//! hir          → Analyzer phases, ResolvedModel, AnalysisError
//!   ↓
//! syntax       → Declaration records handed over by the parser
//!   ↓
//! base         → Primitives (Name, Rnum, IdGroup, UnionFind)
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → hir → interchange → project)
// ============================================================================

/// Foundation types: Name, Rnum, IdGroup, Side, UnionFind
pub mod base;

/// Syntax: declaration records for subsystems and state models
pub mod syntax;

/// High-level IR: the analyzer pipeline and the resolved model
pub mod hir;

/// Model interchange formats: JSON, YAML
#[cfg(feature = "interchange")]
pub mod interchange;

/// Project management: manifests and document loading
#[cfg(feature = "interchange")]
pub mod project;

// Re-export the entry points
pub use hir::{AnalysisError, AnalysisOptions, ResolvedModel, analyze, analyze_with_options};

// Re-export foundation types
pub use base::{IdGroup, Name, Rnum, Side};
