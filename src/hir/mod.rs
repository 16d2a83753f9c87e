//! High-level IR (HIR) — the resolved class model and the analyzer pipeline.
//!
//! Declarations from [`crate::syntax`] go in; a [`ResolvedModel`] comes out.
//! One [`ModelResolver`] is built per run and threaded through six phases.
//!
//! ## Key Types
//!
//! - [`analyze`] / [`analyze_with_options`] — Run the full pipeline
//! - [`ResolvedModel`] — Classes, relationships, referential, ordinal, type and state tables
//! - [`AnalysisError`] — Every fatal inconsistency, with its location
//! - [`Diagnostic`] — Non-fatal findings (warnings) and rendered errors
//!
//! ## Phases
//!
//! ```text
//! ModelInput
//!     │
//!     ▼
//! merge_declarations        ← classes, relationships, imports, numbering
//!     │
//!     ▼
//! resolve_navigation        ← hints → one relationship end each
//!     │
//!     ▼
//! resolve_referentials      ← referential table, union bindings
//!     │
//!     ▼
//! validate_ordinals         ← O<n> identifier and ranking attribute
//!     │
//!     ▼
//! resolve_types             ← equivalence classes, scalar/union types
//!     │
//!     ▼
//! normalize_state_models    ← complete transition tables
//!     │
//!     ▼
//! ResolvedModel
//! ```

mod diagnostics;
mod errors;
mod model;
mod options;
mod phases;
mod resolver;

pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use errors::{
    AnalysisError, AttributeLocation, NavigationFailure, RefAttrFailure, TypeDeclaration,
};
pub use model::{
    ClassReferences, CreationPair, Identifiers, InitialPseudoState, Navigation,
    NormalizedState, NormalizedStateKind, NormalizedStateModel, OrdinalInfo, Outcome, RefData,
    RefVariant, RefVariants, Reference, ReferenceKind, ReferentialTable, RelationshipKind,
    ResolvedAttribute, ResolvedClass, ResolvedModel, ResolvedRelationship, ResolvedSubsystem,
    ResolvedType, TypeTable, UnionType, VariantKey,
};
pub use options::{AnalysisOptions, ImportPolicy};
pub use resolver::{ModelResolver, analyze, analyze_with_options};
