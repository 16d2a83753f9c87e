//! Error types for model analysis.
//!
//! Every resolution failure is a typed, non-retryable [`AnalysisError`].
//! Each variant carries enough context (relationship, class, subsystem,
//! implicated attributes) to locate the offending declaration.

use std::fmt;

use thiserror::Error;

use super::diagnostics::{Diagnostic, codes};
use crate::base::{Name, Rnum};

// ============================================================================
// CONTEXT RECORDS
// ============================================================================

/// Where an attribute is declared.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeLocation {
    pub class: Name,
    pub attribute: Name,
    pub subsystem: Name,
}

impl fmt::Display for AttributeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Class: \"{}\", Attribute: \"{}\" in Subsystem: \"{}\"",
            self.class, self.attribute, self.subsystem
        )
    }
}

/// An explicit type declaration found on an attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub location: AttributeLocation,
    /// The declared type, `Union(A, B)` for a declared member list.
    pub declared: String,
}

impl fmt::Display for TypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} declares \"{}\"", self.location, self.declared)
    }
}

/// Why a navigation hint could not be pinned to one relationship end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationFailure {
    NoSolution,
    MultipleSolutions(usize),
}

impl fmt::Display for NavigationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationFailure::NoSolution => f.write_str("no valid solution"),
            NavigationFailure::MultipleSolutions(n) => write!(f, "{n} possible solutions"),
        }
    }
}

/// Why referred identifier attributes could not be matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefAttrFailure {
    /// No identifier group of the referred class can be formed.
    NoSolution,
    /// More than one assignment scores best.
    MultipleSources,
    /// Every assignment would override an explicit rename.
    AmbiguousRename,
}

impl fmt::Display for RefAttrFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RefAttrFailure::NoSolution => "no attribute source found",
            RefAttrFailure::MultipleSources => "multiple attribute sources",
            RefAttrFailure::AmbiguousRename => "ambiguous attribute rename",
        })
    }
}

fn bullet_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("\n* {item}"))
        .collect::<String>()
}

fn quoted_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// ANALYSIS ERROR
// ============================================================================

/// A fatal inconsistency found while resolving a model.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AnalysisError {
    // ------------------------------------------------------------------
    // Declaration merging
    // ------------------------------------------------------------------
    #[error("Subsystem: \"{subsystem}\" is declared more than once")]
    DuplicateSubsystem { subsystem: Name },

    #[error(
        "Class: \"{class}\" is defined multiple times both in Subsystem: \"{first}\" and in Subsystem: \"{second}\""
    )]
    DuplicateClassDeclaration {
        class: Name,
        first: Name,
        second: Name,
    },

    #[error(
        "Class: \"{class}\" imported from Subsystem: \"{from}\" into Subsystem: \"{into}\" but was declared in Subsystem: \"{declared}\""
    )]
    ClassImportedFromWrongSubsystem {
        class: Name,
        from: Name,
        into: Name,
        declared: Name,
    },

    #[error("Class: \"{class}\" is missing in Subsystem: \"{subsystem}\"")]
    ClassMissingInSubsystem { class: Name, subsystem: Name },

    #[error(
        "Class: \"{class}\" is imported from non-existent Subsystem: \"{subsystem}\" into Subsystem: \"{into}\""
    )]
    ClassImportFromMissingSubsystem {
        class: Name,
        subsystem: Name,
        into: Name,
    },

    #[error(
        "Relationship: \"{rnum}\" is declared both in Subsystem: \"{first}\" and in Subsystem: \"{second}\""
    )]
    DuplicateRelationship {
        rnum: Rnum,
        first: Name,
        second: Name,
    },

    #[error(
        "Unknown Class Name: \"{class}\" in specification for Relationship: \"{rnum}\" which is declared in Subsystem: \"{subsystem}\""
    )]
    UnknownClassInRelationship {
        rnum: Rnum,
        class: Name,
        subsystem: Name,
    },

    #[error(
        "Ordinal Relationship: \"{rnum}\" in Subsystem: \"{subsystem}\" must be a binary association with the same class on both sides"
    )]
    OrdinalNotReflexive { rnum: Rnum, subsystem: Name },

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------
    #[error(
        "Bad navigation at Class: \"{class}\", Attribute: \"{attribute}\" ({hint}): {failure}"
    )]
    BadNavigation {
        class: Name,
        attribute: Name,
        hint: String,
        failure: NavigationFailure,
    },

    #[error(
        "Attribute: \"{attribute}\" at Class: \"{class}\" navigates the same side of Relationship: \"{rnum}\" more than once"
    )]
    DuplicateNavigation {
        rnum: Rnum,
        class: Name,
        attribute: Name,
    },

    #[error(
        "Navigation of Attribute: \"{attribute}\" at Class: \"{class}\" does not match the other end of Relationship: \"{rnum}\""
    )]
    InvalidNavigation {
        rnum: Rnum,
        class: Name,
        attribute: Name,
    },

    #[error(
        "Attribute: \"{attribute}\" at Class: \"{class}\" is renamed more than once over Relationship: \"{rnum}\""
    )]
    RedundantRename {
        rnum: Rnum,
        class: Name,
        attribute: Name,
    },

    // ------------------------------------------------------------------
    // Referential attributes
    // ------------------------------------------------------------------
    #[error(
        "Class: \"{class}\" in Subsystem: \"{subsystem}\" has a referential attribute over an unknown Relationship: \"{rnum}\""
    )]
    UnknownReferentialAttribute {
        rnum: Rnum,
        class: Name,
        subsystem: Name,
    },

    #[error(
        "Relationship: \"{rnum}\" has an invalid referential attribute at Class: \"{class}\" in Subsystem: \"{subsystem}\""
    )]
    InvalidReferentialAttribute {
        rnum: Rnum,
        class: Name,
        subsystem: Name,
    },

    #[error(
        "Referential attributes of Class: \"{class}\" in Subsystem: \"{subsystem}\" collide on name \"{name}\" over Relationship: \"{rnum}\""
    )]
    BadNaming {
        rnum: Rnum,
        class: Name,
        subsystem: Name,
        name: Name,
    },

    #[error(
        "Can not find referred attributes for Relationship: \"{rnum}\", at class: \"{class}\" declared in Subsystem: \"{subsystem}\", represented by formalized attributes: {} ({reason})",
        quoted_list(.attributes)
    )]
    RefAttrNotFound {
        rnum: Rnum,
        class: Name,
        subsystem: Name,
        attributes: Vec<Name>,
        reason: RefAttrFailure,
    },

    // ------------------------------------------------------------------
    // Ordinal relationships
    // ------------------------------------------------------------------
    #[error(
        "Ordinal Relationship: \"{rnum}\" at Class: \"{class}\" has no identifier formed exactly by attributes: {}",
        quoted_list(.attributes)
    )]
    OrdinalIdentifierMismatch {
        rnum: Rnum,
        class: Name,
        attributes: Vec<Name>,
    },

    #[error(
        "Ordinal Relationship: \"{rnum}\" at Class: \"{class}\" needs exactly one ranking attribute, found: [{}]",
        quoted_list(.found)
    )]
    OrdinalRankingAttribute {
        rnum: Rnum,
        class: Name,
        found: Vec<Name>,
    },

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------
    #[error(
        "Multiple type definitions for the following list of attributes:{}",
        bullet_list(.declarations)
    )]
    MultipleTypeDefinitions { declarations: Vec<TypeDeclaration> },

    #[error(
        "Type not defined for the following list of attributes:{}",
        bullet_list(.attributes)
    )]
    TypeNotDefined { attributes: Vec<AttributeLocation> },

    #[error(
        "Union type \"Union({})\" has conflicting names: {}",
        .members.join(", "),
        quoted_list(.aliases)
    )]
    ConflictingUnionAlias {
        members: Vec<Name>,
        aliases: Vec<Name>,
    },

    // ------------------------------------------------------------------
    // State models
    // ------------------------------------------------------------------
    #[error("State model of unknown Class: \"{class}\" in Domain: \"{domain}\"")]
    UnknownLifecycleClass { domain: Name, class: Name },

    #[error("Assigner state model of unknown Relationship: \"{rnum}\" in Domain: \"{domain}\"")]
    UnknownAssignerRelationship { domain: Name, rnum: Rnum },

    #[error("State: \"{state}\" is declared more than once in State Model: \"{model}\"")]
    DuplicateState { model: Name, state: Name },

    #[error("Event: \"{event}\" is declared more than once in State Model: \"{model}\"")]
    DuplicateEvent { model: Name, event: Name },

    #[error("Unknown Event: \"{event}\" at State: \"{state}\" in State Model: \"{model}\"")]
    UnknownEvent {
        model: Name,
        state: Name,
        event: Name,
    },

    #[error(
        "Event: \"{event}\" at State: \"{state}\" targets unknown State: \"{target}\" in State Model: \"{model}\""
    )]
    UnknownState {
        model: Name,
        state: Name,
        event: Name,
        target: Name,
    },

    #[error(
        "Event: \"{event}\" has more than one transition out of State: \"{state}\" in State Model: \"{model}\""
    )]
    DuplicateTransition {
        model: Name,
        state: Name,
        event: Name,
    },

    #[error(
        "Creation Event: \"{event}\" targets both State: \"{first}\" and State: \"{second}\" in State Model: \"{model}\""
    )]
    ConflictingCreationEvent {
        model: Name,
        event: Name,
        first: Name,
        second: Name,
    },
}

impl AnalysisError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        use AnalysisError::*;
        match self {
            DuplicateSubsystem { .. } => codes::DUPLICATE_SUBSYSTEM,
            DuplicateClassDeclaration { .. } => codes::DUPLICATE_CLASS,
            ClassImportedFromWrongSubsystem { .. } => codes::IMPORT_WRONG_SUBSYSTEM,
            ClassMissingInSubsystem { .. } => codes::IMPORT_MISSING_CLASS,
            ClassImportFromMissingSubsystem { .. } => codes::IMPORT_MISSING_SUBSYSTEM,
            DuplicateRelationship { .. } => codes::DUPLICATE_RELATIONSHIP,
            UnknownClassInRelationship { .. } => codes::UNKNOWN_CLASS_IN_RELATIONSHIP,
            OrdinalNotReflexive { .. } => codes::ORDINAL_NOT_REFLEXIVE,
            BadNavigation { .. } => codes::BAD_NAVIGATION,
            DuplicateNavigation { .. } => codes::DUPLICATE_NAVIGATION,
            InvalidNavigation { .. } => codes::INVALID_NAVIGATION,
            RedundantRename { .. } => codes::REDUNDANT_RENAME,
            UnknownReferentialAttribute { .. } => codes::UNKNOWN_REFERENTIAL,
            InvalidReferentialAttribute { .. } => codes::INVALID_REFERENTIAL,
            BadNaming { .. } => codes::BAD_NAMING,
            RefAttrNotFound { .. } => codes::REF_ATTR_NOT_FOUND,
            OrdinalIdentifierMismatch { .. } => codes::ORDINAL_IDENTIFIER,
            OrdinalRankingAttribute { .. } => codes::ORDINAL_RANKING,
            MultipleTypeDefinitions { .. } => codes::MULTIPLE_TYPE_DEFINITIONS,
            TypeNotDefined { .. } => codes::TYPE_NOT_DEFINED,
            ConflictingUnionAlias { .. } => codes::CONFLICTING_UNION_ALIAS,
            UnknownLifecycleClass { .. } => codes::UNKNOWN_LIFECYCLE_CLASS,
            UnknownAssignerRelationship { .. } => codes::UNKNOWN_ASSIGNER_RELATIONSHIP,
            DuplicateState { .. } => codes::DUPLICATE_STATE,
            DuplicateEvent { .. } => codes::DUPLICATE_EVENT,
            UnknownEvent { .. } => codes::UNKNOWN_EVENT,
            UnknownState { .. } => codes::UNKNOWN_STATE,
            DuplicateTransition { .. } => codes::DUPLICATE_TRANSITION,
            ConflictingCreationEvent { .. } => codes::CONFLICTING_CREATION_EVENT,
        }
    }

    /// Convert into a user-facing diagnostic record.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string()).with_code(self.code())
    }
}
