//! Identifier primitives shared by declarations and resolved tables.

use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "interchange")]
use serde::{Deserialize, Serialize};

/// An identifier string (class, attribute, phrase, type, event ...).
///
/// Model names are short and cloned into many tables, so they are stored
/// inline when possible.
pub type Name = smol_str::SmolStr;

// ============================================================================
// RELATIONSHIP NUMBERS
// ============================================================================

/// A relationship number such as `R12`, or `O3` for an ordinal relationship.
///
/// Ordering is natural: `R2 < R10`, and all `O` numbers sort before `R` numbers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize), serde(transparent))]
pub struct Rnum(Name);

impl Rnum {
    /// Create a relationship number from its textual form.
    pub fn new(id: impl Into<Name>) -> Self {
        Self(id.into())
    }

    /// Get the relationship number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ordinal relationships are numbered `O<n>`.
    pub fn is_ordinal(&self) -> bool {
        self.0.starts_with('O')
    }

    /// The alphabetic prefix (`R`, `O`, `OR` ...).
    pub fn prefix(&self) -> &str {
        let end = self
            .0
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(self.0.len());
        &self.0[..end]
    }

    /// The numeric part, if the number is well formed.
    pub fn number(&self) -> Option<u32> {
        self.0[self.prefix().len()..].parse().ok()
    }
}

impl Ord for Rnum {
    fn cmp(&self, other: &Self) -> Ordering {
        self.prefix()
            .cmp(other.prefix())
            .then_with(|| self.number().cmp(&other.number()))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Rnum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Rnum {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Rnum {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

// ============================================================================
// IDENTIFIER GROUPS
// ============================================================================

/// One of a class's candidate unique keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub enum IdGroup {
    I,
    I2,
    I3,
}

impl IdGroup {
    pub const ALL: [IdGroup; 3] = [IdGroup::I, IdGroup::I2, IdGroup::I3];

    /// Identifier number used by the instance store (`I` = 1).
    pub fn number(self) -> u8 {
        match self {
            IdGroup::I => 1,
            IdGroup::I2 => 2,
            IdGroup::I3 => 3,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "I" | "I1" => Some(IdGroup::I),
            "I2" => Some(IdGroup::I2),
            "I3" => Some(IdGroup::I3),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IdGroup::I => "I",
            IdGroup::I2 => "I2",
            IdGroup::I3 => "I3",
        }
    }
}

impl fmt::Display for IdGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SIDES
// ============================================================================

/// Which end of a relationship a navigation or reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Side {
    /// The passive perspective of a binary association.
    P,
    /// The active perspective of a binary association.
    T,
    /// The superclass end of a generalization.
    Superclass,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::P => "P",
            Side::T => "T",
            Side::Superclass => "superclass",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
