//! Foundation types for the mana analyzer.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Name`] - Cheap, clonable identifier strings
//! - [`Rnum`] - Relationship numbers (`R12`, `O3`)
//! - [`IdGroup`] - Identifier group tags (`I`, `I2`, `I3`)
//! - [`Side`] - Relationship side tags
//! - [`UnionFind`] - Index-based disjoint sets
//!
//! This module has NO dependencies on other mana modules.

mod ids;
mod union_find;

pub use ids::{IdGroup, Name, Rnum, Side};
pub use union_find::UnionFind;
