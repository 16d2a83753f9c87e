//! Resolution phases.
//!
//! Resolution proceeds in six ordered phases, each reading the tables the
//! previous ones built:
//!
//! 1. **Merge**: Combine subsystems, check imports, number classes
//! 2. **Navigation**: Pin navigation hints to one relationship end
//! 3. **Referential**: Match referential attributes to referred identifiers
//! 4. **Ordinal**: Validate ordinal relationships
//! 5. **Types**: Partition attributes and resolve their types
//! 6. **State models**: Complete transition tables, add initial pseudo-states

mod merge;
mod navigation;
mod ordinal;
mod referential;
mod state_model;
mod types;

pub(crate) use merge::merge_declarations;
pub(crate) use navigation::resolve_navigation;
pub(crate) use ordinal::validate_ordinals;
pub(crate) use referential::resolve_referentials;
pub(crate) use state_model::normalize_state_models;
pub(crate) use types::resolve_types;
