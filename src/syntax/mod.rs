//! Structured declarations handed over by the external model parser.
//!
//! The analyzer never sees model source text. It starts from these records:
//! one [`SubsystemDecl`] per subsystem file plus any number of
//! [`StateModelDecl`]s, gathered into a [`ModelInput`].

mod declarations;
mod state_model;

pub use declarations::{
    AttributeDecl, ClassDecl, ModelInput, Multiplicity, NavigationHint, Perspective,
    RelationshipDecl, RelationshipShape, Rename, SubsystemDecl,
};
pub use state_model::{
    EventDecl, EventKind, Parameter, StateDecl, StateKind, StateModelDecl, StateModelKind,
    TransitionDecl,
};
