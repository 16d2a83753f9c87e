//! State-model declarations (class lifecycles and relationship assigners).

#[cfg(feature = "interchange")]
use serde::{Deserialize, Serialize};

use crate::base::{Name, Rnum};

/// What a state model describes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(untagged)
)]
pub enum StateModelKind {
    /// Lifecycle of the instances of one class.
    Lifecycle {
        #[cfg_attr(feature = "interchange", serde(rename = "lifecycle_class"))]
        class: Name,
    },
    /// Single assigner serializing the creation of links on a relationship.
    Assigner {
        #[cfg_attr(feature = "interchange", serde(rename = "assigner_relationship"))]
        relationship: Rnum,
    },
}

/// A parsed state model document.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct StateModelDecl {
    pub domain: Name,
    #[cfg_attr(feature = "interchange", serde(flatten))]
    pub kind: StateModelKind,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub states: Vec<StateDecl>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub events: Vec<EventDecl>,
}

impl StateModelDecl {
    pub fn lifecycle(domain: impl Into<Name>, class: impl Into<Name>) -> Self {
        Self {
            domain: domain.into(),
            kind: StateModelKind::Lifecycle {
                class: class.into(),
            },
            states: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn assigner(domain: impl Into<Name>, relationship: impl Into<Rnum>) -> Self {
        Self {
            domain: domain.into(),
            kind: StateModelKind::Assigner {
                relationship: relationship.into(),
            },
            states: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_state(mut self, state: StateDecl) -> Self {
        self.states.push(state);
        self
    }

    pub fn with_event(mut self, event: EventDecl) -> Self {
        self.events.push(event);
        self
    }

    /// Display name: the lifecycle class or the assigner's relationship.
    pub fn name(&self) -> Name {
        match &self.kind {
            StateModelKind::Lifecycle { class } => class.clone(),
            StateModelKind::Assigner { relationship } => Name::new(relationship.as_str()),
        }
    }
}

/// Declared role of a state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(tag = "type", rename_all = "lowercase")
)]
pub enum StateKind {
    /// Entered from the initial pseudo-state when `event` creates an instance.
    Creation { event: Name },
    Normal,
    Deletion,
}

/// One declared transition out of a state. No target means the event is ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct TransitionDecl {
    pub event: Name,
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub target: Option<Name>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct StateDecl {
    pub name: Name,
    #[cfg_attr(feature = "interchange", serde(flatten))]
    pub kind: StateKind,
    /// Opaque reference to the state's activity, passed through untouched.
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub activity: Option<String>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub transitions: Vec<TransitionDecl>,
}

impl StateDecl {
    pub fn normal(name: impl Into<Name>) -> Self {
        Self::with_kind(name, StateKind::Normal)
    }

    pub fn deletion(name: impl Into<Name>) -> Self {
        Self::with_kind(name, StateKind::Deletion)
    }

    pub fn creation(name: impl Into<Name>, event: impl Into<Name>) -> Self {
        Self::with_kind(
            name,
            StateKind::Creation {
                event: event.into(),
            },
        )
    }

    fn with_kind(name: impl Into<Name>, kind: StateKind) -> Self {
        Self {
            name: name.into(),
            kind,
            activity: None,
            transitions: Vec::new(),
        }
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = Some(activity.into());
        self
    }

    pub fn with_transition(mut self, event: impl Into<Name>, target: impl Into<Name>) -> Self {
        self.transitions.push(TransitionDecl {
            event: event.into(),
            target: Some(target.into()),
        });
        self
    }

    pub fn with_ignore(mut self, event: impl Into<Name>) -> Self {
        self.transitions.push(TransitionDecl {
            event: event.into(),
            target: None,
        });
        self
    }
}

/// Event type tag, passed through to the resolved model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum EventKind {
    #[default]
    Normal,
    Creation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct Parameter {
    pub name: Name,
    #[cfg_attr(feature = "interchange", serde(rename = "type"))]
    pub ty: Name,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct EventDecl {
    pub name: Name,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub signature: Vec<Parameter>,
    #[cfg_attr(feature = "interchange", serde(default, rename = "type"))]
    pub kind: EventKind,
}

impl EventDecl {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            signature: Vec::new(),
            kind: EventKind::Normal,
        }
    }

    pub fn creation(name: impl Into<Name>) -> Self {
        Self {
            kind: EventKind::Creation,
            ..Self::new(name)
        }
    }

    pub fn with_parameter(mut self, name: impl Into<Name>, ty: impl Into<Name>) -> Self {
        self.signature.push(Parameter {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }
}
