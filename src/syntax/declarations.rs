//! Class-model declarations as produced by the external model parser.
//!
//! These records are the input boundary of the analyzer. Every optional
//! piece of information is an explicit `Option` or an empty `Vec`, so an
//! attribute that "has no type at all" is a checkable state.

#[cfg(feature = "interchange")]
use serde::{Deserialize, Serialize};

use crate::base::{IdGroup, Name, Rnum};

use super::StateModelDecl;

// ============================================================================
// MODEL INPUT
// ============================================================================

/// Everything one analysis run consumes.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ModelInput {
    #[cfg_attr(feature = "interchange", serde(default))]
    pub subsystems: Vec<SubsystemDecl>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub state_models: Vec<StateModelDecl>,
}

impl ModelInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subsystem(mut self, subsystem: SubsystemDecl) -> Self {
        self.subsystems.push(subsystem);
        self
    }

    pub fn with_state_model(mut self, model: StateModelDecl) -> Self {
        self.state_models.push(model);
        self
    }
}

// ============================================================================
// SUBSYSTEMS
// ============================================================================

/// One parsed subsystem document.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct SubsystemDecl {
    #[cfg_attr(feature = "interchange", serde(alias = "subsystem_name"))]
    pub name: Name,
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub alias: Option<Name>,
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub domain: Option<Name>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub classes: Vec<ClassDecl>,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub relationships: Vec<RelationshipDecl>,
}

impl SubsystemDecl {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<Name>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<Name>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_class(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_relationship(mut self, relationship: RelationshipDecl) -> Self {
        self.relationships.push(relationship);
        self
    }
}

// ============================================================================
// CLASSES AND ATTRIBUTES
// ============================================================================

/// A class declaration, either owned by its subsystem or imported from another.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ClassDecl {
    pub name: Name,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub attributes: Vec<AttributeDecl>,
    /// Attributes that take part in referential matching but are left out of
    /// the resulting referential maps.
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub ignored_attributes: Vec<AttributeDecl>,
    /// Subsystem the class is imported from, if this is an import.
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none", alias = "import")
    )]
    pub imported_from: Option<Name>,
}

impl ClassDecl {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeDecl) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_ignored_attribute(mut self, attribute: AttributeDecl) -> Self {
        self.ignored_attributes.push(attribute);
        self
    }

    pub fn imported_from(mut self, subsystem: impl Into<Name>) -> Self {
        self.imported_from = Some(subsystem.into());
        self
    }

    pub fn is_import(&self) -> bool {
        self.imported_from.is_some()
    }
}

/// A partially specified relationship traversal attached to an attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct NavigationHint {
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub rnum: Option<Rnum>,
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub class: Option<Name>,
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub phrase: Option<Name>,
    /// Name of the identifier attribute this attribute stands in for.
    #[cfg_attr(
        feature = "interchange",
        serde(default, skip_serializing_if = "Option::is_none", alias = "ref_name")
    )]
    pub rename: Option<Name>,
}

impl NavigationHint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rnum(mut self, rnum: impl Into<Rnum>) -> Self {
        self.rnum = Some(rnum.into());
        self
    }

    pub fn class(mut self, class: impl Into<Name>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn phrase(mut self, phrase: impl Into<Name>) -> Self {
        self.phrase = Some(phrase.into());
        self
    }

    pub fn rename(mut self, source: impl Into<Name>) -> Self {
        self.rename = Some(source.into());
        self
    }
}

/// Relationship-level rename: over `rnum`, this attribute formalizes `source`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct Rename {
    pub rnum: Rnum,
    pub source: Name,
}

/// An attribute declaration with all of its optional markers.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct AttributeDecl {
    pub name: Name,
    /// Explicit scalar type name.
    #[cfg_attr(
        feature = "interchange",
        serde(default, rename = "type", skip_serializing_if = "Option::is_none")
    )]
    pub ty: Option<Name>,
    /// Explicit union-type members.
    #[cfg_attr(
        feature = "interchange",
        serde(
            default,
            rename = "union_type_members",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub union_type: Option<Vec<Name>>,
    #[cfg_attr(
        feature = "interchange",
        serde(
            default,
            rename = "identifier_group_memberships",
            skip_serializing_if = "Vec::is_empty"
        )
    )]
    pub identifiers: Vec<IdGroup>,
    #[cfg_attr(
        feature = "interchange",
        serde(
            default,
            rename = "relationship_numbers",
            skip_serializing_if = "Vec::is_empty"
        )
    )]
    pub relationships: Vec<Rnum>,
    /// Relationships whose formalized types this attribute chooses between.
    #[cfg_attr(
        feature = "interchange",
        serde(
            default,
            rename = "union_relationship_numbers",
            skip_serializing_if = "Vec::is_empty"
        )
    )]
    pub union_relationships: Vec<Rnum>,
    #[cfg_attr(
        feature = "interchange",
        serde(
            default,
            rename = "navigation_hints",
            skip_serializing_if = "Vec::is_empty"
        )
    )]
    pub navigation: Vec<NavigationHint>,
    #[cfg_attr(
        feature = "interchange",
        serde(default, rename = "rename", skip_serializing_if = "Vec::is_empty")
    )]
    pub renames: Vec<Rename>,
    /// Ordinal relationship this attribute ranks.
    #[cfg_attr(
        feature = "interchange",
        serde(
            default,
            rename = "ranking_relationship",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub ranking: Option<Rnum>,
}

impl AttributeDecl {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn typed(mut self, ty: impl Into<Name>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn union_of<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        self.union_type = Some(members.into_iter().map(Into::into).collect());
        self
    }

    pub fn identifier(mut self, group: IdGroup) -> Self {
        self.identifiers.push(group);
        self
    }

    pub fn referential(mut self, rnum: impl Into<Rnum>) -> Self {
        self.relationships.push(rnum.into());
        self
    }

    pub fn union_referential(mut self, rnum: impl Into<Rnum>) -> Self {
        self.union_relationships.push(rnum.into());
        self
    }

    pub fn navigation(mut self, hint: NavigationHint) -> Self {
        self.navigation.push(hint);
        self
    }

    pub fn rename(mut self, rnum: impl Into<Rnum>, source: impl Into<Name>) -> Self {
        self.renames.push(Rename {
            rnum: rnum.into(),
            source: source.into(),
        });
        self
    }

    pub fn ranking(mut self, rnum: impl Into<Rnum>) -> Self {
        self.ranking = Some(rnum.into());
        self
    }
}

// ============================================================================
// RELATIONSHIPS
// ============================================================================

/// Multiplicity of one perspective of a binary association.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub enum Multiplicity {
    #[cfg_attr(feature = "interchange", serde(rename = "1"))]
    One,
    #[cfg_attr(feature = "interchange", serde(rename = "M"))]
    Many,
}

/// One side of a binary association.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct Perspective {
    pub class: Name,
    pub phrase: Name,
    pub multiplicity: Multiplicity,
    #[cfg_attr(feature = "interchange", serde(default))]
    pub conditional: bool,
}

impl Perspective {
    pub fn new(class: impl Into<Name>, phrase: impl Into<Name>, multiplicity: Multiplicity) -> Self {
        Self {
            class: class.into(),
            phrase: phrase.into(),
            multiplicity,
            conditional: false,
        }
    }

    pub fn conditional(mut self) -> Self {
        self.conditional = true;
        self
    }
}

/// The declared shape of a relationship.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(untagged)
)]
pub enum RelationshipShape {
    /// Binary association, optionally with an association class.
    /// Ordinal relationships (`O<n>`) use this shape with both sides on one class.
    Association {
        #[cfg_attr(feature = "interchange", serde(alias = "side_a"))]
        p_side: Perspective,
        #[cfg_attr(feature = "interchange", serde(alias = "side_b"))]
        t_side: Perspective,
        #[cfg_attr(
            feature = "interchange",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        association_class: Option<Name>,
    },
    Generalization {
        superclass: Name,
        subclasses: Vec<Name>,
    },
}

/// A relationship declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct RelationshipDecl {
    #[cfg_attr(feature = "interchange", serde(rename = "id"))]
    pub rnum: Rnum,
    #[cfg_attr(feature = "interchange", serde(flatten))]
    pub shape: RelationshipShape,
}

impl RelationshipDecl {
    pub fn association(rnum: impl Into<Rnum>, p_side: Perspective, t_side: Perspective) -> Self {
        Self {
            rnum: rnum.into(),
            shape: RelationshipShape::Association {
                p_side,
                t_side,
                association_class: None,
            },
        }
    }

    pub fn generalization<I, S>(rnum: impl Into<Rnum>, superclass: impl Into<Name>, subclasses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        Self {
            rnum: rnum.into(),
            shape: RelationshipShape::Generalization {
                superclass: superclass.into(),
                subclasses: subclasses.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Attach an association class. Has no effect on generalizations.
    pub fn with_association_class(mut self, class: impl Into<Name>) -> Self {
        if let RelationshipShape::Association {
            association_class, ..
        } = &mut self.shape
        {
            *association_class = Some(class.into());
        }
        self
    }

    /// Every class name this relationship mentions, in declaration order.
    pub fn class_names(&self) -> Vec<&Name> {
        match &self.shape {
            RelationshipShape::Association {
                p_side,
                t_side,
                association_class,
            } => {
                let mut names = Vec::with_capacity(3);
                if let Some(assoc) = association_class {
                    names.push(assoc);
                }
                names.push(&p_side.class);
                names.push(&t_side.class);
                names
            }
            RelationshipShape::Generalization {
                superclass,
                subclasses,
            } => std::iter::once(superclass).chain(subclasses.iter()).collect(),
        }
    }
}
