//! Resolved model — the analyzer's output tables.
//!
//! ```text
//! ResolvedModel
//! ├── subsystems:    IndexMap<Name, ResolvedSubsystem>
//! ├── classes:       IndexMap<Name, ResolvedClass>      (numbered, navigations, types)
//! ├── relationships: IndexMap<Rnum, ResolvedRelationship>
//! ├── referential:   ReferentialTable                   (keyed by referred-to class)
//! ├── ordinals:      IndexMap<Rnum, OrdinalInfo>
//! ├── types:         TypeTable                          (deduplicated scalars and unions)
//! ├── state_models:  Vec<NormalizedStateModel>
//! └── warnings:      Vec<Diagnostic>
//! ```
//!
//! All tables keep declaration order, so two runs over the same input
//! produce identical output.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
#[cfg(feature = "interchange")]
use serde::{Deserialize, Serialize};

use super::diagnostics::Diagnostic;
use crate::base::{IdGroup, Name, Rnum, Side};
use crate::syntax::{
    AttributeDecl, EventDecl, NavigationHint, Perspective, RelationshipShape, Rename,
    StateModelKind,
};

// ============================================================================
// MODEL
// ============================================================================

/// A fully resolved, internally consistent class model.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ResolvedModel {
    pub subsystems: IndexMap<Name, ResolvedSubsystem>,
    pub classes: IndexMap<Name, ResolvedClass>,
    pub relationships: IndexMap<Rnum, ResolvedRelationship>,
    pub referential: ReferentialTable,
    pub ordinals: IndexMap<Rnum, OrdinalInfo>,
    pub types: TypeTable,
    pub state_models: Vec<NormalizedStateModel>,
    pub warnings: Vec<Diagnostic>,
}

impl ResolvedModel {
    pub fn class(&self, name: &str) -> Option<&ResolvedClass> {
        self.classes.get(name)
    }

    pub fn relationship(&self, rnum: &Rnum) -> Option<&ResolvedRelationship> {
        self.relationships.get(rnum)
    }

    /// Resolved type of `class.attribute`, ignored attributes included.
    pub fn attribute_type(&self, class: &str, attribute: &str) -> Option<&ResolvedType> {
        self.class(class)?
            .all_attributes()
            .find(|a| a.name == attribute)?
            .resolved_type
            .as_ref()
    }

    pub fn state_model(&self, name: &str) -> Option<&NormalizedStateModel> {
        self.state_models.iter().find(|m| m.name() == name)
    }
}

// ============================================================================
// SUBSYSTEMS AND CLASSES
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ResolvedSubsystem {
    pub name: Name,
    /// Declared alias, or the name itself.
    pub alias: Name,
    pub domain: Option<Name>,
}

/// A class's identifier groups and their member attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct Identifiers {
    groups: BTreeMap<IdGroup, Vec<Name>>,
}

impl Identifiers {
    /// Collect identifier memberships. A class without any identifier
    /// attribute gets the singleton identifier `I` with no members.
    pub fn from_attributes<'a>(attributes: impl IntoIterator<Item = &'a AttributeDecl>) -> Self {
        let mut groups: BTreeMap<IdGroup, Vec<Name>> = BTreeMap::new();
        for attr in attributes {
            for group in &attr.identifiers {
                let members = groups.entry(*group).or_default();
                if !members.contains(&attr.name) {
                    members.push(attr.name.clone());
                }
            }
        }
        if groups.is_empty() {
            groups.insert(IdGroup::I, Vec::new());
        }
        Self { groups }
    }

    /// Defined groups in `I < I2 < I3` order.
    pub fn defined(&self) -> impl Iterator<Item = IdGroup> + '_ {
        self.groups.keys().copied()
    }

    pub fn members(&self, group: IdGroup) -> &[Name] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (IdGroup, &[Name])> {
        self.groups.iter().map(|(g, m)| (*g, m.as_slice()))
    }

    /// Singleton class: only `I`, with no members.
    pub fn is_singleton(&self) -> bool {
        self.groups.len() == 1 && self.members(IdGroup::I).is_empty()
    }
}

/// A navigation hint pinned to exactly one relationship end.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct Navigation {
    pub rnum: Rnum,
    pub class: Name,
    pub phrase: Option<Name>,
    pub side: Side,
    /// Identifier attribute this attribute formalizes, if renamed.
    pub rename: Option<Name>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ResolvedAttribute {
    pub name: Name,
    pub declared_type: Option<Name>,
    pub declared_union: Option<Vec<Name>>,
    pub identifiers: Vec<IdGroup>,
    pub relationships: Vec<Rnum>,
    pub union_relationships: Vec<Rnum>,
    pub renames: Vec<Rename>,
    pub ranking: Option<Rnum>,
    pub navigations: Vec<Navigation>,
    pub resolved_type: Option<ResolvedType>,
    /// Raw hints waiting for the navigation phase.
    #[cfg_attr(feature = "interchange", serde(skip))]
    pub(crate) hints: Vec<NavigationHint>,
}

impl From<&AttributeDecl> for ResolvedAttribute {
    fn from(decl: &AttributeDecl) -> Self {
        Self {
            name: decl.name.clone(),
            declared_type: decl.ty.clone(),
            declared_union: decl.union_type.clone(),
            identifiers: decl.identifiers.clone(),
            relationships: decl.relationships.clone(),
            union_relationships: decl.union_relationships.clone(),
            renames: decl.renames.clone(),
            ranking: decl.ranking.clone(),
            navigations: Vec::new(),
            resolved_type: None,
            hints: decl.navigation.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ResolvedClass {
    pub name: Name,
    /// 1-based class number, fixed at first merge.
    pub number: u32,
    /// Declaring subsystem (importing subsystem for late-bound imports).
    pub subsystem: Name,
    pub attributes: Vec<ResolvedAttribute>,
    pub ignored_attributes: Vec<ResolvedAttribute>,
    pub identifiers: Identifiers,
}

impl ResolvedClass {
    pub fn attribute(&self, name: &str) -> Option<&ResolvedAttribute> {
        self.all_attributes().find(|a| a.name == name)
    }

    /// Regular attributes followed by ignored ones.
    pub fn all_attributes(&self) -> impl Iterator<Item = &ResolvedAttribute> {
        self.attributes.iter().chain(self.ignored_attributes.iter())
    }

    pub(crate) fn all_attributes_mut(&mut self) -> impl Iterator<Item = &mut ResolvedAttribute> {
        self.attributes
            .iter_mut()
            .chain(self.ignored_attributes.iter_mut())
    }

    pub fn is_ignored(&self, attribute: &str) -> bool {
        self.ignored_attributes.iter().any(|a| a.name == attribute)
    }

    /// Case-insensitive attribute lookup.
    pub fn has_attribute_ci(&self, name: &str) -> bool {
        self.all_attributes()
            .any(|a| a.name.eq_ignore_ascii_case(name))
    }
}

// ============================================================================
// RELATIONSHIPS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ResolvedRelationship {
    pub rnum: Rnum,
    pub subsystem: Name,
    pub shape: RelationshipShape,
}

impl ResolvedRelationship {
    pub fn is_ordinal(&self) -> bool {
        self.rnum.is_ordinal()
    }

    pub fn association_class(&self) -> Option<&Name> {
        match &self.shape {
            RelationshipShape::Association {
                association_class, ..
            } => association_class.as_ref(),
            RelationshipShape::Generalization { .. } => None,
        }
    }

    pub fn perspective(&self, side: Side) -> Option<&Perspective> {
        match (&self.shape, side) {
            (RelationshipShape::Association { p_side, .. }, Side::P) => Some(p_side),
            (RelationshipShape::Association { t_side, .. }, Side::T) => Some(t_side),
            _ => None,
        }
    }

    /// Phrase of one side of an association.
    pub fn phrase(&self, side: Side) -> Option<&Name> {
        self.perspective(side).map(|p| &p.phrase)
    }
}

// ============================================================================
// REFERENTIAL TABLE
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ReferenceKind {
    ToOne,
    Associative,
    Superclass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RelationshipKind {
    Binary,
    BinaryReflexive,
    Generalization,
}

/// How one formalizing class stands in for the referred class's identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct RefData {
    pub formalizing_class: Name,
    /// Side of the relationship the referred class sits on.
    pub side: Side,
    pub id_group: IdGroup,
    /// Referring attribute → identifier attribute of the referred class.
    pub attr_map: IndexMap<Name, Name>,
}

impl RefData {
    /// Referring attributes, sorted.
    pub fn ref_attributes(&self) -> Vec<&Name> {
        let mut attrs: Vec<&Name> = self.attr_map.keys().collect();
        attrs.sort();
        attrs
    }
}

/// Key of a per-direction variant of a reflexive or generalizing relationship.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum VariantKey {
    Subclass(Name),
    Phrase(Name),
}

impl VariantKey {
    pub fn as_str(&self) -> &str {
        match self {
            VariantKey::Subclass(n) | VariantKey::Phrase(n) => n,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct RefVariant {
    pub key: VariantKey,
    pub data: RefData,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RefVariants {
    Plain(RefData),
    /// Sorted by key.
    Variants(Vec<RefVariant>),
}

/// One relationship seen from the class whose identifier it formalizes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct Reference {
    pub reference_kind: ReferenceKind,
    pub relationship_kind: RelationshipKind,
    pub data: RefVariants,
}

impl Reference {
    pub fn has_variants(&self) -> bool {
        matches!(self.data, RefVariants::Variants(_))
    }

    pub fn plain(&self) -> Option<&RefData> {
        match &self.data {
            RefVariants::Plain(data) => Some(data),
            RefVariants::Variants(_) => None,
        }
    }

    pub fn variant_keys(&self) -> Vec<&VariantKey> {
        match &self.data {
            RefVariants::Plain(_) => Vec::new(),
            RefVariants::Variants(variants) => variants.iter().map(|v| &v.key).collect(),
        }
    }

    pub fn variant(&self, key: &VariantKey) -> Option<&RefData> {
        match &self.data {
            RefVariants::Plain(_) => None,
            RefVariants::Variants(variants) => variants
                .iter()
                .find(|v| &v.key == key)
                .map(|v| &v.data),
        }
    }

    /// Every data record, plain or per variant.
    pub fn all_data(&self) -> Vec<&RefData> {
        match &self.data {
            RefVariants::Plain(data) => vec![data],
            RefVariants::Variants(variants) => variants.iter().map(|v| &v.data).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ClassReferences {
    pub relationships: BTreeMap<Rnum, Reference>,
}

impl ClassReferences {
    /// Relationship numbers, sorted.
    pub fn defined(&self) -> impl Iterator<Item = &Rnum> {
        self.relationships.keys()
    }

    pub fn get(&self, rnum: &Rnum) -> Option<&Reference> {
        self.relationships.get(rnum)
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

/// Per referred-to class: every relationship formalizing its identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct ReferentialTable {
    classes: IndexMap<Name, ClassReferences>,
}

impl ReferentialTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ensure_class(&mut self, class: &Name) {
        self.classes.entry(class.clone()).or_default();
    }

    /// Record one formalization. `key` is `None` for plain relationships.
    pub(crate) fn record(
        &mut self,
        referred: &Name,
        rnum: &Rnum,
        reference_kind: ReferenceKind,
        relationship_kind: RelationshipKind,
        key: Option<VariantKey>,
        data: RefData,
    ) {
        let entry = self
            .classes
            .entry(referred.clone())
            .or_default()
            .relationships
            .entry(rnum.clone())
            .or_insert_with(|| Reference {
                reference_kind,
                relationship_kind,
                data: match key {
                    Some(_) => RefVariants::Variants(Vec::new()),
                    None => RefVariants::Plain(data.clone()),
                },
            });
        match (&mut entry.data, key) {
            (RefVariants::Variants(variants), Some(key)) => {
                match variants.binary_search_by(|v| v.key.cmp(&key)) {
                    Ok(pos) => variants[pos].data = data,
                    Err(pos) => variants.insert(pos, RefVariant { key, data }),
                }
            }
            (RefVariants::Plain(existing), None) => *existing = data,
            _ => {}
        }
    }

    /// References to `class`'s identifier.
    pub fn for_class(&self, class: &str) -> Option<&ClassReferences> {
        self.classes.get(class)
    }

    pub fn reference(&self, referred: &str, rnum: &Rnum) -> Option<&Reference> {
        self.for_class(referred)?.get(rnum)
    }

    /// Everything `class` formalizes: `(referred class, rnum, data)`.
    pub fn formalized_by<'a>(&'a self, class: &'a str) -> Vec<(&'a Name, &'a Rnum, &'a RefData)> {
        let mut out = Vec::new();
        for (referred, refs) in &self.classes {
            for (rnum, reference) in &refs.relationships {
                for data in reference.all_data() {
                    if data.formalizing_class == class {
                        out.push((referred, rnum, data));
                    }
                }
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &ClassReferences)> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// ============================================================================
// ORDINALS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct OrdinalInfo {
    pub rnum: Rnum,
    pub class: Name,
    pub id_group: IdGroup,
    pub ranking_attribute: Name,
    pub ascending_phrase: Name,
    pub descending_phrase: Name,
}

// ============================================================================
// TYPES
// ============================================================================

/// The type an attribute resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(untagged)
)]
pub enum ResolvedType {
    Scalar(Name),
    /// Sorted member list.
    Union(Vec<Name>),
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Scalar(name) => f.write_str(name),
            ResolvedType::Union(members) => write!(f, "Union({})", members.join(", ")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct UnionType {
    pub members: Vec<Name>,
    pub alias: Option<Name>,
}

/// Every distinct type in the model, in first-use order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct TypeTable {
    pub scalars: IndexSet<Name>,
    pub unions: Vec<UnionType>,
}

impl TypeTable {
    pub fn contains_scalar(&self, name: &str) -> bool {
        self.scalars.contains(name)
    }

    pub fn union(&self, members: &[Name]) -> Option<&UnionType> {
        self.unions.iter().find(|u| u.members == members)
    }

    pub(crate) fn add_scalar(&mut self, name: &Name) {
        if !self.scalars.contains(name) {
            self.scalars.insert(name.clone());
        }
    }

    /// Add a union signature once, remembering its alias.
    /// Returns the conflicting alias pair if the signature already has another alias.
    pub(crate) fn add_union(
        &mut self,
        members: &[Name],
        alias: Option<&Name>,
    ) -> Result<(), (Name, Name)> {
        for member in members {
            self.add_scalar(member);
        }
        if let Some(existing) = self.unions.iter_mut().find(|u| u.members == members) {
            return match (&existing.alias, alias) {
                (Some(a), Some(b)) if a != b => Err((a.clone(), b.clone())),
                (None, Some(b)) => {
                    existing.alias = Some(b.clone());
                    Ok(())
                }
                _ => Ok(()),
            };
        }
        self.unions.push(UnionType {
            members: members.to_vec(),
            alias: alias.cloned(),
        });
        Ok(())
    }
}

// ============================================================================
// STATE MODELS
// ============================================================================

/// Outcome of one event in one state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(tag = "outcome", rename_all = "lowercase")
)]
pub enum Outcome {
    Transition { target: Name },
    Ignore,
    CantHappen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "interchange",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum NormalizedStateKind {
    Normal,
    Deletion,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct NormalizedState {
    pub name: Name,
    pub kind: NormalizedStateKind,
    pub activity: Option<String>,
    /// One outcome per model event, in event declaration order.
    pub transitions: IndexMap<Name, Outcome>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct CreationPair {
    pub event: Name,
    pub target: Name,
}

/// Synthetic state the creation events leave from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct InitialPseudoState {
    pub creations: Vec<CreationPair>,
    pub transitions: IndexMap<Name, Outcome>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(Serialize, Deserialize))]
pub struct NormalizedStateModel {
    pub domain: Name,
    pub kind: StateModelKind,
    pub states: Vec<NormalizedState>,
    pub events: Vec<EventDecl>,
    pub initial: Option<InitialPseudoState>,
}

impl NormalizedStateModel {
    pub fn name(&self) -> &str {
        match &self.kind {
            StateModelKind::Lifecycle { class } => class,
            StateModelKind::Assigner { relationship } => relationship.as_str(),
        }
    }

    pub fn state(&self, name: &str) -> Option<&NormalizedState> {
        self.states.iter().find(|s| s.name == name)
    }
}
