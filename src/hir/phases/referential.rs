//! Phase 3: Referential attribute resolution.
//!
//! For each class and each relationship its attributes formalize, find the
//! class(es) at the other end and work out which referring attribute stands
//! in for which identifier attribute over there.
//!
//! ```text
//! referring class ──rel_other_end──▶ [(side, referred class)]
//!        │
//!        ├── bound attributes  (navigation pinned to a side)
//!        └── free attributes   (no navigation)
//!                 │
//!                 ▼
//!           IdMatcher: per side, per identifier group → candidates
//!                 │
//!                 ▼
//!           cross product, score = unconsumed free attributes
//!                 │
//!                 ▼
//!           unique best option → ReferentialTable
//! ```
//!
//! Union relationship numbers go through the same matcher but end up as
//! [`UnionBinding`]s for the type resolver instead of referential data.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{IdGroup, Name, Rnum, Side};
use crate::hir::errors::{AnalysisError, RefAttrFailure};
use crate::hir::model::{
    Navigation, RefData, ReferenceKind, RelationshipKind, ResolvedAttribute, ResolvedClass,
    VariantKey,
};
use crate::hir::resolver::{IgnoredLink, ModelResolver, UnionBinding};
use crate::syntax::RelationshipShape;

// ============================================================================
// PHASE ENTRY
// ============================================================================

pub(crate) fn resolve_referentials(ctx: &mut ModelResolver<'_>) -> Result<(), AnalysisError> {
    let class_names: Vec<Name> = ctx.classes.keys().cloned().collect();
    for class_name in &class_names {
        let layout = ClassLayout::collect(ctx, class_name)?;
        for rnum in layout.inclusion.keys() {
            resolve_relationship(ctx, class_name, &layout, rnum)?;
        }
        for (rnum, attributes) in &layout.union_inclusion {
            resolve_union(ctx, class_name, &layout, rnum, attributes)?;
        }
    }

    tracing::debug!(
        "[REF] {} referred classes, {} union bindings",
        ctx.referential.iter().filter(|(_, r)| !r.is_empty()).count(),
        ctx.union_bindings.len()
    );
    Ok(())
}

// ============================================================================
// PER-CLASS LAYOUT
// ============================================================================

/// How one class's attributes spread over the relationships they formalize.
struct ClassLayout {
    /// rnum → referring attributes, in declaration order.
    inclusion: IndexMap<Rnum, Vec<Name>>,
    /// rnum → attribute → side → navigation.
    navigations: FxHashMap<Rnum, FxHashMap<Name, IndexMap<Side, Navigation>>>,
    /// rnum → attribute → relationship-level rename.
    renames: FxHashMap<Rnum, FxHashMap<Name, Name>>,
    /// Union rnum → attributes choosing through it.
    union_inclusion: IndexMap<Rnum, Vec<Name>>,
    ignored: FxHashSet<Name>,
}

impl ClassLayout {
    fn collect(ctx: &ModelResolver<'_>, class_name: &Name) -> Result<Self, AnalysisError> {
        let mut layout = ClassLayout {
            inclusion: IndexMap::new(),
            navigations: FxHashMap::default(),
            renames: FxHashMap::default(),
            union_inclusion: IndexMap::new(),
            ignored: FxHashSet::default(),
        };
        let Some(class) = ctx.classes.get(class_name) else {
            return Ok(layout);
        };
        layout.ignored = class
            .ignored_attributes
            .iter()
            .map(|a| a.name.clone())
            .collect();

        for attr in class.all_attributes() {
            layout.add_attribute(class_name, attr)?;
        }
        Ok(layout)
    }

    fn add_attribute(
        &mut self,
        class_name: &Name,
        attr: &ResolvedAttribute,
    ) -> Result<(), AnalysisError> {
        let is_union = |rnum: &Rnum| attr.union_relationships.contains(rnum);

        let mut rnums: IndexSet<Rnum> = IndexSet::new();
        for nav in attr.navigations.iter().filter(|n| !is_union(&n.rnum)) {
            rnums.insert(nav.rnum.clone());
        }
        for rnum in &attr.relationships {
            if !rnum.is_ordinal() && !is_union(rnum) {
                rnums.insert(rnum.clone());
            }
        }

        for rnum in &rnums {
            self.inclusion
                .entry(rnum.clone())
                .or_default()
                .push(attr.name.clone());
            self.add_navigations(class_name, attr, rnum)?;
        }

        for rnum in &attr.union_relationships {
            let members = self.union_inclusion.entry(rnum.clone()).or_default();
            if !members.contains(&attr.name) {
                members.push(attr.name.clone());
            }
            self.add_navigations(class_name, attr, rnum)?;
        }

        for rename in &attr.renames {
            let per_rnum = self.renames.entry(rename.rnum.clone()).or_default();
            if per_rnum.contains_key(&attr.name) {
                return Err(AnalysisError::RedundantRename {
                    rnum: rename.rnum.clone(),
                    class: class_name.clone(),
                    attribute: attr.name.clone(),
                });
            }
            per_rnum.insert(attr.name.clone(), rename.source.clone());
        }
        Ok(())
    }

    fn add_navigations(
        &mut self,
        class_name: &Name,
        attr: &ResolvedAttribute,
        rnum: &Rnum,
    ) -> Result<(), AnalysisError> {
        let mut by_side: IndexMap<Side, Navigation> = IndexMap::new();
        for nav in attr.navigations.iter().filter(|n| &n.rnum == rnum) {
            if by_side.insert(nav.side, nav.clone()).is_some() {
                return Err(AnalysisError::DuplicateNavigation {
                    rnum: rnum.clone(),
                    class: class_name.clone(),
                    attribute: attr.name.clone(),
                });
            }
        }
        if !by_side.is_empty() {
            self.navigations
                .entry(rnum.clone())
                .or_default()
                .insert(attr.name.clone(), by_side);
        }
        Ok(())
    }

    fn general_renames(&self, rnum: &Rnum) -> FxHashMap<Name, Name> {
        self.renames.get(rnum).cloned().unwrap_or_default()
    }
}

// ============================================================================
// OTHER END
// ============================================================================

/// The side(s) and class(es) `class` refers to over `rnum`.
fn rel_other_end(
    ctx: &ModelResolver<'_>,
    rnum: &Rnum,
    class: &Name,
) -> Result<Vec<(Side, Name)>, AnalysisError> {
    let rel = ctx
        .relationships
        .get(rnum)
        .ok_or_else(|| AnalysisError::UnknownReferentialAttribute {
            rnum: rnum.clone(),
            class: class.clone(),
            subsystem: ctx.subsystem_of(class),
        })?;
    let invalid = || AnalysisError::InvalidReferentialAttribute {
        rnum: rnum.clone(),
        class: class.clone(),
        subsystem: ctx.subsystem_of(class),
    };

    match &rel.shape {
        RelationshipShape::Association {
            p_side,
            t_side,
            association_class: Some(assoc),
        } => {
            if assoc == class {
                Ok(vec![
                    (Side::P, p_side.class.clone()),
                    (Side::T, t_side.class.clone()),
                ])
            } else {
                Err(invalid())
            }
        }
        // A reflexive association resolves to its T side.
        RelationshipShape::Association {
            p_side,
            t_side,
            association_class: None,
        } => {
            if &p_side.class == class {
                Ok(vec![(Side::T, t_side.class.clone())])
            } else if &t_side.class == class {
                Ok(vec![(Side::P, p_side.class.clone())])
            } else {
                Err(invalid())
            }
        }
        RelationshipShape::Generalization {
            superclass,
            subclasses,
        } => {
            if subclasses.contains(class) {
                Ok(vec![(Side::Superclass, superclass.clone())])
            } else {
                Err(invalid())
            }
        }
    }
}

// ============================================================================
// BOUND / FREE PARTITION
// ============================================================================

/// One referred side with the attributes navigating to it.
struct SourceSide<'c> {
    side: Side,
    class: &'c ResolvedClass,
    bound: Vec<Name>,
    renames: FxHashMap<Name, Name>,
}

struct Partition<'c> {
    sources: Vec<SourceSide<'c>>,
    free: Vec<Name>,
}

fn partition<'c>(
    ctx: &'c ModelResolver<'_>,
    class_name: &Name,
    layout: &ClassLayout,
    rnum: &Rnum,
    attributes: &[Name],
) -> Result<Partition<'c>, AnalysisError> {
    let other_end = rel_other_end(ctx, rnum, class_name)?;
    let mut sources = Vec::with_capacity(other_end.len());
    for (side, referred) in &other_end {
        let class = ctx.classes.get(referred).ok_or_else(|| {
            AnalysisError::UnknownClassInRelationship {
                rnum: rnum.clone(),
                class: referred.clone(),
                subsystem: ctx.subsystem_of(class_name),
            }
        })?;
        sources.push(SourceSide {
            side: *side,
            class,
            bound: Vec::new(),
            renames: FxHashMap::default(),
        });
    }

    let general = layout.general_renames(rnum);
    let navigations = layout.navigations.get(rnum);
    let mut free = Vec::new();

    for attr in attributes {
        let Some(by_side) = navigations.and_then(|n| n.get(attr)) else {
            free.push(attr.clone());
            continue;
        };
        for (side, nav) in by_side {
            let source = sources
                .iter_mut()
                .find(|s| s.side == *side && s.class.name == nav.class)
                .ok_or_else(|| AnalysisError::InvalidNavigation {
                    rnum: rnum.clone(),
                    class: class_name.clone(),
                    attribute: attr.clone(),
                })?;
            source.bound.push(attr.clone());
            if let Some(rename) = nav.rename.as_ref().or_else(|| general.get(attr)) {
                source.renames.insert(attr.clone(), rename.clone());
            }
        }
    }
    Ok(Partition { sources, free })
}

// ============================================================================
// RELATIONSHIP RESOLUTION
// ============================================================================

fn resolve_relationship(
    ctx: &mut ModelResolver<'_>,
    class_name: &Name,
    layout: &ClassLayout,
    rnum: &Rnum,
) -> Result<(), AnalysisError> {
    let attributes = &layout.inclusion[rnum];
    let matches = {
        let part = partition(ctx, class_name, layout, rnum, attributes)?;
        let matcher = IdMatcher {
            rnum,
            referring: class_name,
            subsystem: ctx.subsystem_of(class_name),
            free_renames: layout.general_renames(rnum),
            attributes: attributes.clone(),
        };
        matcher.run(&part)?
    };

    let (reference_kind, relationship_kind) = classify(&matches);
    let rel = &ctx.relationships[rnum];
    let mut records = Vec::with_capacity(matches.len());
    let mut ignored_links = Vec::new();
    for m in matches {
        let key = match relationship_kind {
            RelationshipKind::Generalization => Some(VariantKey::Subclass(class_name.clone())),
            RelationshipKind::BinaryReflexive => {
                rel.phrase(m.side).cloned().map(VariantKey::Phrase)
            }
            RelationshipKind::Binary => None,
        };
        let mut attr_map: IndexMap<Name, Name> = IndexMap::new();
        for (identifier, referring) in m.trans {
            if layout.ignored.contains(&referring) {
                ignored_links.push(IgnoredLink {
                    class: class_name.clone(),
                    attribute: referring,
                    target_class: m.class.clone(),
                    target_attribute: identifier,
                });
            } else {
                attr_map.insert(referring, identifier);
            }
        }
        tracing::trace!(
            "[REF] {} {} -> {} ({}, {}): {:?}",
            rnum,
            class_name,
            m.class,
            m.side,
            m.group,
            attr_map
        );
        records.push((
            m.class,
            key,
            RefData {
                formalizing_class: class_name.clone(),
                side: m.side,
                id_group: m.group,
                attr_map,
            },
        ));
    }

    ctx.ignored_links.extend(ignored_links);
    for (referred, key, data) in records {
        ctx.referential
            .record(&referred, rnum, reference_kind, relationship_kind, key, data);
    }
    Ok(())
}

fn classify(matches: &[SideMatch]) -> (ReferenceKind, RelationshipKind) {
    match matches {
        [first, ..] if first.side == Side::Superclass => {
            (ReferenceKind::Superclass, RelationshipKind::Generalization)
        }
        [a, b] if a.class == b.class => {
            (ReferenceKind::Associative, RelationshipKind::BinaryReflexive)
        }
        [_, _] => (ReferenceKind::Associative, RelationshipKind::Binary),
        _ => (ReferenceKind::ToOne, RelationshipKind::Binary),
    }
}

fn resolve_union(
    ctx: &mut ModelResolver<'_>,
    class_name: &Name,
    layout: &ClassLayout,
    rnum: &Rnum,
    attributes: &[Name],
) -> Result<(), AnalysisError> {
    let matches = {
        let part = partition(ctx, class_name, layout, rnum, attributes)?;
        let matcher = IdMatcher {
            rnum,
            referring: class_name,
            subsystem: ctx.subsystem_of(class_name),
            free_renames: layout.general_renames(rnum),
            attributes: attributes.to_vec(),
        };
        matcher.run(&part)?
    };

    for m in matches {
        for (identifier, referring) in m.trans {
            tracing::trace!(
                "[REF] union {} {}.{} <- {}.{}",
                rnum,
                class_name,
                referring,
                m.class,
                identifier
            );
            ctx.union_bindings.push(UnionBinding {
                rnum: rnum.clone(),
                class: class_name.clone(),
                attribute: referring,
                target_class: m.class.clone(),
                target_attribute: identifier,
            });
        }
    }
    Ok(())
}

// ============================================================================
// IDENTIFIER MATCHING
// ============================================================================

/// Lower-cased attribute names with the original spelling behind them.
struct NamePool {
    names: IndexSet<Name>,
    original: FxHashMap<Name, Name>,
}

impl NamePool {
    /// Renames apply before lowering. Returns the colliding name on failure.
    fn build(attributes: &[Name], renames: &FxHashMap<Name, Name>) -> Result<Self, Name> {
        let mut pool = NamePool {
            names: IndexSet::new(),
            original: FxHashMap::default(),
        };
        for attr in attributes {
            let key = lower(renames.get(attr).unwrap_or(attr));
            if !pool.names.insert(key.clone()) {
                return Err(key);
            }
            pool.original.insert(key, attr.clone());
        }
        Ok(pool)
    }

    fn has_id(&self) -> bool {
        self.names.contains("id")
    }
}

fn lower(name: &str) -> Name {
    Name::new(name.to_lowercase())
}

/// One identifier group of one side that can be formed.
#[derive(Clone, Debug)]
struct GroupCandidate {
    group: IdGroup,
    /// Free names this candidate consumes, plus its placeholder if any.
    sources: BTreeSet<Name>,
    /// Identifier attribute → referring attribute.
    trans: IndexMap<Name, Name>,
    /// Lower-cased name and identifier attribute of the single unmatched slot.
    placeholder: Option<(Name, Name)>,
}

/// The chosen identifier mapping for one referred side.
#[derive(Clone, Debug)]
struct SideMatch {
    class: Name,
    side: Side,
    group: IdGroup,
    /// Identifier attribute → referring attribute.
    trans: IndexMap<Name, Name>,
}

struct IdMatcher<'r> {
    rnum: &'r Rnum,
    referring: &'r Name,
    subsystem: Name,
    free_renames: FxHashMap<Name, Name>,
    /// Referring attributes reported when matching fails.
    attributes: Vec<Name>,
}

impl IdMatcher<'_> {
    fn fail(&self, reason: RefAttrFailure) -> AnalysisError {
        AnalysisError::RefAttrNotFound {
            rnum: self.rnum.clone(),
            class: self.referring.clone(),
            subsystem: self.subsystem.clone(),
            attributes: self.attributes.clone(),
            reason,
        }
    }

    fn bad_naming(&self, name: Name) -> AnalysisError {
        AnalysisError::BadNaming {
            rnum: self.rnum.clone(),
            class: self.referring.clone(),
            subsystem: self.subsystem.clone(),
            name,
        }
    }

    fn run(&self, part: &Partition<'_>) -> Result<Vec<SideMatch>, AnalysisError> {
        let free = NamePool::build(&part.free, &self.free_renames)
            .map_err(|name| self.bad_naming(name))?;
        let mut rename_rejected = false;

        let mut per_side: Vec<Vec<GroupCandidate>> = Vec::with_capacity(part.sources.len());
        for source in &part.sources {
            let bound = NamePool::build(&source.bound, &source.renames)
                .map_err(|name| self.bad_naming(name))?;
            let candidates = self.side_candidates(source, &bound, &free, &mut rename_rejected);
            if candidates.is_empty() {
                return Err(self.fail(if rename_rejected {
                    RefAttrFailure::AmbiguousRename
                } else {
                    RefAttrFailure::NoSolution
                }));
            }
            per_side.push(candidates);
        }

        let free_set: BTreeSet<Name> = free.names.iter().cloned().collect();
        let mut best: Option<(usize, Vec<Vec<(IdGroup, IndexMap<Name, Name>)>>)> = None;

        for option in cross_product(&per_side) {
            let sources: BTreeSet<Name> = option
                .iter()
                .flat_map(|c| c.sources.iter().cloned())
                .collect();
            if sources.len() != free_set.len() {
                continue;
            }
            let remainder: Vec<&Name> = free_set.difference(&sources).collect();
            let score = remainder.len();
            if score > 1 {
                continue;
            }
            let to_rename = sources.difference(&free_set).next();

            let mut assignment = Vec::with_capacity(option.len());
            let mut ok = true;
            for candidate in &option {
                let mut trans = candidate.trans.clone();
                if let Some((key, identifier)) = &candidate.placeholder {
                    if Some(key) == to_rename {
                        if let Some(rest) = remainder.first() {
                            let origin = &free.original[*rest];
                            if self.free_renames.contains_key(origin) {
                                rename_rejected = true;
                                ok = false;
                            }
                            trans.insert(identifier.clone(), origin.clone());
                        }
                    }
                }
                assignment.push((candidate.group, trans));
            }
            tracing::trace!(
                "[REF] {} option {:?} score {} ok {}",
                self.rnum,
                option.iter().map(|c| c.group).collect::<Vec<_>>(),
                score,
                ok
            );
            if !ok {
                continue;
            }

            if best.as_ref().is_none_or(|(best_score, _)| score < *best_score) {
                best = Some((score, vec![assignment]));
            } else if let Some((best_score, winners)) = &mut best {
                if score == *best_score {
                    winners.push(assignment);
                }
            }
        }

        let Some((_, mut winners)) = best else {
            return Err(self.fail(if rename_rejected {
                RefAttrFailure::AmbiguousRename
            } else {
                RefAttrFailure::NoSolution
            }));
        };
        if winners.len() > 1 {
            return Err(self.fail(RefAttrFailure::MultipleSources));
        }
        let winner = winners.pop().unwrap_or_default();
        Ok(part
            .sources
            .iter()
            .zip(winner)
            .map(|(source, (group, trans))| SideMatch {
                class: source.class.name.clone(),
                side: source.side,
                group,
                trans,
            })
            .collect())
    }

    /// Identifier groups of one side that the bound and free names can form.
    fn side_candidates(
        &self,
        source: &SourceSide<'_>,
        bound: &NamePool,
        free: &NamePool,
        rename_rejected: &mut bool,
    ) -> Vec<GroupCandidate> {
        let class = source.class;
        let class_key = lower(&class.name);
        let convert_id = !free.has_id()
            && !bound.has_id()
            && !class.attributes.iter().any(|a| lower(&a.name) == class_key);

        let mut out = Vec::new();
        for (group, members) in class.identifiers.iter() {
            let mut sources = BTreeSet::new();
            let mut trans = IndexMap::new();
            let mut unknown = Vec::new();
            let mut remaining = bound.names.clone();

            for identifier in members {
                let mut key = lower(identifier);
                if convert_id && key == "id" {
                    key = class_key.clone();
                }
                if remaining.shift_remove(&key) {
                    trans.insert(identifier.clone(), bound.original[&key].clone());
                } else if free.names.contains(&key) {
                    trans.insert(identifier.clone(), free.original[&key].clone());
                    sources.insert(key);
                } else {
                    unknown.push(identifier.clone());
                }
            }

            let mut placeholder = None;
            let mut rename_ok = true;
            if unknown.len() == 1 {
                if let Some(identifier) = unknown.pop() {
                    if let Some(key) = remaining.shift_remove_index(0) {
                        let origin = bound.original[&key].clone();
                        if source.renames.contains_key(&origin) {
                            rename_ok = false;
                            *rename_rejected = true;
                        }
                        trans.insert(identifier, origin);
                    } else {
                        let key = lower(&identifier);
                        sources.insert(key.clone());
                        placeholder = Some((key, identifier));
                    }
                }
            }

            if unknown.is_empty() && remaining.is_empty() && rename_ok {
                out.push(GroupCandidate {
                    group,
                    sources,
                    trans,
                    placeholder,
                });
            }
        }
        out
    }
}

/// Every combination picking one candidate per side.
fn cross_product(per_side: &[Vec<GroupCandidate>]) -> Vec<Vec<&GroupCandidate>> {
    let mut options: Vec<Vec<&GroupCandidate>> = vec![Vec::new()];
    for candidates in per_side {
        options = options
            .iter()
            .flat_map(|prefix| {
                candidates.iter().map(move |c| {
                    let mut next = prefix.clone();
                    next.push(c);
                    next
                })
            })
            .collect();
    }
    options
}
