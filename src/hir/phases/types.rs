//! Phase 5: Type resolution.
//!
//! Every `(class, attribute)` gets a dense index. Referential mappings merge
//! indices into equivalence classes with a union-find; union bindings add
//! union-choice edges between classes instead. Each class then resolves to
//! one scalar or one sorted union of scalars.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{Name, UnionFind};
use crate::hir::errors::{AnalysisError, AttributeLocation, TypeDeclaration};
use crate::hir::model::ResolvedType;
use crate::hir::resolver::ModelResolver;

// ============================================================================
// ATTRIBUTE SPACE
// ============================================================================

struct Slot {
    location: AttributeLocation,
    scalar: Option<Name>,
    /// Sorted, deduplicated.
    union: Option<Vec<Name>>,
}

/// Dense ids over every attribute, ignored ones included.
struct AttributeSpace {
    slots: Vec<Slot>,
    ids: FxHashMap<(Name, Name), usize>,
}

impl AttributeSpace {
    fn build(ctx: &ModelResolver<'_>) -> Self {
        let mut space = AttributeSpace {
            slots: Vec::new(),
            ids: FxHashMap::default(),
        };
        for class in ctx.classes.values() {
            for attr in class.all_attributes() {
                let key = (class.name.clone(), attr.name.clone());
                if space.ids.contains_key(&key) {
                    continue;
                }
                space.ids.insert(key, space.slots.len());
                space.slots.push(Slot {
                    location: AttributeLocation {
                        class: class.name.clone(),
                        attribute: attr.name.clone(),
                        subsystem: class.subsystem.clone(),
                    },
                    scalar: attr.declared_type.clone(),
                    union: attr.declared_union.as_ref().map(|members| {
                        let sorted: BTreeSet<Name> = members.iter().cloned().collect();
                        sorted.into_iter().collect()
                    }),
                });
            }
        }
        space
    }

    fn id(&self, class: &Name, attribute: &Name) -> Option<usize> {
        self.ids.get(&(class.clone(), attribute.clone())).copied()
    }

    fn len(&self) -> usize {
        self.slots.len()
    }
}

// ============================================================================
// DECLARATIONS
// ============================================================================

/// Explicit declarations reachable from one equivalence class.
#[derive(Default)]
struct Declared {
    scalar: Option<Name>,
    union: Option<Vec<Name>>,
    all: Vec<TypeDeclaration>,
}

impl Declared {
    /// Type set of an index without union-choice edges.
    fn base(&self) -> BTreeSet<Name> {
        match (&self.union, &self.scalar) {
            (Some(members), _) if !members.is_empty() => members.iter().cloned().collect(),
            (_, Some(scalar)) => BTreeSet::from([scalar.clone()]),
            _ => BTreeSet::new(),
        }
    }
}

fn collect_declarations(
    space: &AttributeSpace,
    roots: &[usize],
) -> Result<FxHashMap<usize, Declared>, AnalysisError> {
    let mut declared: FxHashMap<usize, Declared> = FxHashMap::default();
    let mut conflicting: Vec<usize> = Vec::new();

    for (id, slot) in space.slots.iter().enumerate() {
        let root = roots[id];
        let entry = declared.entry(root).or_default();
        if let Some(scalar) = &slot.scalar {
            entry.all.push(TypeDeclaration {
                location: slot.location.clone(),
                declared: scalar.to_string(),
            });
            match &entry.scalar {
                Some(existing) if existing != scalar => conflicting.push(root),
                Some(_) => {}
                None => entry.scalar = Some(scalar.clone()),
            }
        }
        if let Some(members) = &slot.union {
            entry.all.push(TypeDeclaration {
                location: slot.location.clone(),
                declared: ResolvedType::Union(members.clone()).to_string(),
            });
            match &entry.union {
                Some(existing) if existing != members => conflicting.push(root),
                Some(_) => {}
                None => entry.union = Some(members.clone()),
            }
        }
    }

    if let Some(root) = conflicting.first() {
        let declarations = declared
            .remove(root)
            .map(|d| d.all)
            .unwrap_or_default();
        return Err(AnalysisError::MultipleTypeDefinitions { declarations });
    }
    Ok(declared)
}

// ============================================================================
// TYPE SETS
// ============================================================================

struct Frame {
    index: usize,
    next: usize,
    acc: BTreeSet<Name>,
    partial: bool,
}

impl Frame {
    fn new(index: usize) -> Self {
        Self {
            index,
            next: 0,
            acc: BTreeSet::new(),
            partial: false,
        }
    }
}

/// Lazily computed, memoized type sets of union-edged equivalence classes.
struct TypeSets<'t> {
    edges: &'t FxHashMap<usize, Vec<usize>>,
    declared: &'t FxHashMap<usize, Declared>,
    memo: FxHashMap<usize, BTreeSet<Name>>,
}

impl TypeSets<'_> {
    fn base(&self, index: usize) -> BTreeSet<Name> {
        self.declared
            .get(&index)
            .map(Declared::base)
            .unwrap_or_default()
    }

    /// A cycle back to an index still being computed contributes nothing and
    /// leaves the frames on the way partial; only complete frames and the
    /// root are memoized.
    fn resolve(&mut self, root: usize) -> BTreeSet<Name> {
        if let Some(done) = self.memo.get(&root) {
            return done.clone();
        }
        if !self.edges.contains_key(&root) {
            return self.base(root);
        }

        let mut in_progress: FxHashSet<usize> = FxHashSet::default();
        in_progress.insert(root);
        let mut stack = vec![Frame::new(root)];

        while let Some(top) = stack.last_mut() {
            let targets = self.edges.get(&top.index).map(Vec::as_slice).unwrap_or(&[]);
            if let Some(&target) = targets.get(top.next) {
                top.next += 1;
                if let Some(done) = self.memo.get(&target) {
                    top.acc.extend(done.iter().cloned());
                } else if in_progress.contains(&target) {
                    tracing::trace!("[TYPES] cycle {} -> {}", top.index, target);
                    top.partial = true;
                } else if !self.edges.contains_key(&target) {
                    let base = self.base(target);
                    top.acc.extend(base);
                } else {
                    in_progress.insert(target);
                    stack.push(Frame::new(target));
                }
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            in_progress.remove(&frame.index);
            match stack.last_mut() {
                Some(parent) => {
                    parent.acc.extend(frame.acc.iter().cloned());
                    if frame.partial {
                        parent.partial = true;
                    } else {
                        self.memo.insert(frame.index, frame.acc);
                    }
                }
                None => {
                    self.memo.insert(frame.index, frame.acc.clone());
                    return frame.acc;
                }
            }
        }
        BTreeSet::new()
    }
}

// ============================================================================
// PHASE ENTRY
// ============================================================================

pub(crate) fn resolve_types(ctx: &mut ModelResolver<'_>) -> Result<(), AnalysisError> {
    let space = AttributeSpace::build(ctx);
    let mut sets = UnionFind::new(space.len());

    for (referred, refs) in ctx.referential.iter() {
        for reference in refs.relationships.values() {
            for data in reference.all_data() {
                for (referring, identifier) in &data.attr_map {
                    let from = space.id(&data.formalizing_class, referring);
                    let to = space.id(referred, identifier);
                    if let (Some(a), Some(b)) = (from, to) {
                        sets.union(a, b);
                    }
                }
            }
        }
    }
    for link in &ctx.ignored_links {
        let from = space.id(&link.class, &link.attribute);
        let to = space.id(&link.target_class, &link.target_attribute);
        if let (Some(a), Some(b)) = (from, to) {
            sets.union(a, b);
        }
    }

    let roots: Vec<usize> = (0..space.len()).map(|id| sets.find(id)).collect();

    let mut edges: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
    for binding in &ctx.union_bindings {
        let from = space.id(&binding.class, &binding.attribute);
        let to = space.id(&binding.target_class, &binding.target_attribute);
        if let (Some(a), Some(b)) = (from, to) {
            let targets = edges.entry(roots[a]).or_default();
            if !targets.contains(&roots[b]) {
                targets.push(roots[b]);
            }
        }
    }

    let declared = collect_declarations(&space, &roots)?;
    let mut type_sets = TypeSets {
        edges: &edges,
        declared: &declared,
        memo: FxHashMap::default(),
    };

    // root → (type, union alias)
    let mut resolved: FxHashMap<usize, (ResolvedType, Option<Name>)> = FxHashMap::default();
    let mut undefined: Vec<AttributeLocation> = Vec::new();
    let mut empty_roots: FxHashSet<usize> = FxHashSet::default();

    for &root in &roots {
        if resolved.contains_key(&root) || empty_roots.contains(&root) {
            continue;
        }
        let set = type_sets.resolve(root);
        if set.is_empty() {
            empty_roots.insert(root);
            continue;
        }
        let decl = declared.get(&root);
        let conflict = || AnalysisError::MultipleTypeDefinitions {
            declarations: decl.map(|d| d.all.clone()).unwrap_or_default(),
        };
        let members: Vec<Name> = set.into_iter().collect();
        if let Some(union) = decl.and_then(|d| d.union.as_ref()) {
            if !union.is_empty() && union != &members {
                return Err(conflict());
            }
        }
        let scalar = decl.and_then(|d| d.scalar.clone());
        let entry = if members.len() == 1 {
            if scalar.as_ref().is_some_and(|s| *s != members[0]) {
                return Err(conflict());
            }
            (ResolvedType::Scalar(members[0].clone()), None)
        } else {
            // A scalar names a union only alongside a matching member list.
            let listed = decl
                .and_then(|d| d.union.as_ref())
                .is_some_and(|u| !u.is_empty());
            if scalar.is_some() && !listed {
                return Err(conflict());
            }
            (ResolvedType::Union(members), scalar)
        };
        resolved.insert(root, entry);
    }

    for (id, root) in roots.iter().enumerate() {
        if empty_roots.contains(root) {
            undefined.push(space.slots[id].location.clone());
        }
    }
    if !undefined.is_empty() {
        return Err(AnalysisError::TypeNotDefined {
            attributes: undefined,
        });
    }

    annotate(ctx, &space, &roots, &resolved)?;
    tracing::debug!(
        "[TYPES] {} attributes, {} scalars, {} unions",
        space.len(),
        ctx.types.scalars.len(),
        ctx.types.unions.len()
    );
    Ok(())
}

/// Give every attribute its type and fill the deduplicated type table.
fn annotate(
    ctx: &mut ModelResolver<'_>,
    space: &AttributeSpace,
    roots: &[usize],
    resolved: &FxHashMap<usize, (ResolvedType, Option<Name>)>,
) -> Result<(), AnalysisError> {
    let types = &mut ctx.types;
    for class in ctx.classes.values_mut() {
        let class_name = class.name.clone();
        for attr in class.all_attributes_mut() {
            let Some(id) = space.id(&class_name, &attr.name) else {
                continue;
            };
            let Some((ty, alias)) = resolved.get(&roots[id]) else {
                continue;
            };
            match ty {
                ResolvedType::Scalar(name) => types.add_scalar(name),
                ResolvedType::Union(members) => {
                    types
                        .add_union(members, alias.as_ref())
                        .map_err(|(first, second)| AnalysisError::ConflictingUnionAlias {
                            members: members.clone(),
                            aliases: vec![first, second],
                        })?;
                }
            }
            attr.resolved_type = Some(ty.clone());
        }
    }
    Ok(())
}
