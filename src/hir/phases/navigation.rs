//! Phase 2: Navigation resolution.
//!
//! Every relationship offers each participating class a set of candidate
//! endpoints. A navigation hint filters those candidates by relationship,
//! target class and phrase; exactly one must survive.

use rustc_hash::FxHashMap;

use crate::base::{Name, Rnum, Side};
use crate::hir::errors::{AnalysisError, NavigationFailure};
use crate::hir::model::{Navigation, ResolvedRelationship};
use crate::hir::resolver::ModelResolver;
use crate::syntax::{NavigationHint, RelationshipShape};

/// One reachable relationship end, as seen from a class.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Candidate {
    rnum: Rnum,
    class: Name,
    phrase: Option<Name>,
    side: Side,
}

impl Candidate {
    fn matches(&self, hint: &NavigationHint) -> bool {
        hint.rnum.as_ref().is_none_or(|r| *r == self.rnum)
            && hint.class.as_ref().is_none_or(|c| *c == self.class)
            && hint
                .phrase
                .as_ref()
                .is_none_or(|p| self.phrase.as_ref() == Some(p))
    }
}

/// Replace every attribute's raw hints with resolved navigation records.
pub(crate) fn resolve_navigation(ctx: &mut ModelResolver<'_>) -> Result<(), AnalysisError> {
    let candidates = candidate_table(ctx.relationships.values());
    let mut resolved = 0usize;

    for class in ctx.classes.values_mut() {
        let class_candidates = candidates.get(&class.name).map(Vec::as_slice).unwrap_or(&[]);
        let class_name = class.name.clone();
        for attr in class.all_attributes_mut() {
            let hints = std::mem::take(&mut attr.hints);
            for hint in hints {
                let navigation = select(class_candidates, &hint).map_err(|failure| {
                    AnalysisError::BadNavigation {
                        class: class_name.clone(),
                        attribute: attr.name.clone(),
                        hint: describe(&hint),
                        failure,
                    }
                })?;
                attr.navigations.push(navigation);
                resolved += 1;
            }
        }
    }

    tracing::debug!("[NAV] resolved {} navigation hints", resolved);
    Ok(())
}

/// Candidate endpoints per class, deduplicated, in relationship order.
fn candidate_table<'r>(
    relationships: impl Iterator<Item = &'r ResolvedRelationship>,
) -> FxHashMap<Name, Vec<Candidate>> {
    let mut table: FxHashMap<Name, Vec<Candidate>> = FxHashMap::default();
    let mut add = |from: &Name, candidate: Candidate| {
        let entry = table.entry(from.clone()).or_default();
        if !entry.contains(&candidate) {
            entry.push(candidate);
        }
    };

    for rel in relationships.filter(|r| !r.is_ordinal()) {
        match &rel.shape {
            RelationshipShape::Association {
                p_side,
                t_side,
                association_class,
            } => {
                for (side, this, other) in [(Side::P, p_side, t_side), (Side::T, t_side, p_side)] {
                    let from = association_class.as_ref().unwrap_or(&other.class);
                    add(
                        from,
                        Candidate {
                            rnum: rel.rnum.clone(),
                            class: this.class.clone(),
                            phrase: Some(this.phrase.clone()),
                            side,
                        },
                    );
                }
            }
            RelationshipShape::Generalization {
                superclass,
                subclasses,
            } => {
                for subclass in subclasses {
                    add(
                        subclass,
                        Candidate {
                            rnum: rel.rnum.clone(),
                            class: superclass.clone(),
                            phrase: None,
                            side: Side::Superclass,
                        },
                    );
                }
            }
        }
    }
    table
}

fn select(candidates: &[Candidate], hint: &NavigationHint) -> Result<Navigation, NavigationFailure> {
    let mut survivors = candidates.iter().filter(|c| c.matches(hint));
    let first = survivors.next().ok_or(NavigationFailure::NoSolution)?;
    let extra = survivors.count();
    if extra > 0 {
        return Err(NavigationFailure::MultipleSolutions(extra + 1));
    }
    tracing::trace!(
        "[NAV] {} -> {} '{}' ({})",
        describe(hint),
        first.rnum,
        first.class,
        first.side
    );
    Ok(Navigation {
        rnum: first.rnum.clone(),
        class: first.class.clone(),
        phrase: first.phrase.clone(),
        side: first.side,
        rename: hint.rename.clone(),
    })
}

fn describe(hint: &NavigationHint) -> String {
    let mut parts = Vec::new();
    if let Some(rnum) = &hint.rnum {
        parts.push(format!("relationship {rnum}"));
    }
    if let Some(class) = &hint.class {
        parts.push(format!("class {class}"));
    }
    if let Some(phrase) = &hint.phrase {
        parts.push(format!("phrase '{phrase}'"));
    }
    if parts.is_empty() {
        "any".to_string()
    } else {
        parts.join(", ")
    }
}
