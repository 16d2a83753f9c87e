//! Phase 1: Declaration merging.
//!
//! Builds the global subsystem, class and relationship tables, resolves
//! cross-subsystem imports and numbers classes in merge order.

use rustc_hash::FxHashMap;

use crate::base::Name;
use crate::hir::diagnostics::{Diagnostic, codes};
use crate::hir::errors::AnalysisError;
use crate::hir::model::{
    Identifiers, ResolvedAttribute, ResolvedClass, ResolvedRelationship, ResolvedSubsystem,
};
use crate::hir::options::ImportPolicy;
use crate::hir::resolver::ModelResolver;
use crate::syntax::{ClassDecl, RelationshipShape};

/// Merge every subsystem of the input into the resolver's global tables.
pub(crate) fn merge_declarations(ctx: &mut ModelResolver<'_>) -> Result<(), AnalysisError> {
    register_subsystems(ctx)?;
    let declared = index_declared_classes(ctx)?;
    register_relationships(ctx)?;
    register_classes(ctx, &declared)?;
    check_relationship_classes(ctx)?;

    tracing::debug!(
        "[MERGE] {} subsystems, {} classes, {} relationships",
        ctx.subsystems.len(),
        ctx.classes.len(),
        ctx.relationships.len()
    );
    Ok(())
}

fn register_subsystems(ctx: &mut ModelResolver<'_>) -> Result<(), AnalysisError> {
    for subsystem in &ctx.input.subsystems {
        if ctx.subsystems.contains_key(&subsystem.name) {
            return Err(AnalysisError::DuplicateSubsystem {
                subsystem: subsystem.name.clone(),
            });
        }
        ctx.subsystems.insert(
            subsystem.name.clone(),
            ResolvedSubsystem {
                name: subsystem.name.clone(),
                alias: subsystem
                    .alias
                    .clone()
                    .unwrap_or_else(|| subsystem.name.clone()),
                domain: subsystem.domain.clone(),
            },
        );
    }
    Ok(())
}

/// Class → subsystem for every non-imported class declaration.
fn index_declared_classes(
    ctx: &mut ModelResolver<'_>,
) -> Result<FxHashMap<Name, Name>, AnalysisError> {
    let mut declared: FxHashMap<Name, Name> = FxHashMap::default();
    for subsystem in &ctx.input.subsystems {
        for class in subsystem.classes.iter().filter(|c| !c.is_import()) {
            if let Some(first) = declared.get(&class.name) {
                return Err(AnalysisError::DuplicateClassDeclaration {
                    class: class.name.clone(),
                    first: first.clone(),
                    second: subsystem.name.clone(),
                });
            }
            declared.insert(class.name.clone(), subsystem.name.clone());
        }
    }
    ctx.class_to_subsystem = declared.clone();
    Ok(declared)
}

fn register_relationships(ctx: &mut ModelResolver<'_>) -> Result<(), AnalysisError> {
    for subsystem in &ctx.input.subsystems {
        for rel in &subsystem.relationships {
            if let Some(existing) = ctx.relationships.get(&rel.rnum) {
                return Err(AnalysisError::DuplicateRelationship {
                    rnum: rel.rnum.clone(),
                    first: existing.subsystem.clone(),
                    second: subsystem.name.clone(),
                });
            }
            ctx.relationships.insert(
                rel.rnum.clone(),
                ResolvedRelationship {
                    rnum: rel.rnum.clone(),
                    subsystem: subsystem.name.clone(),
                    shape: rel.shape.clone(),
                },
            );
        }
    }
    Ok(())
}

fn register_classes(
    ctx: &mut ModelResolver<'_>,
    declared: &FxHashMap<Name, Name>,
) -> Result<(), AnalysisError> {
    for subsystem in &ctx.input.subsystems {
        for class in &subsystem.classes {
            if let Some(from) = &class.imported_from {
                match declared.get(&class.name) {
                    Some(owner) if same_subsystem(owner, from) => continue,
                    Some(owner) => {
                        return Err(AnalysisError::ClassImportedFromWrongSubsystem {
                            class: class.name.clone(),
                            from: from.clone(),
                            into: subsystem.name.clone(),
                            declared: owner.clone(),
                        });
                    }
                    None if ctx.subsystems.keys().any(|s| same_subsystem(s, from)) => {
                        return Err(AnalysisError::ClassMissingInSubsystem {
                            class: class.name.clone(),
                            subsystem: from.clone(),
                        });
                    }
                    None => {
                        let error = AnalysisError::ClassImportFromMissingSubsystem {
                            class: class.name.clone(),
                            subsystem: from.clone(),
                            into: subsystem.name.clone(),
                        };
                        if ctx.options.import_policy == ImportPolicy::Deny {
                            return Err(error);
                        }
                        tracing::warn!("{error}");
                        ctx.diagnostics.add(
                            Diagnostic::warning(error.to_string())
                                .with_code(codes::IMPORT_FROM_MISSING_SUBSYSTEM)
                                .with_class(class.name.clone())
                                .with_subsystem(subsystem.name.clone()),
                        );
                    }
                }
            }

            // The same late-bound import may appear in several subsystems.
            if ctx.classes.contains_key(&class.name) {
                continue;
            }
            let owner = ctx
                .class_to_subsystem
                .entry(class.name.clone())
                .or_insert_with(|| subsystem.name.clone())
                .clone();
            let number = ctx.classes.len() as u32 + 1;
            tracing::trace!("[MERGE] class '{}' #{} in '{}'", class.name, number, owner);
            ctx.classes
                .insert(class.name.clone(), build_class(class, number, owner));
            ctx.referential.ensure_class(&class.name);
        }
    }
    Ok(())
}

fn build_class(decl: &ClassDecl, number: u32, subsystem: Name) -> ResolvedClass {
    ResolvedClass {
        name: decl.name.clone(),
        number,
        subsystem,
        attributes: decl.attributes.iter().map(ResolvedAttribute::from).collect(),
        ignored_attributes: decl
            .ignored_attributes
            .iter()
            .map(ResolvedAttribute::from)
            .collect(),
        identifiers: Identifiers::from_attributes(decl.attributes.iter()),
    }
}

/// Subsystem names in import clauses match without regard to case.
fn same_subsystem(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Every class a relationship names must exist; ordinals must be reflexive.
fn check_relationship_classes(ctx: &ModelResolver<'_>) -> Result<(), AnalysisError> {
    for rel in ctx.relationships.values() {
        let names = match &rel.shape {
            RelationshipShape::Association {
                p_side,
                t_side,
                association_class,
            } => {
                let mut names: Vec<&Name> = association_class.iter().collect();
                names.push(&p_side.class);
                names.push(&t_side.class);
                names
            }
            RelationshipShape::Generalization {
                superclass,
                subclasses,
            } => std::iter::once(superclass).chain(subclasses).collect(),
        };
        if let Some(unknown) = names.into_iter().find(|n| !ctx.classes.contains_key(*n)) {
            return Err(AnalysisError::UnknownClassInRelationship {
                rnum: rel.rnum.clone(),
                class: unknown.clone(),
                subsystem: rel.subsystem.clone(),
            });
        }

        if rel.is_ordinal() {
            let reflexive = matches!(
                &rel.shape,
                RelationshipShape::Association {
                    p_side,
                    t_side,
                    association_class: None,
                } if p_side.class == t_side.class
            );
            if !reflexive {
                return Err(AnalysisError::OrdinalNotReflexive {
                    rnum: rel.rnum.clone(),
                    subsystem: rel.subsystem.clone(),
                });
            }
        }
    }
    Ok(())
}
