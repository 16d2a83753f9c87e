//! Phase 6: State-model normalization.
//!
//! Completes each state's transition table over the model's events and
//! gathers creation states into a synthetic initial pseudo-state.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::base::Name;
use crate::hir::errors::AnalysisError;
use crate::hir::model::{
    CreationPair, InitialPseudoState, NormalizedState, NormalizedStateKind, NormalizedStateModel,
    Outcome,
};
use crate::hir::resolver::ModelResolver;
use crate::syntax::{StateDecl, StateKind, StateModelDecl, StateModelKind};

pub(crate) fn normalize_state_models(ctx: &mut ModelResolver<'_>) -> Result<(), AnalysisError> {
    let input = ctx.input;
    for decl in &input.state_models {
        check_owner(ctx, decl)?;
        let model = normalize(decl)?;
        tracing::trace!(
            "[STATE] '{}': {} states, {} events, initial: {}",
            model.name(),
            model.states.len(),
            model.events.len(),
            model.initial.is_some()
        );
        ctx.state_models.push(model);
    }
    tracing::debug!("[STATE] {} state models", ctx.state_models.len());
    Ok(())
}

fn check_owner(ctx: &ModelResolver<'_>, decl: &StateModelDecl) -> Result<(), AnalysisError> {
    match &decl.kind {
        StateModelKind::Lifecycle { class } if !ctx.classes.contains_key(class) => {
            Err(AnalysisError::UnknownLifecycleClass {
                domain: decl.domain.clone(),
                class: class.clone(),
            })
        }
        StateModelKind::Assigner { relationship } if !ctx.relationships.contains_key(relationship) => {
            Err(AnalysisError::UnknownAssignerRelationship {
                domain: decl.domain.clone(),
                rnum: relationship.clone(),
            })
        }
        _ => Ok(()),
    }
}

/// Normalize one state model on its own.
pub(crate) fn normalize(decl: &StateModelDecl) -> Result<NormalizedStateModel, AnalysisError> {
    let model = decl.name();

    let mut events: Vec<Name> = Vec::with_capacity(decl.events.len());
    for event in &decl.events {
        if events.contains(&event.name) {
            return Err(AnalysisError::DuplicateEvent {
                model,
                event: event.name.clone(),
            });
        }
        events.push(event.name.clone());
    }

    let mut state_names: FxHashSet<&Name> = FxHashSet::default();
    for state in &decl.states {
        if !state_names.insert(&state.name) {
            return Err(AnalysisError::DuplicateState {
                model,
                state: state.name.clone(),
            });
        }
    }

    let mut creations: Vec<CreationPair> = Vec::new();
    let mut states = Vec::with_capacity(decl.states.len());
    for state in &decl.states {
        let kind = match &state.kind {
            StateKind::Creation { event } => {
                if !events.contains(event) {
                    return Err(AnalysisError::UnknownEvent {
                        model,
                        state: state.name.clone(),
                        event: event.clone(),
                    });
                }
                if let Some(existing) = creations.iter().find(|c| &c.event == event) {
                    return Err(AnalysisError::ConflictingCreationEvent {
                        model,
                        event: event.clone(),
                        first: existing.target.clone(),
                        second: state.name.clone(),
                    });
                }
                creations.push(CreationPair {
                    event: event.clone(),
                    target: state.name.clone(),
                });
                NormalizedStateKind::Normal
            }
            StateKind::Normal => NormalizedStateKind::Normal,
            StateKind::Deletion => NormalizedStateKind::Deletion,
        };
        states.push(NormalizedState {
            name: state.name.clone(),
            kind,
            activity: state.activity.clone(),
            transitions: complete_transitions(&model, state, &events, &state_names)?,
        });
    }

    let initial = (!creations.is_empty()).then(|| {
        let transitions = events
            .iter()
            .map(|event| {
                let outcome = match creations.iter().find(|c| &c.event == event) {
                    Some(pair) => Outcome::Transition {
                        target: pair.target.clone(),
                    },
                    None => Outcome::CantHappen,
                };
                (event.clone(), outcome)
            })
            .collect();
        InitialPseudoState {
            creations,
            transitions,
        }
    });

    Ok(NormalizedStateModel {
        domain: decl.domain.clone(),
        kind: decl.kind.clone(),
        states,
        events: decl.events.clone(),
        initial,
    })
}

/// One outcome per model event, in event order.
fn complete_transitions(
    model: &Name,
    state: &StateDecl,
    events: &[Name],
    states: &FxHashSet<&Name>,
) -> Result<IndexMap<Name, Outcome>, AnalysisError> {
    let mut listed: IndexMap<&Name, Outcome> = IndexMap::new();
    for transition in &state.transitions {
        if !events.contains(&transition.event) {
            return Err(AnalysisError::UnknownEvent {
                model: model.clone(),
                state: state.name.clone(),
                event: transition.event.clone(),
            });
        }
        let outcome = match &transition.target {
            Some(target) if !states.contains(target) => {
                return Err(AnalysisError::UnknownState {
                    model: model.clone(),
                    state: state.name.clone(),
                    event: transition.event.clone(),
                    target: target.clone(),
                });
            }
            Some(target) => Outcome::Transition {
                target: target.clone(),
            },
            None => Outcome::Ignore,
        };
        if listed.insert(&transition.event, outcome).is_some() {
            return Err(AnalysisError::DuplicateTransition {
                model: model.clone(),
                state: state.name.clone(),
                event: transition.event.clone(),
            });
        }
    }

    Ok(events
        .iter()
        .map(|event| {
            let outcome = listed.get(event).cloned().unwrap_or(Outcome::CantHappen);
            (event.clone(), outcome)
        })
        .collect())
}
