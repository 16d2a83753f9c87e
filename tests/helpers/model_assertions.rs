//! Lookups into a resolved model that fail with a readable message.

use mana::Rnum;
use mana::hir::{
    AnalysisError, NormalizedState, RefData, Reference, ResolvedModel, ResolvedType, analyze,
};
use mana::syntax::ModelInput;

/// Analyze and fail the test on any error.
pub fn resolve(input: &ModelInput) -> ResolvedModel {
    match analyze(input) {
        Ok(model) => model,
        Err(e) => panic!("analysis failed: {e}"),
    }
}

/// Analyze and fail the test if analysis succeeds.
pub fn resolve_err(input: &ModelInput) -> AnalysisError {
    match analyze(input) {
        Ok(_) => panic!("analysis succeeded but an error was expected"),
        Err(e) => e,
    }
}

pub fn reference<'m>(model: &'m ResolvedModel, referred: &str, rnum: &str) -> &'m Reference {
    model
        .referential
        .reference(referred, &Rnum::new(rnum))
        .unwrap_or_else(|| panic!("no {rnum} reference recorded for '{referred}'"))
}

pub fn plain<'m>(model: &'m ResolvedModel, referred: &str, rnum: &str) -> &'m RefData {
    reference(model, referred, rnum)
        .plain()
        .unwrap_or_else(|| panic!("{rnum} on '{referred}' has variants"))
}

pub fn type_of<'m>(model: &'m ResolvedModel, class: &str, attribute: &str) -> &'m ResolvedType {
    model
        .attribute_type(class, attribute)
        .unwrap_or_else(|| panic!("'{class}.{attribute}' has no resolved type"))
}

pub fn scalar(name: &str) -> ResolvedType {
    ResolvedType::Scalar(name.into())
}

pub fn state<'m>(model: &'m ResolvedModel, machine: &str, name: &str) -> &'m NormalizedState {
    model
        .state_model(machine)
        .and_then(|m| m.state(name))
        .unwrap_or_else(|| panic!("no state '{name}' in state model '{machine}'"))
}

/// Attribute map as sorted `(referring, identifier)` string pairs.
pub fn pairs(data: &RefData) -> Vec<(&str, &str)> {
    let mut out: Vec<(&str, &str)> = data
        .attr_map
        .iter()
        .map(|(r, i)| (r.as_str(), i.as_str()))
        .collect();
    out.sort();
    out
}
