//! Resolution context and pipeline driver.
//!
//! A [`ModelResolver`] holds every table built during one analysis run.
//! The phases in [`super::phases`] each take it by `&mut` and fill in their
//! part; [`ModelResolver::run`] calls them in order and hands back the
//! finished [`ResolvedModel`].

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::diagnostics::DiagnosticCollector;
use super::errors::AnalysisError;
use super::model::{
    NormalizedStateModel, OrdinalInfo, ReferentialTable, ResolvedClass, ResolvedModel,
    ResolvedRelationship, ResolvedSubsystem, TypeTable,
};
use super::options::AnalysisOptions;
use super::phases;
use crate::base::{Name, Rnum};
use crate::syntax::ModelInput;

/// A union-choice edge: `class.attribute` takes the type of
/// `target_class.target_attribute` as one of its union members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UnionBinding {
    pub rnum: Rnum,
    pub class: Name,
    pub attribute: Name,
    pub target_class: Name,
    pub target_attribute: Name,
}

/// A match left out of the referential table because the referring
/// attribute is ignored. The two attributes still share one type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct IgnoredLink {
    pub class: Name,
    pub attribute: Name,
    pub target_class: Name,
    pub target_attribute: Name,
}

/// Working state for one analysis run.
pub struct ModelResolver<'a> {
    pub(crate) input: &'a ModelInput,
    pub(crate) options: AnalysisOptions,
    pub(crate) subsystems: IndexMap<Name, ResolvedSubsystem>,
    pub(crate) classes: IndexMap<Name, ResolvedClass>,
    /// Class → declaring subsystem. Also holds late-bound imports.
    pub(crate) class_to_subsystem: FxHashMap<Name, Name>,
    pub(crate) relationships: IndexMap<Rnum, ResolvedRelationship>,
    pub(crate) referential: ReferentialTable,
    pub(crate) union_bindings: Vec<UnionBinding>,
    pub(crate) ignored_links: Vec<IgnoredLink>,
    pub(crate) ordinals: IndexMap<Rnum, OrdinalInfo>,
    pub(crate) types: TypeTable,
    pub(crate) state_models: Vec<NormalizedStateModel>,
    pub(crate) diagnostics: DiagnosticCollector,
}

impl<'a> ModelResolver<'a> {
    pub fn new(input: &'a ModelInput, options: AnalysisOptions) -> Self {
        Self {
            input,
            options,
            subsystems: IndexMap::new(),
            classes: IndexMap::new(),
            class_to_subsystem: FxHashMap::default(),
            relationships: IndexMap::new(),
            referential: ReferentialTable::new(),
            union_bindings: Vec::new(),
            ignored_links: Vec::new(),
            ordinals: IndexMap::new(),
            types: TypeTable::default(),
            state_models: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Run every phase in order. The first inconsistency aborts the run.
    pub fn run(mut self) -> Result<ResolvedModel, AnalysisError> {
        tracing::debug!(
            "[ANALYZE] {} subsystems, {} state models",
            self.input.subsystems.len(),
            self.input.state_models.len()
        );

        phases::merge_declarations(&mut self)?;
        phases::resolve_navigation(&mut self)?;
        phases::resolve_referentials(&mut self)?;
        phases::validate_ordinals(&mut self)?;
        phases::resolve_types(&mut self)?;
        phases::normalize_state_models(&mut self)?;

        let warnings = self.diagnostics.into_vec();
        tracing::debug!(
            "[ANALYZE] done: {} classes, {} relationships, {} warnings",
            self.classes.len(),
            self.relationships.len(),
            warnings.len()
        );

        Ok(ResolvedModel {
            subsystems: self.subsystems,
            classes: self.classes,
            relationships: self.relationships,
            referential: self.referential,
            ordinals: self.ordinals,
            types: self.types,
            state_models: self.state_models,
            warnings,
        })
    }

    /// Subsystem used in diagnostics for `class`.
    pub(crate) fn subsystem_of(&self, class: &str) -> Name {
        self.class_to_subsystem
            .get(class)
            .cloned()
            .unwrap_or_default()
    }
}

/// Analyze a model with default options.
pub fn analyze(input: &ModelInput) -> Result<ResolvedModel, AnalysisError> {
    analyze_with_options(input, AnalysisOptions::default())
}

pub fn analyze_with_options(
    input: &ModelInput,
    options: AnalysisOptions,
) -> Result<ResolvedModel, AnalysisError> {
    ModelResolver::new(input, options).run()
}
