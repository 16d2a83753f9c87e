//! Common trait for model document formats.

use crate::hir::ResolvedModel;
use crate::syntax::{ModelInput, StateModelDecl, SubsystemDecl};

use super::InterchangeError;

/// Trait for model document formats.
///
/// Implementations decode the parser's structured documents into
/// declaration records and encode the resolved model for downstream
/// consumers. The analyzer itself never touches bytes.
pub trait DocumentFormat: Send + Sync {
    /// Human-readable name of the format.
    fn name(&self) -> &'static str;

    /// File extension(s) for this format.
    fn extensions(&self) -> &'static [&'static str];

    /// MIME type for this format.
    fn mime_type(&self) -> &'static str;

    /// Read one subsystem document.
    fn read_subsystem(&self, input: &[u8]) -> Result<SubsystemDecl, InterchangeError>;

    /// Read one state-model document.
    fn read_state_model(&self, input: &[u8]) -> Result<StateModelDecl, InterchangeError>;

    /// Read a whole analysis input (subsystems and state models) from one document.
    fn read_input(&self, input: &[u8]) -> Result<ModelInput, InterchangeError>;

    /// Write a resolved model.
    fn write_model(&self, model: &ResolvedModel) -> Result<Vec<u8>, InterchangeError>;
}
