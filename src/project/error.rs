use std::path::PathBuf;

use thiserror::Error;

use crate::hir::AnalysisError;
use crate::interchange::InterchangeError;

/// Failure to load or analyze a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: InterchangeError,
    },

    #[error(transparent)]
    Interchange(#[from] InterchangeError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl ProjectError {
    pub(crate) fn document(path: impl Into<PathBuf>, source: InterchangeError) -> Self {
        Self::Document {
            path: path.into(),
            source,
        }
    }
}
