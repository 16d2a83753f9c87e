use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hir::AnalysisOptions;
use crate::interchange::{InterchangeError, Json, Yaml};

/// The document list and options of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    #[serde(default)]
    pub name: String,
    /// Subsystem documents, relative to the manifest.
    #[serde(default)]
    pub subsystems: Vec<PathBuf>,
    /// State-model documents, relative to the manifest.
    #[serde(default)]
    pub state_models: Vec<PathBuf>,
    #[serde(default)]
    pub options: AnalysisOptions,
}

impl ProjectManifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_subsystem(mut self, path: impl Into<PathBuf>) -> Self {
        self.subsystems.push(path.into());
        self
    }

    pub fn with_state_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_models.push(path.into());
        self
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    /// Read a manifest from a JSON or YAML file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, InterchangeError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        match manifest_kind(path)? {
            ManifestKind::Json => Json.decode(&bytes),
            ManifestKind::Yaml => Yaml.decode(&bytes),
        }
    }

    /// Write the manifest, in the format named by the file extension.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), InterchangeError> {
        let path = path.as_ref();
        let bytes = match manifest_kind(path)? {
            ManifestKind::Json => Json.encode(self)?,
            ManifestKind::Yaml => Yaml.encode(self)?,
        };
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

enum ManifestKind {
    Json,
    Yaml,
}

fn manifest_kind(path: &Path) -> Result<ManifestKind, InterchangeError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("json") => Ok(ManifestKind::Json),
        Some("yaml" | "yml") => Ok(ManifestKind::Yaml),
        _ => Err(InterchangeError::unsupported_path(path)),
    }
}
