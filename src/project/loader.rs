use std::path::{Path, PathBuf};

use crate::hir::{ResolvedModel, analyze_with_options};
use crate::interchange::{DocumentFormat, InterchangeError, detect_format};
use crate::syntax::ModelInput;

use super::{ProjectError, ProjectManifest};

/// Loads the documents a manifest names and runs the analyzer over them.
#[derive(Debug, Clone)]
pub struct ProjectLoader {
    manifest: ProjectManifest,
    root: PathBuf,
}

impl ProjectLoader {
    /// Document paths are resolved against `root`.
    pub fn new(manifest: ProjectManifest, root: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            root: root.into(),
        }
    }

    /// Read a manifest file; its directory becomes the document root.
    pub fn from_manifest_file(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let manifest = ProjectManifest::read_from_file(path)
            .map_err(|e| ProjectError::document(path, e))?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!(
            "[PROJECT] manifest '{}': {} subsystems, {} state models",
            manifest.name,
            manifest.subsystems.len(),
            manifest.state_models.len()
        );
        Ok(Self::new(manifest, root))
    }

    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    /// Read every listed document into one analysis input.
    pub fn load(&self) -> Result<ModelInput, ProjectError> {
        let mut input = ModelInput::new();
        for relative in &self.manifest.subsystems {
            let (path, format, bytes) = self.read_document(relative)?;
            let subsystem = format
                .read_subsystem(&bytes)
                .map_err(|e| ProjectError::document(&path, e))?;
            input.subsystems.push(subsystem);
        }
        for relative in &self.manifest.state_models {
            let (path, format, bytes) = self.read_document(relative)?;
            let model = format
                .read_state_model(&bytes)
                .map_err(|e| ProjectError::document(&path, e))?;
            input.state_models.push(model);
        }
        Ok(input)
    }

    /// Load and analyze with the manifest's options.
    pub fn analyze(&self) -> Result<ResolvedModel, ProjectError> {
        let input = self.load()?;
        Ok(analyze_with_options(&input, self.manifest.options.clone())?)
    }

    fn read_document(
        &self,
        relative: &Path,
    ) -> Result<(PathBuf, Box<dyn DocumentFormat>, Vec<u8>), ProjectError> {
        let path = self.root.join(relative);
        let Some(format) = detect_format(&path) else {
            return Err(ProjectError::document(
                &path,
                InterchangeError::unsupported_path(&path),
            ));
        };
        let bytes = std::fs::read(&path)
            .map_err(|e| ProjectError::document(&path, InterchangeError::from(e)))?;
        tracing::trace!("[PROJECT] reading {} as {}", path.display(), format.name());
        Ok((path, format, bytes))
    }
}
