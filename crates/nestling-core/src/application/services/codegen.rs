//! Codegen workspace and artifact merge.
//!
//! The generator writes into a temporary directory under the destination
//! root. [`CodegenWorkspace`] owns that directory for the length of one run
//! and deletes it when dropped, on success and failure alike.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::Filesystem,
        report::{AppliedOperation, OperationOutcome},
        services::reconciler::{ConflictPolicy, FileReconciler},
    },
    domain::{ModuleLayout, layout::CODEGEN_API_DIR},
    error::NestlingResult,
};

/// Scoped ownership of the generator's output directory.
pub struct CodegenWorkspace<'a> {
    filesystem: &'a dyn Filesystem,
    path: PathBuf,
}

impl<'a> CodegenWorkspace<'a> {
    /// Claim `path`, removing leftovers from an interrupted earlier run.
    pub fn acquire(filesystem: &'a dyn Filesystem, path: PathBuf) -> NestlingResult<Self> {
        if filesystem.exists(&path) {
            warn!(path = %path.display(), "Removing stale codegen output");
            filesystem.remove_dir_all(&path)?;
        }
        filesystem.create_dir_all(&path)?;
        debug!(path = %path.display(), "Codegen workspace acquired");
        Ok(Self { filesystem, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CodegenWorkspace<'_> {
    fn drop(&mut self) {
        if !self.filesystem.exists(&self.path) {
            return;
        }
        match self.filesystem.remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Codegen workspace released"),
            Err(e) => warn!(
                error = %e,
                path = %self.path.display(),
                "Could not delete codegen output; safe to remove manually"
            ),
        }
    }
}

/// Copies generator output into the module layout.
pub struct ArtifactMerger<'a> {
    filesystem: &'a dyn Filesystem,
}

impl<'a> ArtifactMerger<'a> {
    pub fn new(filesystem: &'a dyn Filesystem) -> Self {
        Self { filesystem }
    }

    /// Merge `output_root` into `module_root`.
    ///
    /// Fails when the generator produced no `api/` directory; every other
    /// missing artifact is a tolerated no-op.
    #[instrument(skip_all, fields(output = %output_root.display()))]
    pub fn merge(
        &self,
        layout: &ModuleLayout,
        output_root: &Path,
        module_root: &Path,
    ) -> NestlingResult<Vec<AppliedOperation>> {
        let api_dir = output_root.join(CODEGEN_API_DIR);
        if !self.filesystem.is_dir(&api_dir) {
            return Err(ApplicationError::CodegenFailed {
                reason: format!("generator produced no {} directory", api_dir.display()),
            }
            .into());
        }

        let executor = FileReconciler::new(self.filesystem, ConflictPolicy::DropSource);
        let applied = layout
            .merge_operations(output_root, module_root)
            .into_iter()
            .map(|op| {
                let outcome = executor.apply(&op)?;
                if outcome == OperationOutcome::MissingSource {
                    debug!(operation = %op, "Generator did not produce this artifact");
                }
                Ok(AppliedOperation::new(op, outcome))
            })
            .collect::<NestlingResult<Vec<_>>>()?;

        info!(
            applied = applied
                .iter()
                .filter(|o| o.outcome == OperationOutcome::Applied)
                .count(),
            "Codegen artifacts merged"
        );
        Ok(applied)
    }
}
