//! Scaffold writer - materializes a rendered [`ProjectStructure`].
//!
//! Order matters: module directories first, then every rendered file, then
//! the interface copies (their sources are rendered files). Any I/O error
//! aborts; cleanup is left to the caller.

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ports::Filesystem,
        report::AppliedOperation,
        services::reconciler::{ConflictPolicy, FileReconciler},
    },
    domain::{FileOperation, ModuleLayout, ProjectStructure},
    error::NestlingResult,
};

/// Files and operations produced by one scaffold write.
#[derive(Debug, Default)]
pub struct ScaffoldOutput {
    /// Relative slash paths, in write order.
    pub files_written: Vec<String>,
    pub operations: Vec<AppliedOperation>,
}

pub struct ScaffoldWriter<'a> {
    filesystem: &'a dyn Filesystem,
}

impl<'a> ScaffoldWriter<'a> {
    pub fn new(filesystem: &'a dyn Filesystem) -> Self {
        Self { filesystem }
    }

    #[instrument(skip_all, fields(root = %structure.root().display(), files = structure.file_count()))]
    pub fn write(
        &self,
        structure: &ProjectStructure,
        layout: &ModuleLayout,
    ) -> NestlingResult<ScaffoldOutput> {
        let root = structure.root();
        let executor = FileReconciler::new(self.filesystem, ConflictPolicy::DropSource);
        let mut output = ScaffoldOutput::default();

        self.filesystem.create_dir_all(root)?;

        let (dirs, copies): (Vec<_>, Vec<_>) = layout
            .scaffold_operations()
            .into_iter()
            .map(|op| op.rebased(root))
            .partition(|op| matches!(op, FileOperation::MkdirIfAbsent { .. }));

        for op in dirs {
            let outcome = executor.apply(&op)?;
            output.operations.push(AppliedOperation::new(op, outcome));
        }

        for file in structure.files() {
            let path = file.path.under(root);
            if let Some(parent) = path.parent() {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem.write_file(&path, &file.content)?;
            debug!(path = %file.path, bytes = file.size(), "Wrote file");
            output.files_written.push(file.path.to_slash());
        }

        for op in copies {
            let outcome = executor.apply(&op)?;
            output.operations.push(AppliedOperation::new(op, outcome));
        }

        info!(files = output.files_written.len(), "Base tree written");
        Ok(output)
    }
}
