//! File reconciler - executes [`FileOperation`]s against a [`Filesystem`].
//!
//! Missing sources are tolerated (reported as `MissingSource`), so a rule
//! table can describe every template variant without knowing which files a
//! given variant actually produced. Only filesystem errors the port cannot
//! express as "absent" propagate.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::Filesystem,
        report::{AppliedOperation, OperationOutcome},
    },
    domain::{FileOperation, RuleTable},
    error::{NestlingError, NestlingResult},
};

/// What to do when a move target already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Delete the source, keep the existing target.
    #[default]
    DropSource,
    /// Abort with `RelocationConflict`.
    Fail,
}

impl FromStr for ConflictPolicy {
    type Err = NestlingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop-source" => Ok(Self::DropSource),
            "fail" => Ok(Self::Fail),
            other => Err(NestlingError::Configuration {
                message: format!(
                    "unknown conflict policy '{other}' (expected 'drop-source' or 'fail')"
                ),
            }),
        }
    }
}

pub struct FileReconciler<'a> {
    filesystem: &'a dyn Filesystem,
    policy: ConflictPolicy,
}

impl<'a> FileReconciler<'a> {
    pub fn new(filesystem: &'a dyn Filesystem, policy: ConflictPolicy) -> Self {
        Self { filesystem, policy }
    }

    /// Apply every rule for this branch, in order.
    #[instrument(skip_all, fields(root = %root.display(), has_api_spec))]
    pub fn reconcile(
        &self,
        table: &RuleTable,
        root: &Path,
        has_api_spec: bool,
    ) -> NestlingResult<Vec<AppliedOperation>> {
        table
            .resolve(root, has_api_spec)
            .into_iter()
            .map(|(class, op)| {
                let outcome = self.apply(&op)?;
                Ok(AppliedOperation::new(op, outcome).in_class(class))
            })
            .collect()
    }

    /// Execute one operation.
    pub fn apply(&self, op: &FileOperation) -> NestlingResult<OperationOutcome> {
        let fs = self.filesystem;
        let outcome = match op {
            FileOperation::MkdirIfAbsent { path } => {
                fs.create_dir_all(path)?;
                OperationOutcome::Applied
            }
            FileOperation::Copy { from, to } => {
                if !fs.exists(from) {
                    OperationOutcome::MissingSource
                } else {
                    fs.copy(from, to)?;
                    OperationOutcome::Applied
                }
            }
            FileOperation::Move { from, to } => {
                if !fs.exists(from) {
                    OperationOutcome::MissingSource
                } else if fs.exists(to) {
                    match self.policy {
                        ConflictPolicy::DropSource => {
                            warn!(
                                from = %from.display(),
                                to = %to.display(),
                                "Relocation target exists, dropping source"
                            );
                            remove(fs, from)?;
                            OperationOutcome::SourceDropped
                        }
                        ConflictPolicy::Fail => {
                            return Err(ApplicationError::RelocationConflict {
                                from: from.clone(),
                                to: to.clone(),
                            }
                            .into());
                        }
                    }
                } else {
                    if let Some(parent) = to.parent() {
                        fs.create_dir_all(parent)?;
                    }
                    fs.rename(from, to)?;
                    OperationOutcome::Applied
                }
            }
            FileOperation::Delete { path } => {
                if !fs.exists(path) {
                    OperationOutcome::MissingSource
                } else {
                    remove(fs, path)?;
                    OperationOutcome::Applied
                }
            }
            FileOperation::RmdirIfEmpty { path } => {
                if !fs.exists(path) {
                    OperationOutcome::MissingSource
                } else if fs.is_dir(path) && fs.list_dir(path)?.is_empty() {
                    fs.remove_dir_all(path)?;
                    OperationOutcome::Applied
                } else {
                    OperationOutcome::NotEmpty
                }
            }
        };

        debug!(operation = %op, ?outcome, "Applied file operation");
        Ok(outcome)
    }
}

fn remove(fs: &dyn Filesystem, path: &Path) -> NestlingResult<()> {
    if fs.is_dir(path) {
        fs.remove_dir_all(path)
    } else {
        fs.remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn move_with_missing_source_is_a_noop() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().with(eq(p("/r/a.ts"))).return_const(false);
        fs.expect_rename().never();

        let r = FileReconciler::new(&fs, ConflictPolicy::DropSource);
        let outcome = r.apply(&FileOperation::move_to("/r/a.ts", "/r/b.ts")).unwrap();
        assert_eq!(outcome, OperationOutcome::MissingSource);
    }

    #[test]
    fn move_onto_existing_target_drops_source() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_is_dir().return_const(false);
        fs.expect_remove_file()
            .with(eq(p("/r/a.ts")))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_rename().never();
        fs.expect_write_file().never();

        let r = FileReconciler::new(&fs, ConflictPolicy::DropSource);
        let outcome = r.apply(&FileOperation::move_to("/r/a.ts", "/r/b.ts")).unwrap();
        assert_eq!(outcome, OperationOutcome::SourceDropped);
    }

    #[test]
    fn fail_policy_raises_on_conflict() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_remove_file().never();

        let r = FileReconciler::new(&fs, ConflictPolicy::Fail);
        let err = r
            .apply(&FileOperation::move_to("/r/a.ts", "/r/b.ts"))
            .unwrap_err();
        assert!(matches!(
            err,
            NestlingError::Application(ApplicationError::RelocationConflict { .. })
        ));
    }

    #[test]
    fn move_creates_target_parent() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().with(eq(p("/r/a.ts"))).return_const(true);
        fs.expect_exists().with(eq(p("/r/m/c/a.ts"))).return_const(false);
        fs.expect_create_dir_all()
            .with(eq(p("/r/m/c")))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_rename().times(1).returning(|_, _| Ok(()));

        let r = FileReconciler::new(&fs, ConflictPolicy::DropSource);
        let outcome = r
            .apply(&FileOperation::move_to("/r/a.ts", "/r/m/c/a.ts"))
            .unwrap();
        assert_eq!(outcome, OperationOutcome::Applied);
    }

    #[test]
    fn rmdir_keeps_non_empty_directories() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_is_dir().return_const(true);
        fs.expect_list_dir()
            .returning(|_| Ok(vec![PathBuf::from("/r/c/extra.ts")]));
        fs.expect_remove_dir_all().never();

        let r = FileReconciler::new(&fs, ConflictPolicy::DropSource);
        let outcome = r.apply(&FileOperation::rmdir_if_empty("/r/c")).unwrap();
        assert_eq!(outcome, OperationOutcome::NotEmpty);
    }

    #[test]
    fn filesystem_errors_propagate() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_is_dir().return_const(false);
        fs.expect_remove_file().returning(|path| {
            Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "permission denied".into(),
            }
            .into())
        });

        let r = FileReconciler::new(&fs, ConflictPolicy::DropSource);
        assert!(r.apply(&FileOperation::delete("/r/a.ts")).is_err());
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("fail".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Fail);
        assert_eq!(
            "drop-source".parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::DropSource
        );
        assert!("overwrite".parse::<ConflictPolicy>().is_err());
    }
}
