//! File operations and the declarative reconciliation rule table.
//!
//! Rules are data: a `(class, condition, operation)` triple. The table is
//! evaluated once per run against the "was an API spec supplied" flag and
//! yields an ordered list of operations rebased onto the destination root.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::error::DomainError;

/// A single filesystem step.
///
/// Paths are relative while they sit in a rule table and absolute once
/// [`rebased`](Self::rebased) onto a destination root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FileOperation {
    Copy { from: PathBuf, to: PathBuf },
    Move { from: PathBuf, to: PathBuf },
    Delete { path: PathBuf },
    MkdirIfAbsent { path: PathBuf },
    RmdirIfEmpty { path: PathBuf },
}

impl FileOperation {
    pub fn copy(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self::Copy {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn move_to(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self::Move {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn delete(path: impl Into<PathBuf>) -> Self {
        Self::Delete { path: path.into() }
    }

    pub fn mkdir(path: impl Into<PathBuf>) -> Self {
        Self::MkdirIfAbsent { path: path.into() }
    }

    pub fn rmdir_if_empty(path: impl Into<PathBuf>) -> Self {
        Self::RmdirIfEmpty { path: path.into() }
    }

    /// Join every path in this operation onto `root`.
    pub fn rebased(&self, root: &Path) -> Self {
        match self {
            Self::Copy { from, to } => Self::copy(root.join(from), root.join(to)),
            Self::Move { from, to } => Self::move_to(root.join(from), root.join(to)),
            Self::Delete { path } => Self::delete(root.join(path)),
            Self::MkdirIfAbsent { path } => Self::mkdir(root.join(path)),
            Self::RmdirIfEmpty { path } => Self::rmdir_if_empty(root.join(path)),
        }
    }

    /// The path whose fate this operation decides, if it is terminal.
    ///
    /// Moves and deletes are terminal: once applied the source is gone.
    pub fn terminal_source(&self) -> Option<&Path> {
        match self {
            Self::Move { from, .. } => Some(from),
            Self::Delete { path } => Some(path),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Copy { .. } => "copy",
            Self::Move { .. } => "move",
            Self::Delete { .. } => "delete",
            Self::MkdirIfAbsent { .. } => "mkdir",
            Self::RmdirIfEmpty { .. } => "rmdir-if-empty",
        }
    }
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy { from, to } | Self::Move { from, to } => write!(
                f,
                "{} {} -> {}",
                self.kind(),
                from.display(),
                to.display()
            ),
            Self::Delete { path } | Self::MkdirIfAbsent { path } | Self::RmdirIfEmpty { path } => {
                write!(f, "{} {}", self.kind(), path.display())
            }
        }
    }
}

/// When a rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCondition {
    Always,
    HasApiSpec,
    NoApiSpec,
}

impl RuleCondition {
    pub fn applies(self, has_api_spec: bool) -> bool {
        match self {
            Self::Always => true,
            Self::HasApiSpec => has_api_spec,
            Self::NoApiSpec => !has_api_spec,
        }
    }
}

/// Rule classes, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleClass {
    ControllerRelocation,
    DirectoryPruning,
    BaseFileRenaming,
}

impl fmt::Display for RuleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ControllerRelocation => "controller-relocation",
            Self::DirectoryPruning => "directory-pruning",
            Self::BaseFileRenaming => "base-file-renaming",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationRule {
    pub class: RuleClass,
    pub condition: RuleCondition,
    pub operation: FileOperation,
}

impl ReconciliationRule {
    pub fn new(class: RuleClass, condition: RuleCondition, operation: FileOperation) -> Self {
        Self {
            class,
            condition,
            operation,
        }
    }
}

/// Ordered, static set of reconciliation rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<ReconciliationRule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(
        mut self,
        class: RuleClass,
        condition: RuleCondition,
        operation: FileOperation,
    ) -> Self {
        self.rules
            .push(ReconciliationRule::new(class, condition, operation));
        self
    }

    pub fn rules(&self) -> &[ReconciliationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules that apply for this branch, rebased onto `root`, in execution order.
    ///
    /// Classes run in [`RuleClass`] order; within a class declaration order holds.
    pub fn resolve(&self, root: &Path, has_api_spec: bool) -> Vec<(RuleClass, FileOperation)> {
        let mut applicable: Vec<(usize, &ReconciliationRule)> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.condition.applies(has_api_spec))
            .collect();
        // Stable sort keeps declaration order within a class.
        applicable.sort_by_key(|(idx, r)| (r.class, *idx));

        applicable
            .into_iter()
            .map(|(_, r)| (r.class, r.operation.rebased(root)))
            .collect()
    }

    /// Check that under each branch no path receives two terminal dispositions.
    pub fn validate(&self) -> Result<(), DomainError> {
        for has_api_spec in [false, true] {
            let mut claims: HashMap<&Path, usize> = HashMap::new();
            for rule in self.rules.iter().filter(|r| r.condition.applies(has_api_spec)) {
                if let Some(source) = rule.operation.terminal_source() {
                    *claims.entry(source).or_default() += 1;
                }
            }

            let mut ambiguous: Vec<_> = claims.into_iter().filter(|(_, n)| *n > 1).collect();
            ambiguous.sort();
            if let Some((path, count)) = ambiguous.into_iter().next() {
                return Err(DomainError::AmbiguousDisposition {
                    path: path.display().to_string(),
                    count,
                });
            }
        }
        Ok(())
    }
}
