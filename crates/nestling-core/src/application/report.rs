//! What a generation run did, for display and JSON output.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{FileOperation, RuleClass};

/// Correlates every log event of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell runs apart in a log.
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStage {
    Render,
    Scaffold,
    Reconcile,
    Codegen,
    Merge,
    Synthesize,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Render => "render",
            Self::Scaffold => "scaffold",
            Self::Reconcile => "reconcile",
            Self::Codegen => "codegen",
            Self::Merge => "merge",
            Self::Synthesize => "synthesize",
        };
        f.write_str(s)
    }
}

/// Result of executing one [`FileOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationOutcome {
    Applied,
    /// Source did not exist; treated as already satisfied.
    MissingSource,
    /// Move target existed; source was deleted, target left untouched.
    SourceDropped,
    /// Directory still had entries and was kept.
    NotEmpty,
    /// Dry run: would be attempted.
    Planned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<RuleClass>,
    pub operation: FileOperation,
    pub outcome: OperationOutcome,
}

impl AppliedOperation {
    pub fn new(operation: FileOperation, outcome: OperationOutcome) -> Self {
        Self {
            class: None,
            operation,
            outcome,
        }
    }

    pub fn in_class(mut self, class: RuleClass) -> Self {
        self.class = Some(class);
        self
    }
}

/// What happened on the API-spec branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CodegenOutcome {
    /// No API specification was supplied.
    NotRequested,
    /// A specification was supplied but codegen was switched off.
    Skipped { reason: String },
    /// Dry run: the command that would run.
    Planned { command: String },
    /// Something on the codegen path failed; the base scaffold stands.
    Degraded {
        stage: PipelineStage,
        reason: String,
    },
    Completed {
        merged_operations: usize,
        access_files: usize,
    },
}

impl CodegenOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizedController {
    /// Relative to the destination root.
    pub path: String,
    pub class_name: String,
    pub source_file: String,
    pub handlers: Vec<String>,
}

/// Summary of one generation run.
///
/// Fatal errors never produce a report; codegen trouble shows up in
/// `codegen` and `warnings` instead.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub run_id: RunId,
    pub destination_root: PathBuf,
    pub template: String,
    pub has_api_spec: bool,
    pub dry_run: bool,
    /// Base tree written and reconciled. False only for dry runs.
    pub scaffold_complete: bool,
    pub files_written: Vec<String>,
    pub operations: Vec<AppliedOperation>,
    pub codegen: CodegenOutcome,
    pub controllers: Vec<SynthesizedController>,
    pub warnings: Vec<String>,
}

impl GenerationReport {
    pub fn new(run_id: RunId, destination_root: PathBuf, template: String) -> Self {
        Self {
            run_id,
            destination_root,
            template,
            has_api_spec: false,
            dry_run: false,
            scaffold_complete: false,
            files_written: Vec::new(),
            operations: Vec::new(),
            codegen: CodegenOutcome::NotRequested,
            controllers: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn operations_with(&self, outcome: OperationOutcome) -> usize {
        self.operations
            .iter()
            .filter(|o| o.outcome == outcome)
            .count()
    }
}
