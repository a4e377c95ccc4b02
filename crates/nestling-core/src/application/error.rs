//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Template resolution failed (unknown id).
    #[error("Template resolution failed: {reason}")]
    TemplateResolution { reason: String },

    /// Template rendering failed.
    #[error("Template rendering failed: {reason}")]
    RenderingFailed { reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// External generator could not be launched or exited non-zero.
    #[error("Code generator failed: {reason}")]
    CodegenFailed { reason: String },

    /// An access-layer file could not be read or understood.
    #[error("Could not parse access file {path}: {reason}")]
    AccessParseFailed { path: PathBuf, reason: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("Template store error")]
    StoreLockError,

    /// Destination root already exists and `force` was not given.
    #[error("Destination already exists at {path}")]
    DestinationExists { path: PathBuf },

    /// A relocation target exists and the conflict policy is `fail`.
    #[error("Relocation target {to} already exists (source {from})")]
    RelocationConflict { from: PathBuf, to: PathBuf },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateResolution { reason } => vec![
                format!("Resolution failed: {}", reason),
                "Try: nestling list to see available templates".into(),
                "Or point NESTLING_TEMPLATES_DIR at a template directory".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Check free disk space".into(),
            ],
            Self::CodegenFailed { .. } => vec![
                "Check that Node.js and npx are installed".into(),
                "Set NESTLING_CODEGEN_BIN to use a different generator binary".into(),
            ],
            Self::StoreLockError => vec![
                "The template store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::DestinationExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Use --force to generate into it anyway".into(),
                "Choose a different application or service name".into(),
            ],
            Self::RelocationConflict { to, .. } => vec![
                format!("Remove {} and run again", to.display()),
                "Or set reconcile.conflict_policy = \"drop-source\"".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateResolution { .. } => ErrorCategory::NotFound,
            Self::FilesystemError { .. }
            | Self::StoreLockError
            | Self::RenderingFailed { .. }
            | Self::AccessParseFailed { .. } => ErrorCategory::Internal,
            Self::CodegenFailed { .. } => ErrorCategory::External,
            Self::DestinationExists { .. } | Self::RelocationConflict { .. } => {
                ErrorCategory::Validation
            }
        }
    }
}
