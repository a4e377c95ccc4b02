// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (reports keep a copy of degraded-path failures)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid project descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Template '{template_id}' has no content")]
    EmptyTemplate { template_id: String },

    #[error("Duplicate destination path in template: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Unresolved template placeholders: {}", names.join(", "))]
    UnresolvedPlaceholders { names: Vec<String> },

    // ========================================================================
    // Rule Table Violations
    // ========================================================================
    #[error("Reconciliation rule table is not total: '{path}' has {count} terminal dispositions")]
    AmbiguousDisposition { path: String, count: usize },

    #[error("Could not render controller for {file}: {reason}")]
    ControllerRender { file: String, reason: String },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidDescriptor(msg) => vec![
                format!("Details: {}", msg),
                "Application and service names become directory names".into(),
                "Use letters, digits, '-' and '_' only".into(),
            ],
            Self::UnresolvedPlaceholders { names } => vec![
                format!("The template references unknown variables: {}", names.join(", ")),
                "Available variables: APPLICATION, SERVICE, SERVICE_CLASS, VERSION, OPENAPI".into(),
            ],
            Self::EmptyTemplate { template_id } => vec![
                format!("Template '{}' is corrupted", template_id),
                "Please report this issue or use a different template".into(),
            ],
            Self::AmbiguousDisposition { path, .. } => vec![
                format!("Two rules claim '{}' under the same condition", path),
                "This is a bug in the built-in rule table".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidDescriptor(_)
            | Self::InvalidTemplate(_)
            | Self::UnresolvedPlaceholders { .. }
            | Self::DuplicatePath { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::MissingRequiredField { .. } => ErrorCategory::Validation,
            Self::EmptyTemplate { .. } => ErrorCategory::NotFound,
            Self::AmbiguousDisposition { .. } | Self::ControllerRender { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
