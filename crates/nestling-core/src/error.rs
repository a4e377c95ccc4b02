//! Unified error handling for Nestling Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Nestling Core operations.
#[derive(Debug, Error, Clone)]
pub enum NestlingError {
    /// Errors from the domain layer (invariant violations).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl NestlingError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Run: nestling config list".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Nestling".into(),
                "Please report this issue at: https://github.com/cosecruz/nestling/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Whether the pipeline treats this error as a degraded outcome.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::Application(
                ApplicationError::CodegenFailed { .. } | ApplicationError::AccessParseFailed { .. }
            )
        )
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    External,
    Internal,
}

/// Convenient result type alias.
pub type NestlingResult<T> = Result<T, NestlingError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> NestlingResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> NestlingResult<T> {
        self.map_err(|e| NestlingError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn codegen_failures_are_degradable() {
        let err: NestlingError = ApplicationError::CodegenFailed {
            reason: "exit 1".into(),
        }
        .into();
        assert!(err.is_degradable());
        assert_eq!(err.category(), ErrorCategory::External);
    }

    #[test]
    fn filesystem_failures_are_fatal() {
        let err: NestlingError = ApplicationError::FilesystemError {
            path: PathBuf::from("/x"),
            reason: "permission denied".into(),
        }
        .into();
        assert!(!err.is_degradable());
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn domain_categories_map_through() {
        let err: NestlingError = DomainError::InvalidDescriptor("bad".into()).into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn context_wraps_foreign_errors() {
        let r: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
        let err = r.context("reading config").unwrap_err();
        assert!(err.to_string().contains("reading config: boom"));
    }
}
