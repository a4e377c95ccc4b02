pub mod access;
pub mod common;
pub mod descriptor;
pub mod file_operation;
pub mod project_structure;
pub mod template;

pub use crate::domain::DomainError;
pub use access::{AccessFileDescriptor, AccessOperation, HttpMethod};
pub use descriptor::{ProjectDescriptor, ProjectDescriptorBuilder};
pub use file_operation::{FileOperation, ReconciliationRule, RuleClass, RuleCondition, RuleTable};
pub use project_structure::{FileToWrite, ProjectStructure};
pub use template::{Template, TemplateId};
