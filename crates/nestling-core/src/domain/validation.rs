use crate::domain::{
    entities::{ProjectDescriptor, ProjectStructure, RuleTable, Template},
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across callers.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_descriptor(descriptor: &ProjectDescriptor) -> Result<(), DomainError> {
        let mut builder = ProjectDescriptor::builder()
            .application(descriptor.application_name())
            .service(descriptor.service_name())
            .version(descriptor.version());
        if let Some(spec) = descriptor.api_spec_source() {
            builder = builder.api_spec(spec);
        }
        builder.build().map(|_| ())
    }

    pub fn validate_template(template: &Template) -> Result<(), DomainError> {
        template.validate()
    }

    pub fn validate_rule_table(table: &RuleTable) -> Result<(), DomainError> {
        table.validate()
    }

    pub fn validate_project_structure(structure: &ProjectStructure) -> Result<(), DomainError> {
        structure.validate()
    }
}
