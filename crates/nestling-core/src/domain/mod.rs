//! Core domain layer for Nestling.
//!
//! This module contains pure generation logic with no I/O. Filesystem access,
//! subprocesses and source parsing are handled via ports defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: rule tables and merge plans are data; executing them is the
//!   application layer's job
//! - **Immutable inputs**: `ProjectDescriptor` and `RenderContext` never change
//!   after construction

pub mod controller;
pub mod entities;
pub mod error;
pub mod layout;

mod validation;

pub use controller::{GeneratedControllerFile, emit_controller};
pub use entities::{
    access::{AccessFileDescriptor, AccessOperation, HttpMethod, is_access_file},
    common::RelativePath,
    descriptor::{ProjectDescriptor, ProjectDescriptorBuilder},
    file_operation::{FileOperation, ReconciliationRule, RuleClass, RuleCondition, RuleTable},
    project_structure::{FileToWrite, ProjectStructure},
    template::{
        ManifestEntry, RenderContext, Template, TemplateBuilder, TemplateId, TemplateManifest,
        TemplateMetadata, TemplateSource, Transform,
    },
};
pub use error::{DomainError, ErrorCategory};
pub use layout::ModuleLayout;
pub use validation::DomainValidator;

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn descriptor(service: &str, spec: Option<&str>) -> ProjectDescriptor {
        let mut b = ProjectDescriptor::builder().service(service);
        if let Some(s) = spec {
            b = b.api_spec(s);
        }
        b.build().unwrap()
    }

    // ========================================================================
    // Descriptor → bindings → layout
    // ========================================================================

    #[test]
    fn descriptor_drives_bindings_and_layout() {
        let d = descriptor("pet", None);
        let ctx = RenderContext::from_descriptor(&d);
        let layout = ModuleLayout::new(d.service_name());

        assert_eq!(d.destination_root_name(), "demo-pet");
        assert_eq!(
            ctx.render("{{APPLICATION}}/{{SERVICE_CLASS}}").unwrap(),
            "demo/Pet"
        );
        assert_eq!(layout.module_dir(), Path::new("src/modules/pet"));
    }

    #[test]
    fn validator_accepts_builder_output() {
        assert!(DomainValidator::validate_descriptor(&descriptor("pet", Some("a.yaml"))).is_ok());
        assert!(
            DomainValidator::validate_rule_table(&ModuleLayout::new("pet").rule_table()).is_ok()
        );
    }

    // ========================================================================
    // Branch coverage of the rule table
    // ========================================================================

    #[test]
    fn every_base_controller_has_one_disposition_per_branch() {
        let table = ModuleLayout::new("pet").rule_table();
        let sources = [
            layout::DEFAULT_CONTROLLER_SOURCE,
            layout::FIXED_CONTROLLERS[0].0,
            layout::FIXED_CONTROLLERS[1].0,
            layout::FIXED_CONTROLLERS[2].0,
            layout::FIXED_CONTROLLERS[3].0,
        ];

        for has_spec in [false, true] {
            let ops = table.resolve(Path::new(""), has_spec);
            for source in sources {
                let count = ops
                    .iter()
                    .filter(|(_, op)| op.terminal_source() == Some(Path::new(source)))
                    .count();
                assert_eq!(count, 1, "{source} (has_spec = {has_spec})");
            }
        }
    }

    #[test]
    fn structure_rejects_duplicate_files() {
        let s = ProjectStructure::new("/tmp/demo-pet")
            .with_file("src/main.ts", String::new())
            .with_file("src/main.ts", String::new());
        assert!(DomainValidator::validate_project_structure(&s).is_err());
        assert!(DomainValidator::validate_project_structure(&ProjectStructure::new("/x")).is_err());
    }
}
