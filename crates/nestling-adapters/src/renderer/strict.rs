//! Placeholder renderer that refuses to leave `{{NAME}}` markers behind.

use std::path::Path;

use nestling_core::{
    application::ports::TemplateRenderer,
    domain::{DomainValidator as validator, ProjectStructure, RenderContext, Template},
    error::{NestlingError, NestlingResult},
};
use tracing::{debug, instrument};

/// Renders parameterized entries through [`RenderContext::render`] and copies
/// verbatim entries unchanged.
pub struct StrictRenderer;

impl StrictRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StrictRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for StrictRenderer {
    #[instrument(skip_all, fields(template = %template.id))]
    fn render(
        &self,
        template: &Template,
        context: &RenderContext,
        output_root: &Path,
    ) -> NestlingResult<ProjectStructure> {
        validator::validate_template(template).map_err(NestlingError::Domain)?;

        let mut structure = ProjectStructure::new(output_root);
        for entry in &template.manifest.entries {
            let content = entry.materialize(context)?;
            structure.add_file(entry.destination.clone(), content);
        }

        validator::validate_project_structure(&structure).map_err(NestlingError::Domain)?;

        debug!(files = structure.file_count(), "rendered template");
        Ok(structure)
    }
}
