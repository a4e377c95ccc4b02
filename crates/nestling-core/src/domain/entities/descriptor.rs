//! The validated input of one generation run.
//!
//! A [`ProjectDescriptor`] is constructed once per invocation (by the CLI, from
//! flags and configuration defaults) and is immutable afterwards. Template
//! variables, the destination root and the module layout are all derived
//! from it.

use serde::Serialize;

use crate::domain::error::DomainError;

pub const DEFAULT_APPLICATION: &str = "demo";
pub const DEFAULT_SERVICE: &str = "default";
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Input to a generation run.
///
/// ## Invariants (enforced by the builder)
///
/// 1. `application_name` and `service_name` are non-empty path segments
/// 2. `version` is non-empty
/// 3. `api_spec_source` is `None` or a non-blank string (blank means "no codegen")
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDescriptor {
    application_name: String,
    service_name: String,
    version: String,
    api_spec_source: Option<String>,
}

impl ProjectDescriptor {
    pub fn builder() -> ProjectDescriptorBuilder {
        ProjectDescriptorBuilder::default()
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn api_spec_source(&self) -> Option<&str> {
        self.api_spec_source.as_deref()
    }

    pub fn has_api_spec(&self) -> bool {
        self.api_spec_source.is_some()
    }

    /// PascalCase identifier used for generated class names.
    pub fn service_class_name(&self) -> String {
        capitalize(&self.service_name)
    }

    /// `"{application}-{service}"`.
    pub fn destination_root_name(&self) -> String {
        format!("{}-{}", self.application_name, self.service_name)
    }

    /// Copy of this descriptor with the API specification removed.
    pub fn without_api_spec(&self) -> Self {
        Self {
            api_spec_source: None,
            ..self.clone()
        }
    }
}

/// Builder for [`ProjectDescriptor`]; unset fields take the documented defaults.
#[derive(Debug, Default)]
pub struct ProjectDescriptorBuilder {
    application_name: Option<String>,
    service_name: Option<String>,
    version: Option<String>,
    api_spec_source: Option<String>,
}

impl ProjectDescriptorBuilder {
    pub fn application(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn service(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn api_spec(mut self, source: impl Into<String>) -> Self {
        self.api_spec_source = Some(source.into());
        self
    }

    pub fn build(self) -> Result<ProjectDescriptor, DomainError> {
        let application_name = self
            .application_name
            .unwrap_or_else(|| DEFAULT_APPLICATION.to_string());
        let service_name = self
            .service_name
            .unwrap_or_else(|| DEFAULT_SERVICE.to_string());
        let version = self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string());

        validate_segment("application name", &application_name)?;
        validate_segment("service name", &service_name)?;
        if version.trim().is_empty() {
            return Err(DomainError::InvalidDescriptor(
                "version cannot be empty".into(),
            ));
        }

        let api_spec_source = self
            .api_spec_source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(ProjectDescriptor {
            application_name,
            service_name,
            version,
            api_spec_source,
        })
    }
}

fn validate_segment(what: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::InvalidDescriptor(format!(
            "{what} cannot be empty"
        )));
    }
    if value.starts_with('.') {
        return Err(DomainError::InvalidDescriptor(format!(
            "{what} '{value}' cannot start with '.'"
        )));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(DomainError::InvalidDescriptor(format!(
            "{what} '{value}' contains invalid character '{bad}'"
        )));
    }
    Ok(())
}

/// Uppercase the first character, keep the rest as-is.
///
/// `"pet"` → `"Pet"`, `"petStore"` → `"PetStore"`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let d = ProjectDescriptor::builder().build().unwrap();
        assert_eq!(d.application_name(), "demo");
        assert_eq!(d.service_name(), "default");
        assert_eq!(d.version(), "1.0.0");
        assert!(!d.has_api_spec());
        assert_eq!(d.destination_root_name(), "demo-default");
    }

    #[test]
    fn blank_api_spec_means_no_codegen() {
        let d = ProjectDescriptor::builder().api_spec("   ").build().unwrap();
        assert_eq!(d.api_spec_source(), None);
    }

    #[test]
    fn service_class_name_capitalizes_first_letter_only() {
        let d = ProjectDescriptor::builder().service("petStore").build().unwrap();
        assert_eq!(d.service_class_name(), "PetStore");
    }

    #[test]
    fn rejects_path_like_service_names() {
        for bad in ["", ".hidden", "a/b", "a\\b", "pet store"] {
            assert!(
                ProjectDescriptor::builder().service(bad).build().is_err(),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn without_api_spec_keeps_other_fields() {
        let d = ProjectDescriptor::builder()
            .service("pet")
            .api_spec("petstore.yaml")
            .build()
            .unwrap();
        let stripped = d.without_api_spec();
        assert!(!stripped.has_api_spec());
        assert_eq!(stripped.service_name(), "pet");
    }

    #[test]
    fn capitalize_handles_empty_and_unicode() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éclair"), "Éclair");
    }
}
