//! In-memory template store backed by discovered templates.

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, RwLock},
};

use nestling_core::{
    application::{ApplicationError, ports::TemplateStore},
    domain::{DomainValidator as validator, Template, TemplateId},
    error::{NestlingError, NestlingResult},
};

use crate::builtin_templates;

/// Thread-safe in-memory template store.
///
/// Keyed by `name@version`; a lookup with a bare name resolves to the highest
/// version string registered under that name.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<BTreeMap<TemplateId, Template>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with discovered templates loaded.
    pub fn with_discovered(local_path: Option<&Path>) -> NestlingResult<Self> {
        let store = Self::new();
        for template in builtin_templates::all_templates(local_path)? {
            store.insert(template)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn not_found(id: &TemplateId) -> NestlingError {
    ApplicationError::TemplateResolution {
        reason: format!("Template not found: {}", id),
    }
    .into()
}

impl TemplateStore for InMemoryStore {
    fn get(&self, id: &TemplateId) -> NestlingResult<Template> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner
            .iter()
            .rev()
            .find(|(key, _)| id.selects(key))
            .map(|(_, t)| t.clone())
            .ok_or_else(|| not_found(id))
    }

    fn list(&self) -> NestlingResult<Vec<Template>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        Ok(inner.values().cloned().collect())
    }

    fn insert(&self, template: Template) -> NestlingResult<()> {
        validator::validate_template(&template).map_err(NestlingError::Domain)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.insert(template.id.clone(), template);
        Ok(())
    }
}
