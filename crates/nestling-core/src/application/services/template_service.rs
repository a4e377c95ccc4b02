//! Template Service - template lookup and listing.
//!
//! Separated from GenerationService for single responsibility.

use serde::Serialize;

use crate::{
    application::ports::TemplateStore,
    domain::{Template, TemplateId, Transform},
    error::NestlingResult,
};

/// Information about a template for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub tags: Vec<String>,
    pub files: usize,
    pub parameterized: usize,
}

impl From<&Template> for TemplateInfo {
    fn from(t: &Template) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.metadata.name.clone(),
            description: t.metadata.description.clone(),
            author: t.metadata.author.clone(),
            tags: t.metadata.tags.clone(),
            files: t.manifest.len(),
            parameterized: t
                .manifest
                .entries
                .iter()
                .filter(|e| e.transform == Transform::Render)
                .count(),
        }
    }
}

/// Service for template operations.
pub struct TemplateService {
    store: Box<dyn TemplateStore>,
}

impl TemplateService {
    pub fn new(store: Box<dyn TemplateStore>) -> Self {
        Self { store }
    }

    /// Get a template by ID.
    pub fn get(&self, id: &TemplateId) -> NestlingResult<Template> {
        self.store.get(id)
    }

    /// List all templates, sorted by id.
    pub fn list(&self) -> NestlingResult<Vec<TemplateInfo>> {
        let mut infos: Vec<TemplateInfo> = self.store.list()?.iter().map(TemplateInfo::from).collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(infos)
    }
}
