//! Filesystem-based template loader.
//!
//! Discovers and parses `template.toml` manifests from a directory tree,
//! converting them into domain [`Template`] objects ready for rendering.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! └── nest-modular/
//!     ├── template.toml        ← manifest (required)
//!     ├── package.json         ← file content
//!     └── src/
//!         └── main.ts
//! ```
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! id      = "nest-modular"
//! version = "1.0.0"
//!
//! [metadata]
//! name        = "NestJS modular service"
//! description = "Module-per-service NestJS backend."   # optional
//! author      = "Nestling"                            # optional
//! tags        = ["nestjs", "typescript"]              # optional
//!
//! # Optional: override per-file handling.
//! # If omitted, files containing {{ }} are auto-detected as parameterized.
//! [[files]]
//! path = "_gitignore"
//! type = "literal"          # literal | parameterized
//! dest = ".gitignore"       # optional; defaults to `path`
//! ```

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use nestling_core::domain::{
    DomainError, ManifestEntry, RelativePath, Template, TemplateId, TemplateMetadata,
    TemplateSource, Transform,
};

const MANIFEST_FILE: &str = "template.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `template.toml` file.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateManifestFile {
    pub template: TemplateSection,
    pub metadata: MetadataSection,
    /// Explicit per-file overrides. Files not listed here are auto-detected.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// `[template]` section: identity of the template.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateSection {
    pub id: String,
    pub version: String,
}

/// `[metadata]` section: human-facing information about the template.
#[derive(Debug, Deserialize, Clone)]
pub struct MetadataSection {
    /// Display name shown in `nestling list`.
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One entry under `[[files]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct FileEntry {
    /// Relative path from the template root.
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Destination relative to the generated root, when it differs from `path`.
    pub dest: Option<String>,
}

/// Controls how a file's content is treated during rendering.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Copied verbatim; no variable substitution.
    Literal,
    /// `{{VARIABLE}}` placeholders are substituted.
    Parameterized,
}

impl From<FileType> for Transform {
    fn from(t: FileType) -> Self {
        match t {
            FileType::Literal => Transform::CopyVerbatim,
            FileType::Parameterized => Transform::Render,
        }
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`Template`] objects from a directory tree of `template.toml` manifests.
///
/// Each immediate subdirectory of `templates_dir` that contains a valid
/// `template.toml` is treated as one template. Subdirectories that are
/// missing a manifest, or whose manifest is invalid, emit a `WARN` log and are
/// skipped.
pub struct FilesystemTemplateLoader {
    templates_dir: PathBuf,
}

impl FilesystemTemplateLoader {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    /// Load every valid template found under `templates_dir`.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidTemplate`] if `templates_dir` is missing or
    /// unreadable. Individual broken templates are skipped.
    #[instrument(skip(self), fields(dir = %self.templates_dir.display()))]
    pub fn load_all(&self) -> Result<Vec<Template>, DomainError> {
        if !self.templates_dir.exists() {
            return Err(DomainError::InvalidTemplate(format!(
                "templates directory not found: {}",
                self.templates_dir.display()
            )));
        }

        let read_dir = fs::read_dir(&self.templates_dir).map_err(|e| {
            DomainError::InvalidTemplate(format!(
                "failed to read templates directory '{}': {e}",
                self.templates_dir.display()
            ))
        })?;

        let mut dirs = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| {
                DomainError::InvalidTemplate(format!("failed to read directory entry: {e}"))
            })?;
            if entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut templates = Vec::new();
        for path in dirs {
            match self.load_template_from_dir(&path) {
                Ok(template) => {
                    debug!(id = %template.id, files = template.manifest.len(), "loaded template");
                    templates.push(template);
                }
                Err(e) => {
                    warn!(
                        dir   = %path.display(),
                        error = %e,
                        "skipping template directory due to load error"
                    );
                }
            }
        }

        debug!(count = templates.len(), "finished loading templates");
        Ok(templates)
    }

    /// Load a single template from one subdirectory.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_template_from_dir(&self, dir: &Path) -> Result<Template, DomainError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(DomainError::InvalidTemplate(format!(
                "missing {MANIFEST_FILE} in '{}'",
                dir.display()
            )));
        }

        let raw = fs::read_to_string(&manifest_path).map_err(|e| {
            DomainError::InvalidTemplate(format!(
                "failed to read '{}': {e}",
                manifest_path.display()
            ))
        })?;

        let manifest: TemplateManifestFile = toml::from_str(&raw).map_err(|e| {
            DomainError::InvalidTemplate(format!(
                "failed to parse '{}': {e}",
                manifest_path.display()
            ))
        })?;

        let id = TemplateId::parse(&format!(
            "{}@{}",
            manifest.template.id, manifest.template.version
        ))?;

        let metadata = TemplateMetadata::new(manifest.metadata.name.clone())
            .description(manifest.metadata.description.clone().unwrap_or_default())
            .version(manifest.template.version.clone())
            .author(
                manifest
                    .metadata
                    .author
                    .clone()
                    .unwrap_or_else(|| "Nestling".into()),
            )
            .tags(manifest.metadata.tags.clone());

        let mut builder = Template::builder().id(id).metadata(metadata);
        for entry in self.collect_entries(dir, &manifest)? {
            builder = builder.add_entry(entry);
        }
        let template = builder.build()?;
        template.validate()?;
        Ok(template)
    }

    /// Walk `dir` and build one manifest entry per file, in path order.
    fn collect_entries(
        &self,
        dir: &Path,
        manifest: &TemplateManifestFile,
    ) -> Result<Vec<ManifestEntry>, DomainError> {
        let overrides: HashMap<String, &FileEntry> = manifest
            .files
            .iter()
            .map(|f| (normalize_path(&f.path), f))
            .collect();

        let mut entries = Vec::new();
        for walk_entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
            let walk_entry = walk_entry
                .map_err(|e| DomainError::InvalidTemplate(format!("directory walk error: {e}")))?;
            if !walk_entry.file_type().is_file() {
                continue;
            }

            let abs_path = walk_entry.path();
            let rel_raw = abs_path.strip_prefix(dir).map_err(|_| {
                DomainError::InvalidTemplate(format!(
                    "failed to relativise '{}' against '{}'",
                    abs_path.display(),
                    dir.display()
                ))
            })?;
            let path_str = normalize_path(&rel_raw.to_string_lossy());
            if path_str == MANIFEST_FILE {
                continue;
            }

            let content = fs::read_to_string(abs_path).map_err(|e| {
                DomainError::InvalidTemplate(format!("failed to read file '{path_str}': {e}"))
            })?;

            entries.push(resolve_entry(
                &path_str,
                content,
                overrides.get(&path_str).copied(),
            )?);
        }

        for declared in overrides.keys() {
            if !entries.iter().any(|e| e.source.to_slash() == *declared) {
                warn!(path = %declared, "[[files]] entry has no file on disk");
            }
        }

        Ok(entries)
    }
}

/// Build the entry for one file.
///
/// An explicit `[[files]]` type wins; otherwise files containing a
/// placeholder are parameterized and everything else is copied verbatim.
fn resolve_entry(
    path_str: &str,
    content: String,
    manifest_entry: Option<&FileEntry>,
) -> Result<ManifestEntry, DomainError> {
    let source = TemplateSource::from(content);
    let transform = match manifest_entry {
        Some(entry) => entry.file_type.into(),
        None if source.contains_placeholder() => Transform::Render,
        None => Transform::CopyVerbatim,
    };

    let mut entry = ManifestEntry::new(RelativePath::try_new(path_str)?, transform, source);
    if let Some(dest) = manifest_entry.and_then(|e| e.dest.as_deref()) {
        entry = entry.to(RelativePath::try_new(normalize_path(dest))?);
    }
    Ok(entry)
}

/// Normalise a filesystem path to forward slashes so Windows and Unix paths
/// compare identically throughout the loader.
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_template_dir(manifest: &str, files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();

        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        for (rel_path, content) in files {
            let full = dir.join(rel_path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }

        temp
    }

    const MINIMAL_MANIFEST: &str = r#"
[template]
id      = "tpl"
version = "1.0.0"

[metadata]
name = "Test Template"
"#;

    fn find<'a>(t: &'a Template, source: &str) -> &'a ManifestEntry {
        t.manifest
            .entries
            .iter()
            .find(|e| e.source.to_slash() == source)
            .unwrap_or_else(|| panic!("no entry {source}"))
    }

    #[test]
    fn load_all_returns_error_for_missing_dir() {
        let loader = FilesystemTemplateLoader::new("/absolutely/does/not/exist");
        assert!(matches!(
            loader.load_all(),
            Err(DomainError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn load_all_skips_invalid_templates_and_top_level_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "").unwrap();
        fs::create_dir(temp.path().join("bad")).unwrap();

        let good = temp.path().join("good");
        fs::create_dir(&good).unwrap();
        fs::write(good.join(MANIFEST_FILE), MINIMAL_MANIFEST).unwrap();
        fs::write(good.join("main.ts"), "bootstrap();").unwrap();

        let templates = FilesystemTemplateLoader::new(temp.path()).load_all().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id.to_string(), "tpl@1.0.0");
    }

    #[test]
    fn manifest_only_template_is_rejected() {
        let temp = make_template_dir(MINIMAL_MANIFEST, &[]);
        let loader = FilesystemTemplateLoader::new(temp.path());
        assert!(loader.load_template_from_dir(temp.path()).is_err());
    }

    #[test]
    fn auto_detects_transform_from_content() {
        let temp = make_template_dir(
            MINIMAL_MANIFEST,
            &[
                ("package.json", r#"{"name": "{{APPLICATION}}-{{SERVICE}}"}"#),
                ("src/main.ts", "bootstrap();"),
            ],
        );
        let t = FilesystemTemplateLoader::new(temp.path())
            .load_template_from_dir(temp.path())
            .unwrap();

        assert_eq!(find(&t, "package.json").transform, Transform::Render);
        assert_eq!(find(&t, "src/main.ts").transform, Transform::CopyVerbatim);
        assert!(t.manifest.entries.iter().all(|e| e.source.to_slash() != MANIFEST_FILE));
    }

    #[test]
    fn files_override_forces_literal_and_sets_destination() {
        let manifest = format!(
            "{MINIMAL_MANIFEST}\n[[files]]\npath = \"_gitignore\"\ntype = \"literal\"\ndest = \".gitignore\"\n\n[[files]]\npath = \"README.md\"\ntype = \"literal\"\n"
        );
        let temp = make_template_dir(
            &manifest,
            &[("_gitignore", "node_modules"), ("README.md", "# {{SERVICE}}")],
        );
        let t = FilesystemTemplateLoader::new(temp.path())
            .load_template_from_dir(temp.path())
            .unwrap();

        let ignore = find(&t, "_gitignore");
        assert_eq!(ignore.destination.to_slash(), ".gitignore");
        assert_eq!(ignore.transform, Transform::CopyVerbatim);
        assert_eq!(find(&t, "README.md").transform, Transform::CopyVerbatim);
    }

    #[test]
    fn loads_full_metadata() {
        let manifest = r#"
[template]
id      = "nest-modular"
version = "2.0.0"

[metadata]
name        = "NestJS modular"
description = "Module per service"
author      = "Platform Team"
tags        = ["nestjs", "typescript"]
"#;
        let temp = make_template_dir(manifest, &[("src/main.ts", "x")]);
        let t = FilesystemTemplateLoader::new(temp.path())
            .load_template_from_dir(temp.path())
            .unwrap();

        assert_eq!(t.id.name(), "nest-modular");
        assert_eq!(t.id.version(), "2.0.0");
        assert_eq!(t.metadata.author, "Platform Team");
        assert_eq!(t.metadata.tags, vec!["nestjs", "typescript"]);
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let temp = make_template_dir("[template\nid=", &[("a.ts", "")]);
        let err = FilesystemTemplateLoader::new(temp.path())
            .load_template_from_dir(temp.path())
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn normalize_path_replaces_backslashes() {
        assert_eq!(normalize_path("src\\modules\\a.ts"), "src/modules/a.ts");
    }
}
