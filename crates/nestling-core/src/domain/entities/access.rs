//! Structural description of generated access-layer files.
//!
//! Parsers (see `nestling_adapters::access_parser`) populate these; the
//! controller emitter only ever sees the descriptor, never source text.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::{entities::descriptor::capitalize, error::DomainError};

/// Marker that identifies an access-layer file name.
pub const ACCESS_FILE_MARKER: &str = ".service";

/// Name fragments that disqualify a services-dir file from synthesis.
pub const EXCLUDED_FRAGMENTS: [&str; 4] = ["configuration", "variables", "index", "api."];

/// Whether `file_name` names an access-layer file.
///
/// `pet.service.ts` qualifies; `api.ts`, `configuration.ts`, `index.ts`,
/// `variables.ts` and non-TypeScript files do not.
pub fn is_access_file(file_name: &str) -> bool {
    file_name.ends_with(".ts")
        && file_name.contains(ACCESS_FILE_MARKER)
        && !EXCLUDED_FRAGMENTS.iter().any(|f| file_name.contains(f))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// NestJS route decorator name.
    pub fn decorator(self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Post => "Post",
            Self::Put => "Put",
            Self::Patch => "Patch",
            Self::Delete => "Delete",
            Self::Head => "Head",
            Self::Options => "Options",
        }
    }

    /// Methods whose first non-path parameter is bound from the request body.
    pub fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl FromStr for HttpMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            "head" => Ok(Self::Head),
            "options" => Ok(Self::Options),
            other => Err(DomainError::InvalidDescriptor(format!(
                "unknown HTTP method '{other}'"
            ))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.decorator().to_ascii_uppercase())
    }
}

/// One exported operation of an access-layer file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessOperation {
    pub name: String,
    pub http_method: HttpMethod,
    /// OpenAPI-style template, e.g. `/pets/{petId}`.
    pub path_template: String,
    pub parameter_names: Vec<String>,
}

impl AccessOperation {
    pub fn new(
        name: impl Into<String>,
        http_method: HttpMethod,
        path_template: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            http_method,
            path_template: path_template.into(),
            parameter_names: Vec::new(),
        }
    }

    pub fn with_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Names appearing as `{name}` segments in the path template.
    pub fn path_parameters(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut rest = self.path_template.as_str();
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    out.push(&after[..close]);
                    rest = &after[close + 1..];
                }
                None => break,
            }
        }
        out
    }

    /// NestJS route path: no leading slash, `{id}` becomes `:id`.
    pub fn route_path(&self) -> String {
        let trimmed = self.path_template.trim_start_matches('/');
        let mut out = String::with_capacity(trimmed.len());
        let mut chars = trimmed.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '{' {
                out.push(':');
                for inner in chars.by_ref() {
                    if inner == '}' {
                        break;
                    }
                    out.push(inner);
                }
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// Parsed shape of one access-layer file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessFileDescriptor {
    pub file_name: String,
    pub class_name: String,
    operations: Vec<AccessOperation>,
}

impl AccessFileDescriptor {
    pub fn new(file_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            class_name: class_name.into(),
            operations: Vec::new(),
        }
    }

    /// Append an operation. First-seen wins: a repeated name is dropped and
    /// `false` is returned.
    pub fn push_operation(&mut self, operation: AccessOperation) -> bool {
        if self.operations.iter().any(|o| o.name == operation.name) {
            return false;
        }
        self.operations.push(operation);
        true
    }

    pub fn operations(&self) -> &[AccessOperation] {
        &self.operations
    }

    /// File stem without `.ts`, used as the import specifier.
    pub fn module_stem(&self) -> &str {
        self.file_name
            .strip_suffix(".ts")
            .unwrap_or(&self.file_name)
    }

    /// Base name before the access marker: `pet.service.ts` → `pet`.
    pub fn resource_name(&self) -> &str {
        let stem = self.module_stem();
        stem.find(ACCESS_FILE_MARKER)
            .map(|idx| &stem[..idx])
            .unwrap_or(stem)
    }

    /// `pet.service.ts` → `pet.controller.ts`.
    pub fn controller_file_name(&self) -> String {
        format!("{}.controller.ts", self.resource_name())
    }

    /// `pet.service.ts` → `PetController`.
    pub fn controller_class_name(&self) -> String {
        format!("{}Controller", pascal_case(self.resource_name()))
    }
}

/// `pet-store` → `PetStore`, `petStore` → `PetStore`.
pub fn pascal_case(s: &str) -> String {
    s.split(|c: char| c == '-' || c == '_' || c == '.')
        .filter(|p| !p.is_empty())
        .map(capitalize)
        .collect()
}

/// `PetService` → `petService`.
pub fn camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
