//! NestJS controller emission from an [`AccessFileDescriptor`].
//!
//! Binding rules per operation:
//!
//! - a parameter named in the path template → `@Param('name')`
//! - the first remaining parameter of POST/PUT/PATCH → `@Body()`
//! - anything else → `@Query('name')`
//!
//! Handlers delegate to the access-layer method with the original parameter
//! order. The file itself is rendered from `templates/controller.ts.txt`.

use askama::Template;

use crate::domain::{
    entities::access::{AccessFileDescriptor, AccessOperation, HttpMethod, camel_case},
    error::DomainError,
};

/// One synthesized controller file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedControllerFile {
    pub file_name: String,
    pub class_name: String,
    pub source_file: String,
    pub handler_names: Vec<String>,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    Param,
    Body,
    Query,
}

impl Binding {
    fn decorator(self) -> &'static str {
        match self {
            Self::Param => "Param",
            Self::Body => "Body",
            Self::Query => "Query",
        }
    }
}

const METHOD_ORDER: [HttpMethod; 7] = [
    HttpMethod::Get,
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Patch,
    HttpMethod::Delete,
    HttpMethod::Head,
    HttpMethod::Options,
];

fn bindings(op: &AccessOperation) -> Vec<(&str, Binding)> {
    let path_params = op.path_parameters();
    let mut body_taken = !op.http_method.carries_body();

    op.parameter_names
        .iter()
        .map(|name| {
            let binding = if path_params.contains(&name.as_str()) {
                Binding::Param
            } else if !body_taken {
                body_taken = true;
                Binding::Body
            } else {
                Binding::Query
            };
            (name.as_str(), binding)
        })
        .collect()
}

/// Template data for one controller file.
#[derive(Template)]
#[template(path = "controller.ts.txt", escape = "none")]
struct ControllerTemplateData {
    /// Comma-separated `@nestjs/common` imports.
    imports: String,
    service_class: String,
    service_module: String,
    class_name: String,
    /// Constructor-injected access-layer field.
    field: String,
    handlers: Vec<HandlerView>,
}

struct HandlerView {
    name: String,
    decorator: &'static str,
    /// `'pets/:petId'`, or empty for the controller root.
    route_arg: String,
    params: String,
    args: String,
}

impl HandlerView {
    fn new(op: &AccessOperation, binds: &[(&str, Binding)]) -> Self {
        let route = op.route_path();
        let params: Vec<String> = binds
            .iter()
            .map(|(name, binding)| match binding {
                Binding::Body => format!("@Body() {name}: any"),
                other => format!("@{}('{name}') {name}: any", other.decorator()),
            })
            .collect();

        Self {
            name: op.name.clone(),
            decorator: op.http_method.decorator(),
            route_arg: if route.is_empty() {
                String::new()
            } else {
                format!("'{route}'")
            },
            params: params.join(", "),
            args: op.parameter_names.join(", "),
        }
    }
}

/// Render the controller for one access-layer file.
pub fn emit_controller(
    descriptor: &AccessFileDescriptor,
) -> Result<GeneratedControllerFile, DomainError> {
    let class_name = descriptor.controller_class_name();
    let per_op: Vec<_> = descriptor
        .operations()
        .iter()
        .map(|op| (op, bindings(op)))
        .collect();

    let mut imports = vec!["Controller"];
    for method in METHOD_ORDER {
        if per_op.iter().any(|(op, _)| op.http_method == method) {
            imports.push(method.decorator());
        }
    }
    for binding in [Binding::Body, Binding::Param, Binding::Query] {
        if per_op.iter().any(|(_, b)| b.iter().any(|(_, x)| *x == binding)) {
            imports.push(binding.decorator());
        }
    }

    let content = ControllerTemplateData {
        imports: imports.join(", "),
        service_class: descriptor.class_name.clone(),
        service_module: descriptor.module_stem().to_string(),
        class_name: class_name.clone(),
        field: camel_case(&descriptor.class_name),
        handlers: per_op
            .iter()
            .map(|(op, binds)| HandlerView::new(op, binds))
            .collect(),
    }
    .render()
    .map_err(|e| DomainError::ControllerRender {
        file: descriptor.file_name.clone(),
        reason: e.to_string(),
    })?;

    Ok(GeneratedControllerFile {
        file_name: descriptor.controller_file_name(),
        class_name,
        source_file: descriptor.file_name.clone(),
        handler_names: descriptor.operations().iter().map(|o| o.name.clone()).collect(),
        content,
    })
}
