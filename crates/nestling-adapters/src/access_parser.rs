//! Regex-based extraction of operation signatures from generated
//! `typescript-nestjs` access-layer files.
//!
//! The generator emits one overload declaration plus one implementation per
//! operation:
//!
//! ```text
//! public getPet(petId: string, ): Observable<AxiosResponse<Pet>>;
//! public getPet(petId: string, ): Observable<any> {
//!     ...
//!     return this.httpClient.get<Pet>(`${this.basePath}/pets/${encodeURIComponent(String(petId))}`,
//! ```
//!
//! A method becomes an operation when its body contains an `httpClient` call
//! whose URL is a `basePath` template literal.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use nestling_core::{
    application::{ApplicationError, ports::AccessFileParser},
    domain::{AccessFileDescriptor, AccessOperation, HttpMethod},
    error::NestlingResult,
};

static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+class\s+([A-Za-z_$][\w$]*)").expect("valid regex"));

static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*public\s+(?:async\s+)?([A-Za-z_$][\w$]*)\s*\(([^)]*)\)")
        .expect("valid regex")
});

static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"this\.httpClient\.(\w+)[^(]*?\(\s*`\$\{this\.basePath\}([^`]*)`")
        .expect("valid regex")
});

static ENCODED_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{encodeURIComponent\(String\(([A-Za-z_$][\w$]*)\)\)\}").expect("valid regex")
});

static PLAIN_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_$][\w$]*)\}").expect("valid regex"));

static PARAM_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_$][\w$]*)").expect("valid regex"));

/// [`AccessFileParser`] for the output of the `typescript-nestjs` generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexAccessParser;

impl RegexAccessParser {
    pub fn new() -> Self {
        Self
    }
}

impl AccessFileParser for RegexAccessParser {
    #[instrument(skip(self, source))]
    fn parse(&self, file_name: &str, source: &str) -> NestlingResult<AccessFileDescriptor> {
        let class_name = CLASS_RE
            .captures(source)
            .map(|c| c[1].to_string())
            .ok_or_else(|| ApplicationError::AccessParseFailed {
                path: file_name.into(),
                reason: "no exported class found".into(),
            })?;

        let mut descriptor = AccessFileDescriptor::new(file_name, class_name);

        let headers: Vec<_> = METHOD_RE.captures_iter(source).collect();
        for (i, caps) in headers.iter().enumerate() {
            let (Some(whole), Some(name), Some(params)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let body_end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(source.len(), |m| m.start());
            let body = &source[whole.end()..body_end];

            let Some(call) = CALL_RE.captures(body) else {
                continue;
            };
            let http_method = match call[1].parse::<HttpMethod>() {
                Ok(m) => m,
                Err(_) => {
                    debug!(method = name.as_str(), verb = &call[1], "unsupported http verb");
                    continue;
                }
            };

            let operation = AccessOperation::new(name.as_str(), http_method, path_template(&call[2]))
                .with_parameters(parameter_names(params.as_str()));
            if !descriptor.push_operation(operation) {
                debug!(method = name.as_str(), "duplicate operation dropped");
            }
        }

        debug!(
            class = %descriptor.class_name,
            operations = descriptor.operations().len(),
            "parsed access file"
        );
        Ok(descriptor)
    }
}

/// `/pets/${encodeURIComponent(String(petId))}` → `/pets/{petId}`.
fn path_template(raw: &str) -> String {
    let path = ENCODED_PARAM_RE.replace_all(raw, "{$1}");
    PLAIN_PARAM_RE.replace_all(&path, "{$1}").into_owned()
}

/// Identifier of each declared parameter, in order.
fn parameter_names(list: &str) -> Vec<String> {
    top_level_params(list)
        .into_iter()
        .filter_map(|p| PARAM_NAME_RE.captures(p).map(|c| c[1].to_string()))
        .collect()
}

/// Split a parameter list on the commas that are not nested inside a type
/// such as `Record<string, string>` or `{ a: string, b: number }`.
fn top_level_params(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut prev = '\0';
    for (i, c) in list.char_indices() {
        match c {
            '<' | '{' | '(' | '[' => depth += 1,
            // `=>` in a function type is not a closing bracket.
            '>' if prev == '=' => {}
            '>' | '}' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        prev = c;
    }
    parts.push(&list[start..]);
    parts
}
