//! Pass 3: Validator.
//!
//! Schema-validates merged frontmatter against the embedded draft-2020-12
//! schema, runs engine-capability and strict-mode policy checks that JSON
//! Schema cannot express, and projects the result into the typed
//! `WorkflowData` every later pass consumes.

mod external;
mod policy;
mod project;
mod schemas;
mod suggest;

pub use external::{run_external_checks, ExternalValidator, HttpExternalValidator};
pub use schemas::{included_file_validator, main_workflow_validator};
pub use suggest::suggest;

use std::path::Path;

use gh_aw_core::{CompileError, Diagnostic, DiagnosticBag, Map, WorkflowData};

/// Known top-level property names, used for "Unknown property: X" nearest
/// match suggestions (spec.md §4.3).
const KNOWN_TOP_LEVEL_KEYS: &[&str] = &[
    "name", "description", "run-name", "source", "imports", "on", "permissions", "runs-on",
    "timeout-minutes", "concurrency", "env", "environment", "container", "services", "if",
    "roles", "strict", "sandbox", "labels", "command", "features", "github-token", "cache",
    "tracker-id", "engine", "tools", "mcp-servers", "runtimes", "network", "safe-outputs",
];

/// Validate merged frontmatter and project it into `WorkflowData`.
///
/// Schema and policy diagnostics are accumulated together so authors see
/// every problem in one pass (spec.md §7); on success the typed workflow is
/// returned alongside any warnings collected.
pub fn validate(
    file: &Path,
    frontmatter: &Map,
    body: String,
) -> Result<(WorkflowData, Vec<Diagnostic>), CompileError> {
    let mut bag = DiagnosticBag::new();

    let instance = value_to_json(frontmatter);
    let validator = main_workflow_validator();
    for error in validator.iter_errors(&instance) {
        bag.push(schema_error_to_diagnostic(file, &error));
    }

    if bag.has_errors() {
        return Err(bag.finish().unwrap_err());
    }

    let data = project::project(file, frontmatter, body)?;
    policy::check(file, &data, &mut bag);

    // Every diagnostic left in `bag` at this point originates from
    // `policy::check` (schema diagnostics already returned above), so a
    // failure here is a `PolicyError`, not a `SchemaError` (spec.md §7).
    let warnings = bag.finish_as_policy()?;
    Ok((data, warnings))
}

fn value_to_json(frontmatter: &Map) -> serde_json::Value {
    let yaml = gh_aw_core::Value::Map(frontmatter.clone()).to_yaml();
    serde_json::to_value(yaml).unwrap_or(serde_json::Value::Null)
}

fn schema_error_to_diagnostic(
    file: &Path,
    error: &jsonschema::ValidationError<'_>,
) -> Diagnostic {
    let message = error.to_string();
    if let Some(unknown) = extract_unknown_property(&message) {
        let suggestions = suggest(&unknown, KNOWN_TOP_LEVEL_KEYS);
        let mut diagnostic = Diagnostic::error(
            file,
            "schema",
            format!("Unknown property: {unknown}"),
        );
        if let Some(first) = suggestions.first() {
            diagnostic = diagnostic.with_hint(format!("did you mean '{first}'?"));
        }
        diagnostic
    } else {
        Diagnostic::error(file, "schema", message)
    }
}

/// `jsonschema`'s own additionalProperties error message names the
/// offending key (quoted with either `'` or `"`); extract it so it can be
/// rewritten per spec.md §4.3.
fn extract_unknown_property(message: &str) -> Option<String> {
    if !message.contains("Additional properties are not allowed")
        && !message.contains("additionalProperties")
    {
        return None;
    }
    for quote in ['\'', '"'] {
        if let Some(start) = message.find(quote) {
            let rest = &message[start + 1..];
            if let Some(end) = rest.find(quote) {
                return Some(rest[..end].to_string());
            }
        }
    }
    None
}
