//! Engine-capability and strict-mode policy checks that are not expressible
//! in JSON Schema (spec.md §4.3), run after schema validation succeeds and
//! before the typed `WorkflowData` is handed to later passes.

use std::path::Path;

use gh_aw_core::{Diagnostic, DiagnosticBag, McpTransportKind, Value, WorkflowData};

/// Run every post-schema policy rule, accumulating into `bag` per spec.md
/// §7's "passes 1-3 report everything at once" discipline.
pub fn check(file: &Path, data: &WorkflowData, bag: &mut DiagnosticBag) {
    check_codex_permissions(file, data, bag);
    check_max_turns(file, data, bag);
    check_http_mcp_support(file, data, bag);
    check_strict_mode(file, data, bag);
}

/// Codex does not support `engine.permissions` (spec.md §4.3).
fn check_codex_permissions(file: &Path, data: &WorkflowData, bag: &mut DiagnosticBag) {
    if !data.engine.id.supports_engine_permissions() && data.engine.permissions.is_some() {
        bag.push(Diagnostic::error(
            file,
            "policy",
            format!("engine '{}' does not support 'engine.permissions'", data.engine.id),
        ));
    }
}

/// `max-turns` requires an engine advertising the capability (I4).
fn check_max_turns(file: &Path, data: &WorkflowData, bag: &mut DiagnosticBag) {
    if data.engine.max_turns.is_some() && !data.engine.id.supports_max_turns() {
        bag.push(Diagnostic::error(
            file,
            "policy",
            format!("engine '{}' does not support 'max-turns'", data.engine.id),
        ));
    }
}

/// HTTP-transport MCP servers require an engine advertising HTTP MCP
/// support (I5).
fn check_http_mcp_support(file: &Path, data: &WorkflowData, bag: &mut DiagnosticBag) {
    if data.engine.id.supports_transport(McpTransportKind::Http) {
        return;
    }
    for (tool_id, config) in &data.tools {
        let uses_http = config
            .as_map()
            .map(|m| m.contains_key("url"))
            .unwrap_or(false);
        if uses_http {
            bag.push(Diagnostic::error(
                file,
                "policy",
                format!(
                    "tool '{tool_id}' uses the http MCP transport, but engine '{}' only supports stdio",
                    data.engine.id
                ),
            ));
        }
    }
}

/// Strict-mode policy (I2): no write-grade top-level permissions, network
/// must be explicitly configured, no wildcards in `network.allowed`.
fn check_strict_mode(file: &Path, data: &WorkflowData, bag: &mut DiagnosticBag) {
    if !data.strict {
        return;
    }

    if let Some(map) = data.permissions.as_map() {
        for (scope, level) in map {
            if level.as_str() == Some("write") {
                bag.push(Diagnostic::error(
                    file,
                    "policy",
                    format!(
                        "strict mode forbids top-level write permissions, but '{scope}' is set to write"
                    ),
                ));
            }
        }
    } else if matches!(data.permissions, Value::String(ref s) if s == "write-all") {
        bag.push(Diagnostic::error(
            file,
            "policy",
            "strict mode forbids top-level write permissions",
        ));
    }

    if !data.network.configured {
        bag.push(Diagnostic::error(
            file,
            "policy",
            "strict mode requires an explicit 'network' configuration",
        ));
    } else if data.network.has_wildcard() {
        bag.push(Diagnostic::error(
            file,
            "policy",
            "strict mode forbids '*' in 'network.allowed'",
        ));
    }
}
