//! Pass 4: Tool Expander.
//!
//! Normalizes each entry of `tools:` (and, for completeness, `mcp-servers:`)
//! into an engine-agnostic [`McpConfig`] record, per spec.md §4.4. Grounded
//! on `csa_config::mcp::McpServerConfig`'s own "exactly one of `command` or
//! `url`" stdio/http split, generalized here with the allow-list and
//! network-policy fields the renderer (pass 5) needs downstream.

mod neutral;
mod user_defined;

pub use neutral::{expand_neutral_tool, NeutralTool};
pub use user_defined::expand_user_defined;

use gh_aw_core::{CompileError, Diagnostic, ExpansionContext, Map, McpConfig, Value};

/// Expand every entry of `tools:` into a normalized [`McpConfig`], plus any
/// implicitly-required neutral tools (`safe-outputs`, `missing-tool`'s host
/// server) that are not declared directly by the author.
pub fn expand_tools(
    file: &std::path::Path,
    tools: &Map,
    ctx: &ExpansionContext<'_>,
    safe_outputs_enabled: bool,
) -> Result<Vec<McpConfig>, CompileError> {
    let mut configs = Vec::new();

    for (id, value) in tools {
        let config_map = value.as_map().cloned().unwrap_or_default();
        if let Some(neutral) = NeutralTool::parse(id) {
            if let Some(cfg) = expand_neutral_tool(neutral, &config_map, ctx)? {
                configs.push(cfg);
            }
        } else {
            configs.push(expand_user_defined(file, id, &config_map, ctx)?);
        }
    }

    if safe_outputs_enabled && !tools.contains_key("safe-outputs") {
        if let Some(cfg) = expand_neutral_tool(NeutralTool::SafeOutputs, &Map::new(), ctx)? {
            configs.push(cfg);
        }
    }

    // Deterministic downstream emission: sort by id (spec.md §4.5 "all
    // collection iterations sort keys lexically before emission" — the
    // expander produces the list the renderer and emitter both walk).
    configs.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(configs)
}

/// Assert the "exactly one of `command` (stdio) or `url` (http)" invariant
/// for a user-defined MCP server entry (spec.md §4.4).
pub fn assert_exactly_one_transport(
    file: &std::path::Path,
    id: &str,
    config: &Map,
) -> Result<(), CompileError> {
    let has_command = config.get("command").and_then(Value::as_str).is_some();
    let has_url = config.get("url").and_then(Value::as_str).is_some();
    match (has_command, has_url) {
        (true, true) => Err(CompileError::Policy(vec![Diagnostic::error(
            file,
            "policy",
            format!("tool '{id}' declares both 'command' and 'url'; exactly one is required"),
        )])),
        (false, false) => Err(CompileError::Policy(vec![Diagnostic::error(
            file,
            "policy",
            format!("tool '{id}' declares neither 'command' nor 'url'"),
        )])),
        _ => Ok(()),
    }
}
