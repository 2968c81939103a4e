//! Pass 6: Safe-Output Planner.
//!
//! Parses `safe-outputs:` into typed per-kind plans: a tool descriptor for
//! the safe-outputs MCP server's declared tool list, a permission delta,
//! and a token-selection strategy (spec.md §4.6). Grounded on
//! `csa_config::validate::{validate_tools, validate_tiers}`'s own
//! enum-dispatch-over-a-known-set shape, generalized from "validate and
//! bail" to "validate, accumulate a typed plan per kind".

mod kind;
mod plan;
mod token;

pub use kind::SafeOutputKind;
pub use plan::{plan_safe_outputs, SafeOutputPlan};
pub use token::{select_token, TokenPrecedence};

use gh_aw_core::{CompileError, Diagnostic, Map, SafeOutputEntry, Value};
use std::path::Path;

/// I3: `target-repo` must look like `owner/repo`.
pub fn check_target_repo_slugs(file: &Path, entries: &[SafeOutputEntry]) -> Result<(), CompileError> {
    for entry in entries {
        if let Some(slug) = entry.config.get("target-repo").and_then(Value::as_str) {
            if !gh_aw_core::is_valid_repo_slug(slug) {
                return Err(CompileError::Policy(vec![Diagnostic::error(
                    file,
                    "policy",
                    format!(
                        "safe-outputs.{}.target-repo '{slug}' is not a valid 'owner/repo' slug",
                        entry.kind
                    ),
                )]));
            }
        }
    }
    Ok(())
}

/// I6: every tool name in the neutral `safe-outputs` tool's `allowed:`
/// list (spec.md §4.4 "Allow-lists") must correspond to a configured
/// `safe-outputs.<kind>` entry, so the agent is never told it can call a
/// tool with no handler job behind it.
pub fn check_prompt_tool_cross_reference(
    file: &Path,
    tools: &Map,
    entries: &[SafeOutputEntry],
) -> Result<(), CompileError> {
    let Some(allowed) = tools
        .get("safe-outputs")
        .and_then(Value::as_map)
        .and_then(|cfg| cfg.get("allowed"))
        .and_then(Value::as_seq)
    else {
        return Ok(());
    };

    for tool_name in allowed.iter().filter_map(Value::as_str) {
        let normalized = tool_name.replace('-', "_");
        let configured = normalized == "missing_tool"
            || entries.iter().any(|entry| entry.kind.replace('-', "_") == normalized);
        if !configured {
            return Err(CompileError::Policy(vec![Diagnostic::error(
                file,
                "policy",
                format!(
                    "tools.safe-outputs.allowed references '{tool_name}', but no 'safe-outputs.{tool_name}' entry is configured"
                ),
            )]));
        }
    }
    Ok(())
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    fn entry(kind: &str) -> SafeOutputEntry {
        SafeOutputEntry {
            kind: kind.to_string(),
            config: Map::new(),
        }
    }

    #[test]
    fn target_repo_slug_rejects_malformed_value() {
        let mut config = Map::new();
        config.insert("target-repo".to_string(), Value::String("not-a-slug".to_string()));
        let entries = vec![SafeOutputEntry {
            kind: "create-issue".to_string(),
            config,
        }];
        let err = check_target_repo_slugs(Path::new("x.md"), &entries).unwrap_err();
        assert!(matches!(err, CompileError::Policy(_)));
    }

    #[test]
    fn target_repo_slug_accepts_owner_slash_repo() {
        let mut config = Map::new();
        config.insert("target-repo".to_string(), Value::String("octo/cat".to_string()));
        let entries = vec![SafeOutputEntry {
            kind: "create-issue".to_string(),
            config,
        }];
        check_target_repo_slugs(Path::new("x.md"), &entries).unwrap();
    }

    #[test]
    fn cross_reference_passes_when_no_allow_list_is_declared() {
        check_prompt_tool_cross_reference(Path::new("x.md"), &Map::new(), &[entry("create-issue")]).unwrap();
    }

    #[test]
    fn cross_reference_passes_when_every_allowed_tool_is_configured() {
        let mut safe_outputs_tool = Map::new();
        safe_outputs_tool.insert(
            "allowed".to_string(),
            Value::Seq(vec![Value::String("create-issue".to_string())]),
        );
        let mut tools = Map::new();
        tools.insert("safe-outputs".to_string(), Value::Map(safe_outputs_tool));
        check_prompt_tool_cross_reference(Path::new("x.md"), &tools, &[entry("create-issue")]).unwrap();
    }

    #[test]
    fn cross_reference_always_allows_missing_tool() {
        let mut safe_outputs_tool = Map::new();
        safe_outputs_tool.insert(
            "allowed".to_string(),
            Value::Seq(vec![Value::String("missing-tool".to_string())]),
        );
        let mut tools = Map::new();
        tools.insert("safe-outputs".to_string(), Value::Map(safe_outputs_tool));
        check_prompt_tool_cross_reference(Path::new("x.md"), &tools, &[]).unwrap();
    }

    #[test]
    fn cross_reference_rejects_an_allowed_tool_with_no_matching_entry() {
        let mut safe_outputs_tool = Map::new();
        safe_outputs_tool.insert(
            "allowed".to_string(),
            Value::Seq(vec![Value::String("create-pull-request".to_string())]),
        );
        let mut tools = Map::new();
        tools.insert("safe-outputs".to_string(), Value::Map(safe_outputs_tool));
        let err = check_prompt_tool_cross_reference(Path::new("x.md"), &tools, &[entry("create-issue")]).unwrap_err();
        match err {
            CompileError::Policy(diagnostics) => {
                assert!(diagnostics.iter().any(|d| d.message.contains("create-pull-request")));
            }
            other => panic!("expected policy error, got {other:?}"),
        }
    }
}
