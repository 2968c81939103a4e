//! Permission minimization helper (spec.md §4.7: every job's
//! `permissions:` block is the union of what its own steps need, never
//! more). This is unrelated to invariant I6, which is the prompt-tool to
//! `safe-outputs`-entry cross-reference check enforced by the Safe-Output
//! Planner in `gh_aw_safeoutputs::check_prompt_tool_cross_reference`
//! (spec.md §4.6 "The planner enforces (I3) and (I6)").

use gh_aw_core::{Map, Value};

/// Merge a permission delta into a job's existing permission map, widening
/// `read` to `write` when both are requested for the same scope but never
/// downgrading an existing `write` back to `read`.
pub fn merge_permission(permissions: &mut Map, scope: &str, level: &str) {
    let widen = match permissions.get(scope).and_then(Value::as_str) {
        Some("write") => true,
        Some("read") if level == "read" => true,
        _ => false,
    };
    if !widen {
        permissions.insert(scope.to_string(), Value::String(level.to_string()));
    }
}
