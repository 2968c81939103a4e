//! Per-kind safe-output plan synthesis (spec.md §4.6): each enabled kind
//! becomes a tool descriptor + permission delta + token selection + a flat
//! env map of `GH_AW_<KIND>_<PARAM>` filters for its handler job.

use gh_aw_core::{Map, SafeOutputEntry, Value};

use crate::kind::SafeOutputKind;
use crate::token::{select_token, select_token_for_precedence, TokenPrecedence};

/// One enabled safe-output entry, fully resolved for the Job Graph Builder.
/// `kind` is `None` for a user-defined safe-job — a `safe-outputs` key that
/// isn't one of the fixed kinds (spec.md §3 "plus user-defined safe-jobs").
#[derive(Debug, Clone)]
pub struct SafeOutputPlan {
    pub kind: Option<SafeOutputKind>,
    name: String,
    pub permission_delta: Vec<(String, String)>,
    pub token_expr: String,
    pub ignore_if_error: bool,
    pub env: Map,
}

impl SafeOutputPlan {
    pub fn job_name(&self) -> &str {
        &self.name
    }
}

/// Build one plan per entry, plus `missing-tool` implicitly whenever any
/// other kind is enabled (spec.md §4.6), sorted by job name for
/// deterministic downstream emission.
pub fn plan_safe_outputs(entries: &[SafeOutputEntry], top_level_github_token: Option<&str>) -> Vec<SafeOutputPlan> {
    let mut owned: Vec<SafeOutputEntry> = entries.to_vec();
    if !owned.is_empty() && !owned.iter().any(|e| SafeOutputKind::parse(&e.kind) == Some(SafeOutputKind::MissingTool)) {
        let (kind, config) = SafeOutputKind::default_entry();
        owned.push(SafeOutputEntry { kind, config });
    }

    let mut plans: Vec<SafeOutputPlan> = owned
        .iter()
        .map(|entry| match SafeOutputKind::parse(&entry.kind) {
            Some(kind) => plan_one(kind, &entry.config, top_level_github_token),
            None => plan_safe_job(&entry.kind, &entry.config, top_level_github_token),
        })
        .collect();

    plans.sort_by(|a, b| a.job_name().cmp(b.job_name()));
    plans
}

fn plan_one(kind: SafeOutputKind, config: &Map, top_level_github_token: Option<&str>) -> SafeOutputPlan {
    let custom_token = config.get("github-token").and_then(Value::as_str);
    let token_expr = select_token(kind, custom_token, top_level_github_token);
    let ignore_if_error = config.get("ignore-if-error").and_then(Value::as_bool).unwrap_or(false);
    let env = build_filter_env(&kind.env_prefix(), config);

    let permission_delta = kind
        .permission_delta()
        .iter()
        .map(|(scope, level)| (scope.to_string(), level.to_string()))
        .collect();

    SafeOutputPlan {
        kind: Some(kind),
        name: kind.job_name().to_string(),
        permission_delta,
        token_expr,
        ignore_if_error,
        env,
    }
}

/// The escape hatch for a `safe-outputs` entry whose key isn't one of the
/// fixed kinds (spec.md §3 "plus user-defined safe-jobs"). It still goes
/// through the same detection gate, standard token-selection chain, and
/// `GH_AW_<NAME>_<PARAM>` env-filter convention as a fixed kind — the only
/// thing the compiler can't supply for an author-defined job is a built-in
/// permission table, so that comes from the entry's own `permissions:` map
/// instead of a fixed lookup.
fn plan_safe_job(raw_kind: &str, config: &Map, top_level_github_token: Option<&str>) -> SafeOutputPlan {
    let name = raw_kind.replace('-', "_");
    let custom_token = config.get("github-token").and_then(Value::as_str);
    let token_expr = select_token_for_precedence(TokenPrecedence::Standard, custom_token, top_level_github_token);
    let ignore_if_error = config.get("ignore-if-error").and_then(Value::as_bool).unwrap_or(false);
    let env = build_filter_env(&name.to_uppercase(), config);

    let permission_delta = config
        .get("permissions")
        .and_then(Value::as_map)
        .map(|perms| {
            perms
                .iter()
                .filter_map(|(scope, level)| level.as_str().map(|level| (scope.clone(), level.to_string())))
                .collect()
        })
        .unwrap_or_default();

    SafeOutputPlan {
        kind: None,
        name,
        permission_delta,
        token_expr,
        ignore_if_error,
        env,
    }
}

/// Shared `GH_AW_<PREFIX>_<PARAM>` filter-env construction for both a fixed
/// kind and a user-defined safe-job; `target-repo` always gets its own
/// fixed-name entry so a handler can rely on it regardless of per-kind key
/// drift, and `permissions`/`github-token`/`ignore-if-error` are plan-level
/// concerns, never passed through as filters.
fn build_filter_env(prefix: &str, config: &Map) -> Map {
    let mut env = Map::new();
    for (key, value) in config {
        if matches!(key.as_str(), "github-token" | "ignore-if-error" | "target-repo" | "permissions") {
            continue;
        }
        if let Some(rendered) = render_filter_value(value) {
            let env_key = format!("GH_AW_{prefix}_{}", key.to_uppercase().replace('-', "_"));
            env.insert(env_key, Value::String(rendered));
        }
    }
    if let Some(target_repo) = config.get("target-repo").and_then(Value::as_str) {
        env.insert(format!("GH_AW_{prefix}_TARGET_REPO"), Value::String(target_repo.to_string()));
    }
    env
}

fn render_filter_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Seq(items) => {
            let parts: Vec<String> = items.iter().filter_map(|v| v.as_str().map(ToOwned::to_owned)).collect();
            Some(parts.join(","))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: &str, config: Map) -> SafeOutputEntry {
        SafeOutputEntry {
            kind: kind.to_string(),
            config,
        }
    }

    #[test]
    fn missing_tool_is_added_whenever_anything_else_is_enabled() {
        let entries = vec![entry("create-issue", Map::new())];
        let plans = plan_safe_outputs(&entries, None);
        assert!(plans.iter().any(|p| p.kind == Some(SafeOutputKind::MissingTool)));
    }

    #[test]
    fn empty_safe_outputs_enables_nothing() {
        let plans = plan_safe_outputs(&[], None);
        assert!(plans.is_empty());
    }

    #[test]
    fn title_prefix_labels_and_max_become_env_vars() {
        let mut config = Map::new();
        config.insert("title-prefix".to_string(), Value::String("[bot] ".to_string()));
        config.insert(
            "labels".to_string(),
            Value::Seq(vec![Value::String("auto".to_string())]),
        );
        config.insert("max".to_string(), Value::Int(3));
        let entries = vec![entry("create-issue", config)];
        let plans = plan_safe_outputs(&entries, None);
        let create_issue = plans.iter().find(|p| p.kind == Some(SafeOutputKind::CreateIssue)).unwrap();
        assert_eq!(
            create_issue.env.get("GH_AW_CREATE_ISSUE_TITLE_PREFIX").and_then(Value::as_str),
            Some("[bot] ")
        );
        assert_eq!(
            create_issue.env.get("GH_AW_CREATE_ISSUE_LABELS").and_then(Value::as_str),
            Some("auto")
        );
        assert_eq!(
            create_issue.env.get("GH_AW_CREATE_ISSUE_MAX").and_then(Value::as_str),
            Some("3")
        );
    }

    #[test]
    fn plans_are_sorted_by_job_name() {
        let entries = vec![entry("update-issue", Map::new()), entry("add-comment", Map::new())];
        let plans = plan_safe_outputs(&entries, None);
        let names: Vec<&str> = plans.iter().map(|p| p.job_name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn ignore_if_error_is_parsed() {
        let mut config = Map::new();
        config.insert("ignore-if-error".to_string(), Value::Bool(true));
        let entries = vec![entry("add-labels", config)];
        let plans = plan_safe_outputs(&entries, None);
        let plan = plans.iter().find(|p| p.kind == Some(SafeOutputKind::AddLabels)).unwrap();
        assert!(plan.ignore_if_error);
    }

    #[test]
    fn unknown_kind_becomes_a_user_defined_safe_job_instead_of_being_dropped() {
        let mut config = Map::new();
        let mut permissions = Map::new();
        permissions.insert("contents".to_string(), Value::String("write".to_string()));
        config.insert("permissions".to_string(), Value::Map(permissions));
        config.insert("severity".to_string(), Value::String("high".to_string()));
        let entries = vec![entry("triage-report", config)];
        let plans = plan_safe_outputs(&entries, None);

        let safe_job = plans.iter().find(|p| p.job_name() == "triage_report").unwrap();
        assert!(safe_job.kind.is_none());
        assert_eq!(safe_job.permission_delta, vec![("contents".to_string(), "write".to_string())]);
        assert_eq!(
            safe_job.env.get("GH_AW_TRIAGE_REPORT_SEVERITY").and_then(Value::as_str),
            Some("high")
        );
        assert!(safe_job.token_expr.contains("GITHUB_TOKEN"));
        // A safe-job still enables the implicit missing-tool kind.
        assert!(plans.iter().any(|p| p.kind == Some(SafeOutputKind::MissingTool)));
    }
}
