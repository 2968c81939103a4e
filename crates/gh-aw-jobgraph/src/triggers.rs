//! Reading GitHub Actions `on:` semantics plus this compiler's extensions
//! (`reaction`, `stop-after`, `names`, `command`, `skip-if-match`) out of
//! the raw, still-untyped `on` value (spec.md §3, §4.7).

use gh_aw_core::Value;

/// Trigger events that can be fired by an untrusted actor, requiring the
/// activation job's role check unless `roles: all` (spec.md §4.7).
pub const UNSAFE_TRIGGER_EVENTS: &[&str] = &[
    "push",
    "issues",
    "pull_request",
    "issue_comment",
    "pull_request_review_comment",
    "discussion",
    "discussion_comment",
];

/// Trigger events considered safe regardless of actor (spec.md §4.7).
pub const SAFE_TRIGGER_EVENTS: &[&str] = &["schedule", "workflow_run"];

/// Top-level event names declared by `on:`, whether given as a bare string
/// (`on: push`), a list, or a mapping.
pub fn event_names(on: &Value) -> Vec<String> {
    match on {
        Value::String(s) => vec![s.clone()],
        Value::Seq(items) => items.iter().filter_map(Value::as_str).map(ToOwned::to_owned).collect(),
        Value::Map(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

pub fn has_unsafe_trigger(on: &Value) -> bool {
    event_names(on).iter().any(|name| UNSAFE_TRIGGER_EVENTS.contains(&name.as_str()))
}

/// Recursively search `on:` for a compiler-extension key (`names`,
/// `command`, `reaction`, `stop-after`, `skip-if-match`) at any nesting
/// depth, returning the first value found.
pub fn find_extension<'a>(on: &'a Value, key: &str) -> Option<&'a Value> {
    match on {
        Value::Map(map) => {
            if let Some(v) = map.get(key) {
                return Some(v);
            }
            map.values().find_map(|v| find_extension(v, key))
        }
        Value::Seq(items) => items.iter().find_map(|v| find_extension(v, key)),
        _ => None,
    }
}

pub fn has_extension(on: &Value, key: &str) -> bool {
    find_extension(on, key).is_some()
}

/// Compile a `names:` label-allow-list extension into an `if:` expression
/// fragment (spec.md §4.7 "`names` key is ... compiled into an `if:`
/// expression").
pub fn compile_names_filter(names: &Value) -> Option<String> {
    let items = names.as_seq()?;
    let labels: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(|s| format!("'{s}'"))
        .collect();
    if labels.is_empty() {
        return None;
    }
    Some(format!(
        "contains(fromJSON('[{}]'), github.event.label.name)",
        labels.join(", ")
    ))
}

/// Compile a `command:` slash-command extension into an `if:` expression
/// fragment matching the triggering comment body.
pub fn compile_command_filter(command: &Value) -> Option<String> {
    let command = command.as_str()?;
    Some(format!("startsWith(github.event.comment.body, '{command}')"))
}

/// Read the literal `stop-after:` deadline string, if present. Left
/// unparsed here: comparing it against "now" is deferred to a runtime
/// `date` step (see `activation::build`) rather than resolved at compile
/// time, since baking a relative duration into an absolute timestamp during
/// compilation would make the emitted document depend on wall-clock time
/// and violate the "identical input always emits identical output"
/// invariant.
pub fn stop_after_deadline(on: &Value) -> Option<&str> {
    find_extension(on, "stop-after").and_then(Value::as_str)
}

/// Combine every active extension filter into a single `&&`-joined `if:`
/// expression for the activation job (spec.md §4.7's "`if:` expression
/// composition").
pub fn compile_if_expression(on: &Value) -> Option<String> {
    let mut clauses = Vec::new();
    if let Some(names) = find_extension(on, "names") {
        if let Some(clause) = compile_names_filter(names) {
            clauses.push(clause);
        }
    }
    if let Some(command) = find_extension(on, "command") {
        if let Some(clause) = compile_command_filter(command) {
            clauses.push(clause);
        }
    }
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" && "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_aw_core::Map;

    #[test]
    fn string_trigger_yields_single_event_name() {
        assert_eq!(event_names(&Value::String("push".into())), vec!["push"]);
    }

    #[test]
    fn map_trigger_yields_every_top_level_key() {
        let mut map = Map::new();
        map.insert("push".to_string(), Value::Null);
        map.insert("workflow_dispatch".to_string(), Value::Null);
        let names = event_names(&Value::Map(map));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn push_is_an_unsafe_trigger() {
        assert!(has_unsafe_trigger(&Value::String("push".into())));
        assert!(!has_unsafe_trigger(&Value::String("schedule".into())));
    }

    #[test]
    fn names_filter_found_nested_under_an_event() {
        let mut pr_config = Map::new();
        pr_config.insert(
            "names".to_string(),
            Value::Seq(vec![Value::String("bug".into())]),
        );
        let mut on = Map::new();
        on.insert("pull_request".to_string(), Value::Map(pr_config));
        assert!(has_extension(&Value::Map(on), "names"));
    }

    #[test]
    fn compiles_names_filter_into_contains_expression() {
        let names = Value::Seq(vec![Value::String("bug".into()), Value::String("triage".into())]);
        let expr = compile_names_filter(&names).unwrap();
        assert!(expr.contains("'bug'"));
        assert!(expr.contains("'triage'"));
        assert!(expr.starts_with("contains(fromJSON("));
    }

    #[test]
    fn reads_the_raw_stop_after_literal() {
        let mut on = Map::new();
        on.insert("stop-after".to_string(), Value::String("2026-01-01T00:00:00Z".into()));
        assert_eq!(stop_after_deadline(&Value::Map(on)), Some("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn combines_names_and_command_with_and() {
        let mut on = Map::new();
        on.insert(
            "names".to_string(),
            Value::Seq(vec![Value::String("bug".into())]),
        );
        on.insert("command".to_string(), Value::String("/triage".into()));
        let expr = compile_if_expression(&Value::Map(on)).unwrap();
        assert!(expr.contains("&&"));
    }
}
