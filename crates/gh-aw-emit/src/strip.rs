//! Strips compiler-extension keys (`names`, `command`, `reaction`,
//! `stop-after`, `skip-if-match`) out of `on:` before emission — they are
//! compiled into the `activation` job's `if:` condition (spec.md §4.7) and
//! have no GitHub Actions meaning of their own — and records what was
//! removed so the caller can leave a trail of comments behind (spec.md
//! §4.7's "`names` key is ... re-emitted as a comment").

use gh_aw_core::{Map, Value};

const EXTENSION_KEYS: &[&str] = &["names", "command", "reaction", "stop-after", "skip-if-match"];

/// One removed extension key, with the dotted path it was removed from
/// (e.g. `on.pull_request.names`) for the trailing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedExtension {
    pub path: String,
}

pub fn strip_on_extensions(on: &Value) -> (Value, Vec<RemovedExtension>) {
    let mut removed = Vec::new();
    let stripped = strip_recursive(on, "on", &mut removed);
    (stripped, removed)
}

fn strip_recursive(value: &Value, path: &str, removed: &mut Vec<RemovedExtension>) -> Value {
    match value {
        Value::Map(map) => {
            let mut out = Map::new();
            for (key, v) in map {
                if EXTENSION_KEYS.contains(&key.as_str()) {
                    removed.push(RemovedExtension {
                        path: format!("{path}.{key}"),
                    });
                    continue;
                }
                let child_path = format!("{path}.{key}");
                out.insert(key.clone(), strip_recursive(v, &child_path, removed));
            }
            Value::Map(out)
        }
        Value::Seq(items) => Value::Seq(
            items
                .iter()
                .map(|item| strip_recursive(item, path, removed))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Insert a `#`-prefixed comment line immediately above the emitted `on:`
/// block for every stripped extension key, so the lock file documents why
/// the key is missing rather than silently dropping it.
pub fn insert_removed_comments(yaml_text: &str, removed: &[RemovedExtension]) -> String {
    if removed.is_empty() {
        return yaml_text.to_string();
    }
    let mut out = String::with_capacity(yaml_text.len() + removed.len() * 64);
    let mut inserted = false;
    for line in yaml_text.lines() {
        if !inserted && line.starts_with("on:") {
            for extension in removed {
                out.push_str(&format!(
                    "# {} was compiled into the activation job's if: condition and removed here.\n",
                    extension.path
                ));
            }
            inserted = true;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
