//! Field-merge semantics (spec.md §4.2), retargeted from
//! `csa_config::config_merge::merge_toml_values`'s "recurse on tables,
//! overlay wins on leaves" shape onto `gh_aw_core::Value`, generalized to
//! the three field kinds the import resolver needs: scalar (root wins),
//! list (set-union), and map (deep merge, root wins per leaf).
//!
//! Unlike the teacher's version — where the *overlay* (project config) wins
//! over the *base* (user config) — here the root workflow is the
//! authoritative side and imports are the overlay being folded in, so the
//! win direction is flipped: `merge_fields(root, import)` keeps root's
//! value on any conflict.

use gh_aw_core::{Map, Value};

/// A non-fatal note about how a merge resolved a conflict; surfaced to the
/// user only in `--verbose` mode (spec.md §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeWarning {
    pub field: String,
    pub message: String,
}

/// Merge `overlay` into `base` in place, per field-kind rules. `base` keeps
/// precedence on every conflict; `overlay` only fills gaps or widens lists.
pub fn merge_fields(base: &mut Map, overlay: &Map) -> Result<Vec<MergeWarning>, gh_aw_core::CompileError> {
    let mut warnings = Vec::new();
    for (key, overlay_value) in overlay {
        if key == "permissions" {
            merge_permissions(base, overlay_value, &mut warnings);
            continue;
        }
        merge_one(base, key.clone(), overlay_value, key, &mut warnings);
    }
    Ok(warnings)
}

fn merge_one(
    base: &mut Map,
    key: String,
    overlay_value: &Value,
    path: &str,
    warnings: &mut Vec<MergeWarning>,
) {
    match base.get_mut(&key) {
        None => {
            base.insert(key, overlay_value.clone());
        }
        Some(Value::Map(base_map)) => {
            if let Value::Map(overlay_map) = overlay_value {
                for (sub_key, sub_value) in overlay_map {
                    let sub_path = format!("{path}.{sub_key}");
                    merge_one(base_map, sub_key.clone(), sub_value, &sub_path, warnings);
                }
            }
            // Type mismatch (base is a map, overlay is not): root wins silently.
        }
        Some(Value::Seq(base_seq)) => {
            if let Value::Seq(overlay_seq) = overlay_value {
                for item in overlay_seq {
                    if !base_seq.contains(item) {
                        base_seq.push(item.clone());
                    }
                }
            }
        }
        Some(existing) => {
            if existing != overlay_value {
                warnings.push(MergeWarning {
                    field: path.to_string(),
                    message: format!(
                        "root value for '{path}' kept; import's conflicting value discarded"
                    ),
                });
            }
        }
    }
}

/// Permissions merge: root always wins on a conflicting scope; scopes an
/// import introduces that root omits are widened in only up to `read`
/// (spec.md §4.2: "imported permissions strictly widen only to read-level
/// defaults never write").
fn merge_permissions(base: &mut Map, overlay_value: &Value, warnings: &mut Vec<MergeWarning>) {
    let Value::Map(overlay_map) = overlay_value else {
        return;
    };
    let entry = base
        .entry("permissions".to_string())
        .or_insert_with(|| Value::Map(Map::new()));
    let Value::Map(base_map) = entry else {
        return;
    };
    for (scope, level) in overlay_map {
        if base_map.contains_key(scope) {
            continue;
        }
        let clamped = match level.as_str() {
            Some("write") => {
                warnings.push(MergeWarning {
                    field: format!("permissions.{scope}"),
                    message: format!(
                        "import requested 'write' for '{scope}'; clamped to 'read'"
                    ),
                });
                Value::String("read".to_string())
            }
            _ => level.clone(),
        };
        base_map.insert(scope.clone(), clamped);
    }
}
