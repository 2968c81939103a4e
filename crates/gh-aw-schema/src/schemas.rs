//! Embedded JSON Schemas (draft 2020-12) for the two source roles
//! (spec.md §4.3). Compiled once into a process-wide cache, grounded on the
//! teacher's own "config is read once, validated once" discipline in
//! `csa_config::config_tiers` — the cache here replaces the teacher's
//! `OnceLock<ProjectConfig>` with an `OnceLock<jsonschema::Validator>` pair.

use std::sync::OnceLock;

use gh_aw_import::FORBIDDEN_IN_SHARED;

/// Schema for a root (user-authored, top-level) workflow file.
pub const MAIN_WORKFLOW_SCHEMA: &str = include_str!("schemas/main_workflow.schema.json");

fn main_schema_cache() -> &'static jsonschema::Validator {
    static CACHE: OnceLock<jsonschema::Validator> = OnceLock::new();
    CACHE.get_or_init(|| {
        let schema: serde_json::Value =
            serde_json::from_str(MAIN_WORKFLOW_SCHEMA).expect("embedded main schema is valid JSON");
        jsonschema::validator_for(&schema).expect("embedded main schema compiles")
    })
}

pub fn main_workflow_validator() -> &'static jsonschema::Validator {
    main_schema_cache()
}

fn included_schema_cache() -> &'static jsonschema::Validator {
    static CACHE: OnceLock<jsonschema::Validator> = OnceLock::new();
    CACHE.get_or_init(|| {
        let mut schema: serde_json::Value = serde_json::from_str(MAIN_WORKFLOW_SCHEMA)
            .expect("embedded main schema is valid JSON");
        if let Some(properties) = schema.get_mut("properties").and_then(|p| p.as_object_mut()) {
            for forbidden in FORBIDDEN_IN_SHARED {
                properties.remove(*forbidden);
            }
        }
        jsonschema::validator_for(&schema).expect("derived included-file schema compiles")
    })
}

/// Restricted schema applied to non-root (shared/imported) files: every
/// property the main schema allows, minus the forbidden-in-shared keys
/// (spec.md §4.2) — a defense-in-depth layer on top of
/// `gh_aw_import::reject_forbidden_fields`'s own hard rejection.
pub fn included_file_validator() -> &'static jsonschema::Validator {
    included_schema_cache()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_schema_compiles() {
        let _ = main_workflow_validator();
    }

    #[test]
    fn included_schema_excludes_forbidden_keys() {
        let validator = included_file_validator();
        let instance = serde_json::json!({ "on": "push" });
        assert!(validator.validate(&instance).is_err());
    }
}
