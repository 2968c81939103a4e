//! Typed projection from raw merged frontmatter into `WorkflowData`
//! (spec.md §3, §9 "all downstream code operates on typed projections,
//! never raw mapping lookups past pass 3"). Grounded on
//! `csa_core::types`'s own untyped-TOML-to-typed-struct conversion step.

use std::path::Path;

use gh_aw_core::{
    CompileError, Diagnostic, EngineConfig, EngineId, Map, NetworkPolicy, Role, SafeOutputEntry,
    Value, WorkflowData, DEFAULT_TIMEOUT_MINUTES,
};

pub fn project(file: &Path, frontmatter: &Map, body: String) -> Result<WorkflowData, CompileError> {
    let name = frontmatter
        .get("name")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| WorkflowData::workflow_id_from_path(file));
    let workflow_id = WorkflowData::workflow_id_from_path(file);
    let description = frontmatter
        .get("description")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    let source = frontmatter
        .get("source")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    let github_token = frontmatter
        .get("github-token")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);

    let on = frontmatter.get("on").cloned().unwrap_or(Value::Null);
    let permissions = frontmatter
        .get("permissions")
        .cloned()
        .unwrap_or(Value::Map(Map::new()));
    let runs_on = frontmatter
        .get("runs-on")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    let timeout_minutes = frontmatter
        .get("timeout-minutes")
        .and_then(Value::as_int)
        .unwrap_or(DEFAULT_TIMEOUT_MINUTES);
    let concurrency = frontmatter.get("concurrency").cloned();
    let env = frontmatter
        .get("env")
        .and_then(Value::as_map)
        .cloned()
        .unwrap_or_default();
    let environment = frontmatter
        .get("environment")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    let container = frontmatter.get("container").cloned();
    let services = frontmatter.get("services").cloned();
    let r#if = frontmatter
        .get("if")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);
    let strict = frontmatter
        .get("strict")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let roles = project_roles(frontmatter);
    let engine = project_engine(file, frontmatter)?;
    let tools = frontmatter
        .get("tools")
        .and_then(Value::as_map)
        .cloned()
        .unwrap_or_default();
    let network = project_network(frontmatter);
    let safe_outputs = project_safe_outputs(frontmatter);

    Ok(WorkflowData {
        name,
        workflow_id,
        description,
        source,
        github_token,
        on,
        permissions,
        runs_on,
        timeout_minutes,
        concurrency,
        env,
        environment,
        container,
        services,
        r#if,
        roles,
        strict,
        engine,
        tools,
        network,
        safe_outputs,
        body,
    })
}

fn project_roles(frontmatter: &Map) -> Vec<Role> {
    let Some(value) = frontmatter.get("roles") else {
        return WorkflowData::default_roles();
    };
    let names: Vec<&str> = match value {
        Value::String(s) => vec![s.as_str()],
        Value::Seq(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => return WorkflowData::default_roles(),
    };
    let roles: Vec<Role> = names.into_iter().filter_map(Role::parse).collect();
    if roles.is_empty() {
        WorkflowData::default_roles()
    } else {
        roles
    }
}

fn project_engine(file: &Path, frontmatter: &Map) -> Result<EngineConfig, CompileError> {
    let Some(value) = frontmatter.get("engine") else {
        return Err(CompileError::Schema(vec![Diagnostic::error(
            file,
            "schema",
            "'engine' is required",
        )]));
    };

    let (id_str, config_map) = match value {
        Value::String(s) => (s.as_str(), None),
        Value::Map(map) => {
            let id = map.get("id").and_then(Value::as_str).ok_or_else(|| {
                CompileError::Schema(vec![Diagnostic::error(
                    file,
                    "schema",
                    "'engine.id' is required",
                )])
            })?;
            (id, Some(map))
        }
        _ => {
            return Err(CompileError::Schema(vec![Diagnostic::error(
                file,
                "schema",
                "'engine' must be a string or a mapping",
            )]))
        }
    };

    let id = EngineId::parse(id_str).ok_or_else(|| {
        CompileError::Schema(vec![Diagnostic::error(
            file,
            "schema",
            format!("unknown engine id '{id_str}'"),
        )])
    })?;

    let Some(map) = config_map else {
        return Ok(EngineConfig {
            id,
            model: None,
            version: None,
            max_turns: None,
            env: Map::new(),
            args: Vec::new(),
            user_agent: None,
            raw_config: None,
            permissions: None,
            concurrency: None,
        });
    };

    Ok(EngineConfig {
        id,
        model: map.get("model").and_then(Value::as_str).map(ToOwned::to_owned),
        version: map.get("version").and_then(Value::as_str).map(ToOwned::to_owned),
        max_turns: map
            .get("max-turns")
            .and_then(Value::as_int)
            .and_then(|n| u32::try_from(n).ok()),
        env: map.get("env").and_then(Value::as_map).cloned().unwrap_or_default(),
        args: map
            .get("args")
            .and_then(Value::as_seq)
            .map(|items| items.iter().filter_map(Value::as_str).map(ToOwned::to_owned).collect())
            .unwrap_or_default(),
        user_agent: map
            .get("user-agent")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        raw_config: map.get("config").and_then(Value::as_str).map(ToOwned::to_owned),
        permissions: map.get("permissions").cloned(),
        concurrency: map
            .get("concurrency")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
    })
}

fn project_network(frontmatter: &Map) -> NetworkPolicy {
    let Some(value) = frontmatter.get("network") else {
        return NetworkPolicy::default();
    };
    let Some(map) = value.as_map() else {
        return NetworkPolicy::default();
    };
    let allowed = map
        .get("allowed")
        .and_then(Value::as_seq)
        .map(|items| items.iter().filter_map(Value::as_str).map(ToOwned::to_owned).collect())
        .unwrap_or_default();
    NetworkPolicy {
        configured: true,
        allowed,
    }
}

fn project_safe_outputs(frontmatter: &Map) -> Vec<SafeOutputEntry> {
    let Some(map) = frontmatter.get("safe-outputs").and_then(Value::as_map) else {
        return Vec::new();
    };
    map.iter()
        .map(|(kind, value)| SafeOutputEntry {
            kind: kind.clone(),
            config: value.as_map().cloned().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn frontmatter_with_engine(engine: Value) -> Map {
        let mut map = Map::new();
        map.insert("engine".to_string(), engine);
        map
    }

    #[test]
    fn projects_string_engine_shorthand() {
        let map = frontmatter_with_engine(Value::String("claude".to_string()));
        let data = project(Path::new("x.md"), &map, String::new()).unwrap();
        assert_eq!(data.engine.id, EngineId::Claude);
        assert!(data.engine.model.is_none());
    }

    #[test]
    fn projects_object_engine_with_max_turns() {
        let mut engine_map = Map::new();
        engine_map.insert("id".to_string(), Value::String("copilot".to_string()));
        engine_map.insert("max-turns".to_string(), Value::Int(5));
        let map = frontmatter_with_engine(Value::Map(engine_map));
        let data = project(Path::new("x.md"), &map, String::new()).unwrap();
        assert_eq!(data.engine.max_turns, Some(5));
    }

    #[test]
    fn missing_engine_is_a_schema_error() {
        let map = Map::new();
        let err = project(Path::new("x.md"), &map, String::new()).unwrap_err();
        assert!(matches!(err, CompileError::Schema(_)));
    }

    #[test]
    fn default_timeout_is_twenty_minutes() {
        let map = frontmatter_with_engine(Value::String("claude".to_string()));
        let data = project(Path::new("x.md"), &map, String::new()).unwrap();
        assert_eq!(data.timeout_minutes, DEFAULT_TIMEOUT_MINUTES);
    }

    #[test]
    fn roles_default_to_admin_and_maintainer() {
        let map = frontmatter_with_engine(Value::String("claude".to_string()));
        let data = project(Path::new("x.md"), &map, String::new()).unwrap();
        assert_eq!(data.roles, WorkflowData::default_roles());
    }
}
