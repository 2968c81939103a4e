//! Pass 8: YAML Emitter.
//!
//! Serializes the compiled job graph into a deterministic, schema-valid
//! GitHub Actions workflow: canonical key ordering per map kind, integer
//! preservation, heredoc prompt chunking into `$GH_AW_PROMPT`, a generator
//! header, pre-emit validation against GitHub's own workflow schema, and an
//! atomic write to the `.lock.yml` path. Grounded on `weave::compiler`'s own
//! typed-plan-to-serialized-document discipline.

mod atomic;
mod header;
mod ordering;
mod prompt;
mod schema_cache;
mod strip;

pub use atomic::write_atomic;
pub use prompt::{chunk_prompt, PROMPT_PATH};
pub use schema_cache::SchemaCache;
pub use strip::RemovedExtension;

use gh_aw_core::{CompileError, WorkflowData};
use gh_aw_jobgraph::JobGraph;

/// Serialize `workflow`'s compiled job graph into the final lock-file text,
/// without network-dependent schema validation (callers that want the
/// fatal GitHub-schema check call [`validate_against_github_schema`]
/// separately, since it requires network or a warm cache).
#[tracing::instrument(skip_all, fields(workflow = %workflow.workflow_id))]
pub fn emit(workflow: &WorkflowData, graph: &JobGraph, generator_version: &str) -> Result<String, CompileError> {
    let (stripped_on, removed) = strip::strip_on_extensions(&workflow.on);
    let document = ordering::build_document(workflow, &stripped_on, graph);
    let yaml_value = document.to_yaml();
    let body = serde_yaml::to_string(&yaml_value)
        .map_err(|e| CompileError::Internal(format!("yaml serialization failed: {e}")))?;
    let with_comments = strip::insert_removed_comments(&body, &removed);
    Ok(header::render(workflow, generator_version) + &with_comments)
}

/// Fatal, schema-store-backed validation of an already-emitted document
/// (spec.md §4.8). Requires the schema to be fetchable or cached; see
/// [`SchemaCache`].
pub async fn validate_against_github_schema(yaml_text: &str, cache: &SchemaCache) -> Result<(), CompileError> {
    let document: serde_yaml::Value = serde_yaml::from_str(yaml_text)
        .map_err(|e| CompileError::Internal(format!("emitted yaml failed to re-parse: {e}")))?;
    let json_document = serde_json::to_value(document)
        .map_err(|e| CompileError::Internal(format!("emitted yaml could not convert to json: {e}")))?;
    let schema = cache.fetch_or_load().await?;
    schema_cache::validate(&json_document, &schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_aw_core::{EngineConfig, EngineId, Map, NetworkPolicy, Value};

    fn workflow() -> WorkflowData {
        WorkflowData {
            name: "weekly digest".into(),
            workflow_id: "weekly-digest".into(),
            description: None,
            source: None,
            github_token: None,
            on: Value::String("workflow_dispatch".into()),
            permissions: Value::Map(Map::new()),
            runs_on: None,
            timeout_minutes: 20,
            concurrency: None,
            env: Map::new(),
            environment: None,
            container: None,
            services: None,
            r#if: None,
            roles: WorkflowData::default_roles(),
            strict: false,
            engine: EngineConfig {
                id: EngineId::Claude,
                model: None,
                version: None,
                max_turns: None,
                env: Map::new(),
                args: Vec::new(),
                user_agent: None,
                raw_config: None,
                permissions: None,
                concurrency: None,
            },
            tools: Map::new(),
            network: NetworkPolicy::default(),
            safe_outputs: Vec::new(),
            body: "Say hi every week.".into(),
        }
    }

    #[test]
    fn emit_produces_a_header_and_a_jobs_block() {
        let workflow = workflow();
        let artifacts = gh_aw_engine::render(&workflow.engine, &[], false);
        let graph = gh_aw_jobgraph::build(&workflow, &[], &artifacts, &[], None);
        let text = emit(&workflow, &graph, "0.1.0").unwrap();
        assert!(text.starts_with("# This file was automatically generated by gh-aw. DO NOT EDIT."));
        assert!(text.contains("jobs:"));
        assert!(text.contains("agent:"));
    }

    #[test]
    fn emit_is_deterministic_across_repeated_calls() {
        let workflow = workflow();
        let artifacts = gh_aw_engine::render(&workflow.engine, &[], false);
        let graph = gh_aw_jobgraph::build(&workflow, &[], &artifacts, &[], None);
        let first = emit(&workflow, &graph, "0.1.0").unwrap();
        let second = emit(&workflow, &graph, "0.1.0").unwrap();
        assert_eq!(first, second);
    }
}
