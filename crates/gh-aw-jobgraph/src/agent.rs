//! The `agent` job: checkout, optional cache-memory restore, the engine's
//! install/MCP-config/execution steps, and (when safe outputs are enabled)
//! an upload of the JSONL output artifact the detection job consumes
//! (spec.md §4.5, §4.7).

use gh_aw_core::{JobSpec, McpConfig, StepSpec, WorkflowData};
use gh_aw_engine::EngineArtifacts;

const SAFE_OUTPUT_ARTIFACT: &str = "safe_output.jsonl";

pub fn build(
    workflow: &WorkflowData,
    _mcp_configs: &[McpConfig],
    engine_artifacts: &EngineArtifacts,
    safe_outputs_enabled: bool,
    cache: Option<&gh_aw_cache::CacheMemoryConfig>,
) -> JobSpec {
    let mut job = JobSpec::new("agent")
        .timeout(workflow.timeout_minutes)
        .step(StepSpec::uses("actions/checkout@v4").named("Checkout repository"));

    if let Some(cache) = cache {
        job = job.step(cache.restore_step());
    }

    for step in &engine_artifacts.install_steps {
        job = job.step(step.clone());
    }
    job = job.step(engine_artifacts.mcp_config_step.clone());

    let mut execution = engine_artifacts.execution_step.clone();
    if safe_outputs_enabled {
        execution = execution.with_env("GH_AW_SAFE_OUTPUTS", format!("/tmp/gh-aw/{SAFE_OUTPUT_ARTIFACT}"));
    }
    job = job.step(execution);

    if safe_outputs_enabled {
        job = job
            .step(
                StepSpec::uses("actions/upload-artifact@v4")
                    .named("Upload safe output")
                    .with_input("name", SAFE_OUTPUT_ARTIFACT)
                    .with_input("path", format!("/tmp/gh-aw/{SAFE_OUTPUT_ARTIFACT}"))
                    .with_input("if-no-files-found", "ignore"),
            )
            .permission("contents", "read");
    } else {
        job = job.permission("contents", "read");
    }

    if let Some(runs_on) = &workflow.runs_on {
        job.runs_on = runs_on.clone();
    }
    if let Some(concurrency) = &workflow.concurrency {
        job.concurrency = Some(concurrency.clone());
    }

    job
}
