//! The `detection` job: downloads the agent's safe-output JSONL artifact and
//! runs threat detection over it before any handler job is allowed to act on
//! it (spec.md §4.6, §4.7).

use gh_aw_core::{JobSpec, StepSpec, WorkflowData};

const SAFE_OUTPUT_ARTIFACT: &str = "safe_output.jsonl";

pub fn build(_workflow: &WorkflowData, agent_job_name: &str) -> JobSpec {
    let mut job = JobSpec::new("detection")
        .needs(agent_job_name)
        .step(
            StepSpec::uses("actions/download-artifact@v4")
                .named("Download safe output")
                .with_input("name", SAFE_OUTPUT_ARTIFACT)
                .with_input("path", "/tmp/gh-aw"),
        )
        .step(
            StepSpec::run(format!(
                "node /tmp/gh-aw/safeoutputs/detect-threats.cjs /tmp/gh-aw/{SAFE_OUTPUT_ARTIFACT}"
            ))
            .named("Detect prompt-injection and secret leakage")
            .with_id("detect"),
        )
        .permission("contents", "read");
    job.outputs.insert(
        "success".to_string(),
        gh_aw_core::Value::String("${{ steps.detect.outputs.success }}".to_string()),
    );
    job
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_aw_core::{EngineConfig, EngineId, Map, NetworkPolicy, Value};

    fn workflow() -> WorkflowData {
        WorkflowData {
            name: "wf".into(),
            workflow_id: "wf".into(),
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
            body: "Say hi.".into(),
        }
    }

    #[test]
    fn detection_needs_agent_and_reads_contents_only() {
        let job = build(&workflow(), "agent");
        assert_eq!(job.needs, vec!["agent"]);
        assert_eq!(job.permissions.get("contents").and_then(Value::as_str), Some("read"));
    }

    #[test]
    fn detection_exposes_a_success_output() {
        let job = build(&workflow(), "agent");
        assert!(job.outputs.contains_key("success"));
    }
}
