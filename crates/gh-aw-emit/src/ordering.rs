//! Canonical key ordering (spec.md §4.8): `serde_yaml` preserves whatever
//! order a `Mapping` is built in, but guarantees nothing about matching a
//! canonical order across runs unless the caller builds each map in that
//! order itself. These tables are that order, one per map kind, expressed
//! as insertion order into `gh_aw_core::Map`.

use gh_aw_core::{JobSpec, Map, StepSpec, Value, WorkflowData};
use gh_aw_jobgraph::JobGraph;

use crate::prompt::write_prompt_step;

/// Build the full document in canonical top-level order:
/// `name, run-name, on, permissions, concurrency, env, jobs`.
pub fn build_document(workflow: &WorkflowData, on: &Value, graph: &JobGraph) -> Value {
    let mut doc = Map::new();
    doc.insert("name".to_string(), Value::String(workflow.name.clone()));
    doc.insert("on".to_string(), on.clone());
    doc.insert("permissions".to_string(), workflow.permissions.clone());
    if let Some(concurrency) = &workflow.concurrency {
        doc.insert("concurrency".to_string(), concurrency.clone());
    }
    if !workflow.env.is_empty() {
        doc.insert("env".to_string(), Value::Map(workflow.env.clone()));
    }

    let mut jobs = Map::new();
    for job in graph.jobs() {
        jobs.insert(job.name.clone(), build_job(job, workflow));
    }
    doc.insert("jobs".to_string(), Value::Map(jobs));

    Value::Map(doc)
}

/// Canonical per-job order: `needs, if, runs-on, timeout-minutes,
/// concurrency, permissions, outputs, env, steps`.
fn build_job(job: &JobSpec, workflow: &WorkflowData) -> Value {
    let mut map = Map::new();
    if !job.needs.is_empty() {
        let needs = if job.needs.len() == 1 {
            Value::String(job.needs[0].clone())
        } else {
            Value::Seq(job.needs.iter().cloned().map(Value::String).collect())
        };
        map.insert("needs".to_string(), needs);
    }
    if let Some(cond) = &job.r#if {
        map.insert("if".to_string(), Value::String(cond.clone()));
    }
    map.insert("runs-on".to_string(), Value::String(job.runs_on.clone()));
    if let Some(timeout) = job.timeout_minutes {
        map.insert("timeout-minutes".to_string(), Value::Int(timeout));
    }
    if let Some(concurrency) = &job.concurrency {
        map.insert("concurrency".to_string(), concurrency.clone());
    } else if job.name == "agent" {
        map.insert(
            "concurrency".to_string(),
            Value::String(format!("${{{{ {} }}}}", workflow.engine.id.concurrency_group())),
        );
    }
    if !job.permissions.is_empty() {
        map.insert("permissions".to_string(), Value::Map(job.permissions.clone()));
    }
    if !job.outputs.is_empty() {
        map.insert("outputs".to_string(), Value::Map(job.outputs.clone()));
    }
    if !job.env.is_empty() {
        map.insert("env".to_string(), Value::Map(job.env.clone()));
    }

    let steps = build_steps(job, workflow);
    map.insert(
        "steps".to_string(),
        Value::Seq(steps.iter().map(build_step).collect()),
    );

    Value::Map(map)
}

/// The emitter owns prompt materialization (spec.md §4.8); it inserts the
/// heredoc-chunked prompt write step into `agent`'s step list right after
/// checkout, rather than `gh-aw-jobgraph` owning the workflow body text.
fn build_steps(job: &JobSpec, workflow: &WorkflowData) -> Vec<StepSpec> {
    if job.name != "agent" {
        return job.steps.clone();
    }
    let mut steps = job.steps.clone();
    let insert_at = if steps.first().and_then(|s| s.uses.as_deref()) == Some("actions/checkout@v4") {
        1
    } else {
        0
    };
    steps.insert(insert_at, write_prompt_step(&workflow.body));
    steps
}

/// Canonical per-step order: `name, id, if, uses, with, env, run`.
fn build_step(step: &StepSpec) -> Value {
    let mut map = Map::new();
    if let Some(name) = &step.name {
        map.insert("name".to_string(), Value::String(name.clone()));
    }
    if let Some(id) = &step.id {
        map.insert("id".to_string(), Value::String(id.clone()));
    }
    if let Some(cond) = &step.r#if {
        map.insert("if".to_string(), Value::String(cond.clone()));
    }
    if let Some(uses) = &step.uses {
        map.insert("uses".to_string(), Value::String(uses.clone()));
    }
    if !step.with.is_empty() {
        map.insert("with".to_string(), Value::Map(step.with.clone()));
    }
    if !step.env.is_empty() {
        map.insert("env".to_string(), Value::Map(step.env.clone()));
    }
    if let Some(run) = &step.run {
        map.insert("run".to_string(), Value::String(run.clone()));
    }
    Value::Map(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_aw_core::{EngineConfig, EngineId, NetworkPolicy};

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
    fn document_orders_top_level_keys_name_on_permissions_jobs() {
        let workflow = workflow();
        let artifacts = gh_aw_engine::render(&workflow.engine, &[], false);
        let graph = gh_aw_jobgraph::build(&workflow, &[], &artifacts, &[], None);
        let doc = build_document(&workflow, &workflow.on, &graph);
        let map = doc.as_map().unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "on", "permissions", "jobs"]);
    }

    #[test]
    fn agent_job_gets_a_prompt_write_step_after_checkout() {
        let workflow = workflow();
        let artifacts = gh_aw_engine::render(&workflow.engine, &[], false);
        let graph = gh_aw_jobgraph::build(&workflow, &[], &artifacts, &[], None);
        let agent_job = build_job(&graph.agent, &workflow);
        let map = agent_job.as_map().unwrap();
        let steps = map.get("steps").unwrap().as_seq().unwrap();
        let run_texts: Vec<&str> = steps
            .iter()
            .filter_map(|s| s.as_map().and_then(|m| m.get("run")).and_then(Value::as_str))
            .collect();
        assert!(run_texts.iter().any(|r| r.contains("GH_AW_PROMPT")));
    }
}
