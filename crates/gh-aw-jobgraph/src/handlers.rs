//! One job per enabled safe-output kind (spec.md §4.6, §4.7): each downloads
//! the detection-cleared artifact, filters it to its own kind, and applies
//! the effect via `actions/github-script` with the kind's selected token and
//! minimal permission delta.

use gh_aw_core::{JobSpec, SafeOutputEntry, StepSpec, WorkflowData};
use gh_aw_safeoutputs::SafeOutputPlan;

use crate::permissions::merge_permission;

const SAFE_OUTPUT_ARTIFACT: &str = "safe_output.jsonl";

pub fn build(workflow: &WorkflowData, plans: &[SafeOutputPlan], detection_job_name: &str) -> Vec<JobSpec> {
    plans
        .iter()
        .map(|plan| build_one(workflow, plan, detection_job_name))
        .collect()
}

fn build_one(workflow: &WorkflowData, plan: &SafeOutputPlan, detection_job_name: &str) -> JobSpec {
    let mut job = JobSpec::new(plan.job_name())
        .needs(detection_job_name)
        .when(format!(
            "needs.{detection_job_name}.outputs.success == 'true'"
        ))
        .step(
            StepSpec::uses("actions/download-artifact@v4")
                .named("Download safe output")
                .with_input("name", SAFE_OUTPUT_ARTIFACT)
                .with_input("path", "/tmp/gh-aw"),
        );

    for (scope, level) in &plan.permission_delta {
        merge_permission(&mut job.permissions, scope, level);
    }

    let entry = workflow
        .safe_outputs
        .iter()
        .find(|e: &&SafeOutputEntry| e.kind.replace('-', "_") == plan.job_name());
    if let Some(entry) = entry {
        if let Some(target_repo) = entry.config.get("target-repo").and_then(|v| v.as_str()) {
            if !gh_aw_core::is_valid_repo_slug(target_repo) {
                tracing::warn!(target_repo, "target-repo does not look like owner/repo");
            }
        }
    }

    let mut script_step = StepSpec::uses("actions/github-script@v7")
        .named(format!("Apply {}", plan.job_name()))
        .with_input("script", format!("require('/tmp/gh-aw/safeoutputs/{}.cjs')(github, context)", plan.job_name()))
        .with_env("GITHUB_TOKEN", plan.token_expr.clone());
    for (key, value) in &plan.env {
        if let Some(s) = value.as_str() {
            script_step = script_step.with_env(key.clone(), s.to_string());
        }
    }
    if plan.ignore_if_error {
        script_step = script_step.with_id("apply");
    }
    job = job.step(script_step);

    if plan.ignore_if_error {
        job = job.when(format!(
            "always() && needs.{detection_job_name}.outputs.success == 'true'"
        ));
    }

    job
}
