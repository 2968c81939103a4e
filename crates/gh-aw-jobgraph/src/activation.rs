//! The `activation` job: gates an unsafe-trigger workflow on actor role and
//! compiles `on:` extensions (`names`, `command`) into an `if:` expression
//! (spec.md §4.7).

use gh_aw_core::{JobSpec, StepSpec, WorkflowData};

use crate::triggers::{compile_if_expression, has_unsafe_trigger, stop_after_deadline};
use crate::roles_require_gate;

/// Whether this workflow needs a separate `activation` job ahead of `agent`:
/// either an unsafe trigger under a role gate, or a `stop-after:` deadline
/// that needs a runtime check before the agent runs.
pub fn needs_activation_job(workflow: &WorkflowData) -> bool {
    (has_unsafe_trigger(&workflow.on) && roles_require_gate(&workflow.roles))
        || stop_after_deadline(&workflow.on).is_some()
}

/// Build the `activation` job, or `None` if not required.
pub fn build(workflow: &WorkflowData) -> Option<JobSpec> {
    if !needs_activation_job(workflow) {
        return None;
    }

    let role_gated = has_unsafe_trigger(&workflow.on) && roles_require_gate(&workflow.roles);
    let mut script = String::new();
    let mut step_ids = Vec::new();

    if role_gated {
        let allowed_associations: Vec<&str> = workflow
            .roles
            .iter()
            .filter_map(|role| match role {
                gh_aw_core::Role::Admin => Some("OWNER,MEMBER"),
                gh_aw_core::Role::Maintainer => Some("COLLABORATOR"),
                gh_aw_core::Role::Write => Some("CONTRIBUTOR"),
                gh_aw_core::Role::Read | gh_aw_core::Role::All => None,
            })
            .collect();
        let associations = if allowed_associations.is_empty() {
            "OWNER,MEMBER,COLLABORATOR".to_string()
        } else {
            allowed_associations.join(",")
        };
        script.push_str(&format!(
            "ASSOCIATION=\"${{{{ github.event.sender.author_association }}}}\"\nif [[ \",{associations},\" != *\",$ASSOCIATION,\"* ]]; then\n  echo \"success=false\" >> \"$GITHUB_OUTPUT\"\n  exit 0\nfi\necho \"success=true\" >> \"$GITHUB_OUTPUT\"\n"
        ));
        step_ids.push("check");
    }

    let mut job = JobSpec::new("activation");

    if !script.is_empty() {
        job = job.step(StepSpec::run(script).named("Check actor role").with_id("check"));
    }

    if let Some(deadline) = stop_after_deadline(&workflow.on) {
        let deadline_check = format!(
            "NOW=\"$(date -u +%Y-%m-%dT%H:%M:%SZ)\"\nif [[ \"$NOW\" > \"{deadline}\" ]]; then\n  echo \"success=false\" >> \"$GITHUB_OUTPUT\"\n  exit 0\nfi\necho \"success=true\" >> \"$GITHUB_OUTPUT\"\n"
        );
        job = job.step(
            StepSpec::run(deadline_check)
                .named("Check stop-after deadline")
                .with_id("deadline"),
        );
        step_ids.push("deadline");
    }

    let success_expr = step_ids
        .iter()
        .map(|id| format!("steps.{id}.outputs.success == 'true'"))
        .collect::<Vec<_>>()
        .join(" && ");
    job.outputs.insert(
        "success".to_string(),
        gh_aw_core::Value::String(format!("${{{{ {success_expr} }}}}")),
    );

    if let Some(extension_if) = compile_if_expression(&workflow.on) {
        job = job.when(extension_if);
    }

    Some(job)
}
