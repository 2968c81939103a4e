//! Pass 7: Job Graph Builder.
//!
//! Assembles the small DAG of GitHub Actions jobs spec.md §4.7 names:
//! `activation?`, `agent`, `detection?`, one job per enabled safe-output
//! kind, and `update_cache_memory?`. Grounded on
//! `csa_executor::executor::ExecutionPlan`'s own "build the full plan once,
//! read-only after" discipline, generalized from one linear execution plan
//! to a `needs:`-edged DAG.

mod activation;
mod agent;
mod cache_job;
mod detection;
mod handlers;
mod permissions;
mod triggers;

pub use activation::needs_activation_job;
pub use triggers::{compile_if_expression, UNSAFE_TRIGGER_EVENTS};

use gh_aw_core::{JobSpec, McpConfig, Role, WorkflowData};
use gh_aw_engine::EngineArtifacts;
use gh_aw_safeoutputs::SafeOutputPlan;

/// Every job the compiler may emit for one workflow, in dependency order.
#[derive(Debug, Clone)]
pub struct JobGraph {
    pub activation: Option<JobSpec>,
    pub agent: JobSpec,
    pub detection: Option<JobSpec>,
    pub handlers: Vec<JobSpec>,
    pub update_cache_memory: Option<JobSpec>,
}

impl JobGraph {
    /// All jobs in emission order, for the YAML Emitter to walk.
    pub fn jobs(&self) -> Vec<&JobSpec> {
        let mut all = Vec::new();
        if let Some(job) = &self.activation {
            all.push(job);
        }
        all.push(&self.agent);
        if let Some(job) = &self.detection {
            all.push(job);
        }
        all.extend(self.handlers.iter());
        if let Some(job) = &self.update_cache_memory {
            all.push(job);
        }
        all
    }
}

/// Build the complete job graph for a validated workflow.
pub fn build(
    workflow: &WorkflowData,
    mcp_configs: &[McpConfig],
    engine_artifacts: &EngineArtifacts,
    safe_output_plans: &[SafeOutputPlan],
    cache: Option<&gh_aw_cache::CacheMemoryConfig>,
) -> JobGraph {
    let safe_outputs_enabled = !safe_output_plans.is_empty();
    let threat_detection_enabled = safe_outputs_enabled;

    let activation = activation::build(workflow);
    let activation_name = activation.as_ref().map(|_| "activation".to_string());

    let mut agent = agent::build(workflow, mcp_configs, engine_artifacts, safe_outputs_enabled, cache);
    if let Some(name) = &activation_name {
        agent = agent.needs(name.clone()).when(format!("needs.{name}.outputs.success == 'true'"));
    }

    let detection = if threat_detection_enabled {
        Some(detection::build(workflow, &agent.name))
    } else {
        None
    };

    let handlers = if let Some(detection_job) = &detection {
        handlers::build(workflow, safe_output_plans, &detection_job.name)
    } else {
        Vec::new()
    };

    let update_cache_memory = cache.and_then(|cache_cfg| {
        let detection_name = detection.as_ref().map(|j| j.name.clone())?;
        let mut needs: Vec<String> = vec![detection_name.clone()];
        needs.extend(handlers.iter().map(|h| h.name.clone()));
        Some(cache_job::build(cache_cfg, &detection_name, &needs))
    });

    JobGraph {
        activation,
        agent,
        detection,
        handlers,
        update_cache_memory,
    }
}

/// Default roles per spec.md §4.7: unsafe triggers gate on `[admin,
/// maintainer]` unless the author widened `roles` to include `all`.
pub(crate) fn roles_require_gate(roles: &[Role]) -> bool {
    !roles.contains(&Role::All)
}
