//! The `update_cache_memory` job: saves the agent's cache-memory mount back
//! only once detection (and any handlers) have completed, so a compromised
//! agent run can never poison the persisted cache (spec.md §4.7's
//! "Deferred cache save").

use gh_aw_core::JobSpec;
use gh_aw_cache::CacheMemoryConfig;

pub fn build(cache: &CacheMemoryConfig, detection_job_name: &str, needs: &[String]) -> JobSpec {
    let mut job = JobSpec::new("update_cache_memory")
        .when(format!(
            "needs.{detection_job_name}.outputs.success == 'true'"
        ))
        .step(cache.save_step());
    for need in needs {
        job = job.needs(need.clone());
    }
    job
}
