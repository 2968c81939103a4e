//! `cache-memory` neutral tool: unlike the other neutral tools in
//! `gh-aw-mcp`, this one is not an MCP server — it is a GitHub Actions
//! cache mount the agent reads from and the `update_cache_memory` job
//! writes back to only after threat detection passes (spec.md §4.7's
//! "Deferred cache save"). Kept in its own crate because both the Engine
//! Renderer (it needs a restore step on the agent job) and the Job Graph
//! Builder (it owns the save-side job) depend on it.

use gh_aw_core::{Map, StepSpec, Value};

const DEFAULT_CACHE_PATH: &str = "/tmp/gh-aw/cache-memory";

/// Parsed `tools.cache-memory` configuration.
#[derive(Debug, Clone)]
pub struct CacheMemoryConfig {
    pub enabled: bool,
    pub key: String,
    pub path: String,
    pub retention_days: Option<i64>,
}

impl CacheMemoryConfig {
    /// Parse from the `tools` map; `None` if `cache-memory` is not declared.
    pub fn from_tools(tools: &Map, workflow_id: &str) -> Option<Self> {
        let value = tools.get("cache-memory")?;
        let config = value.as_map().cloned().unwrap_or_default();
        let key = config
            .get("key")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("gh-aw-cache-memory-{workflow_id}"));
        let path = config
            .get("path")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| DEFAULT_CACHE_PATH.to_string());
        let retention_days = config.get("retention-days").and_then(Value::as_int);
        Some(Self {
            enabled: true,
            key,
            path,
            retention_days,
        })
    }

    /// Restore step placed early in the `agent` job, before the engine runs.
    pub fn restore_step(&self) -> StepSpec {
        StepSpec::uses("actions/cache/restore@v4")
            .named("Restore cache-memory")
            .with_id("restore-cache-memory")
            .with_input("path", self.path.clone())
            .with_input("key", self.key.clone())
    }

    /// Save step placed in the deferred `update_cache_memory` job, which
    /// only runs once the detection job's `success` output is true.
    pub fn save_step(&self) -> StepSpec {
        StepSpec::uses("actions/cache/save@v4")
            .named("Save cache-memory")
            .with_input("path", self.path.clone())
            .with_input("key", self.key.clone())
    }
}
