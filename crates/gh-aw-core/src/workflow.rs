//! Canonical in-memory workflow representation (spec.md §3).

use std::path::PathBuf;

use crate::engine::EngineId;
use crate::value::{Map, Value};

/// An input file identified by an absolute path, with byte-identical body
/// preservation (spec.md §3 `WorkflowSource`).
#[derive(Debug, Clone)]
pub struct WorkflowSource {
    pub path: PathBuf,
    pub frontmatter: Map,
    pub body: String,
    /// True for the user-authored main workflow; false for an imported file,
    /// which is schema-validated against the restricted shared-file subset.
    pub is_root: bool,
}

/// Role gating levels for the activation job (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Read,
    Write,
    Maintainer,
    Admin,
    All,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Role::Read),
            "write" => Some(Role::Write),
            "maintainer" => Some(Role::Maintainer),
            "admin" => Some(Role::Admin),
            "all" => Some(Role::All),
            _ => None,
        }
    }
}

/// Engine configuration block (spec.md §3 agentic block).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub id: EngineId,
    pub model: Option<String>,
    pub version: Option<String>,
    pub max_turns: Option<u32>,
    pub env: Map,
    pub args: Vec<String>,
    pub user_agent: Option<String>,
    /// Codex-only raw TOML text appended verbatim to the generated config.
    pub raw_config: Option<String>,
    pub permissions: Option<Value>,
    pub concurrency: Option<String>,
}

/// Network policy (spec.md §3): ecosystem tags, literal domains, or deny-all.
#[derive(Debug, Clone, Default)]
pub struct NetworkPolicy {
    pub configured: bool,
    pub allowed: Vec<String>,
}

impl NetworkPolicy {
    pub fn deny_all() -> Self {
        Self {
            configured: true,
            allowed: Vec::new(),
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.allowed.iter().any(|entry| entry == "*")
    }
}

/// A single `safe-outputs.<kind>` entry's raw configuration, prior to
/// per-kind typed parsing by `gh-aw-safeoutputs`.
#[derive(Debug, Clone)]
pub struct SafeOutputEntry {
    pub kind: String,
    pub config: Map,
}

/// The merged, validated, canonical workflow (spec.md §3 `WorkflowData`).
#[derive(Debug, Clone)]
pub struct WorkflowData {
    pub name: String,
    pub workflow_id: String,
    pub description: Option<String>,
    pub source: Option<String>,
    /// Top-level `github-token:` override used by the Tool Expander's
    /// bearer-token precedence chain (spec.md §4.4).
    pub github_token: Option<String>,

    pub on: Value,
    pub permissions: Value,
    pub runs_on: Option<String>,
    pub timeout_minutes: i64,
    pub concurrency: Option<Value>,
    pub env: Map,
    pub environment: Option<String>,
    pub container: Option<Value>,
    pub services: Option<Value>,
    pub r#if: Option<String>,
    pub roles: Vec<Role>,
    pub strict: bool,

    pub engine: EngineConfig,
    pub tools: Map,
    pub network: NetworkPolicy,
    pub safe_outputs: Vec<SafeOutputEntry>,

    pub body: String,
}

pub const DEFAULT_TIMEOUT_MINUTES: i64 = 20;

impl WorkflowData {
    /// Workflow-id is the basename without extension (spec.md §3).
    pub fn workflow_id_from_path(path: &std::path::Path) -> String {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("workflow")
            .to_string()
    }

    /// Default roles per spec.md §4.7: `[admin, maintainer]`.
    pub fn default_roles() -> Vec<Role> {
        vec![Role::Admin, Role::Maintainer]
    }
}

/// Everything an `MCPConfig` needs to know about the consuming workflow's
/// network policy, threaded through the Tool Expander.
pub struct ExpansionContext<'a> {
    pub engine: EngineId,
    pub network: &'a NetworkPolicy,
    pub strict: bool,
    /// Top-level `github-token` override, second in the custom → top-level →
    /// default precedence chain (spec.md §4.4) that every neutral tool's
    /// bearer-token selection must honor.
    pub github_token: Option<&'a str>,
}

/// Validate a `target-repo` slug against `^[A-Za-z0-9._-]+/[A-Za-z0-9._-]+$`
/// (spec.md invariant I3). Implemented without regex to keep this leaf crate
/// dependency-light; the pattern is simple enough for a hand rolled scan.
pub fn is_valid_repo_slug(slug: &str) -> bool {
    let Some((owner, repo)) = slug.split_once('/') else {
        return false;
    };
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return false;
    }
    let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
    owner.chars().all(valid_char) && repo.chars().all(valid_char)
}
