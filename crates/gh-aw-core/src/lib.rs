//! Shared data model and error taxonomy for the gh-aw compiler.
//!
//! Every downstream pass crate (`gh-aw-frontmatter` through `gh-aw-emit`)
//! depends on this crate and nothing else in the workspace, keeping the
//! dependency graph between passes a strict line rather than a mesh.

pub mod engine;
pub mod error;
pub mod job;
pub mod mcp;
pub mod value;
pub mod workflow;

pub use engine::{EngineId, McpTransportKind};
pub use error::{CompileError, Diagnostic, DiagnosticBag, Location, Severity};
pub use job::{JobSpec, StepSpec};
pub use mcp::{McpConfig, McpTransport};
pub use value::{Map, Value};
pub use workflow::{
    is_valid_repo_slug, EngineConfig, ExpansionContext, NetworkPolicy, Role, SafeOutputEntry,
    WorkflowData, WorkflowSource, DEFAULT_TIMEOUT_MINUTES,
};
