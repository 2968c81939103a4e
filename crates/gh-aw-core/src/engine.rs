//! The agentic engine selector and its capability matrix.
//!
//! Generalized from the teacher's `ToolName` enum (`gemini-cli | opencode |
//! codex | claude-code`, each with a fixed `model_family` and
//! `prompt_transport_capabilities`) to this spec's engine set
//! (`copilot | claude | codex | custom`), each advertising the capability
//! flags the validator (pass 3) and renderer (pass 5) gate on: HTTP MCP
//! support, `max-turns` support, and built-in web-search/web-fetch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MCP transport kinds an engine can be asked to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum McpTransportKind {
    Stdio,
    Http,
}

/// The AI engine selected by a workflow's `engine:` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineId {
    Copilot,
    Claude,
    Codex,
    Custom,
}

impl EngineId {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineId::Copilot => "copilot",
            EngineId::Claude => "claude",
            EngineId::Codex => "codex",
            EngineId::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "copilot" => Some(EngineId::Copilot),
            "claude" => Some(EngineId::Claude),
            "codex" => Some(EngineId::Codex),
            "custom" => Some(EngineId::Custom),
            _ => None,
        }
    }

    /// Transports this engine can be configured to speak to an MCP server.
    pub fn supported_mcp_transports(self) -> &'static [McpTransportKind] {
        match self {
            EngineId::Copilot => &[McpTransportKind::Stdio, McpTransportKind::Http],
            EngineId::Claude => &[McpTransportKind::Stdio, McpTransportKind::Http],
            EngineId::Codex => &[McpTransportKind::Stdio, McpTransportKind::Http],
            EngineId::Custom => &[McpTransportKind::Stdio],
        }
    }

    pub fn supports_transport(self, kind: McpTransportKind) -> bool {
        self.supported_mcp_transports().contains(&kind)
    }

    /// `max-turns` is only meaningful for engines that advertise a
    /// turn-bounded control loop (spec.md I4).
    pub fn supports_max_turns(self) -> bool {
        matches!(self, EngineId::Copilot | EngineId::Claude)
    }

    /// Codex rejects `engine.permissions` entirely (spec.md §4.3).
    pub fn supports_engine_permissions(self) -> bool {
        !matches!(self, EngineId::Codex)
    }

    /// Whether the engine has a built-in web-search flag, making the
    /// `web-search` neutral tool a no-op (spec.md §4.4).
    pub fn builtin_web_search(self) -> bool {
        matches!(self, EngineId::Codex)
    }

    /// Whether the engine has a built-in web-fetch equivalent.
    pub fn builtin_web_fetch(self) -> bool {
        false
    }

    /// Default concurrency group suffix used by the job graph builder.
    pub fn concurrency_group(self) -> String {
        format!("gh-aw-{}", self.as_str())
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_all_variants() {
        for engine in [EngineId::Copilot, EngineId::Claude, EngineId::Codex, EngineId::Custom] {
            assert_eq!(EngineId::parse(engine.as_str()), Some(engine));
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(EngineId::parse("gpt5"), None);
    }

    #[test]
    fn codex_rejects_engine_permissions() {
        assert!(!EngineId::Codex.supports_engine_permissions());
        assert!(EngineId::Claude.supports_engine_permissions());
    }

    #[test]
    fn codex_has_builtin_search() {
        assert!(EngineId::Codex.builtin_web_search());
        assert!(!EngineId::Claude.builtin_web_search());
    }

    #[test]
    fn custom_engine_is_stdio_only() {
        assert!(EngineId::Custom.supports_transport(McpTransportKind::Stdio));
        assert!(!EngineId::Custom.supports_transport(McpTransportKind::Http));
    }

    #[test]
    fn concurrency_group_matches_default_pattern() {
        assert_eq!(EngineId::Claude.concurrency_group(), "gh-aw-claude");
    }
}
