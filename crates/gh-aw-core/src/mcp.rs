//! Engine-normalized MCP server configuration (spec.md §3 `MCPConfig`).
//!
//! Generalized from the teacher's `csa_config::mcp::{McpTransport,
//! McpServerConfig}` tagged-transport enum: same `stdio | http` split and
//! the same "exactly one of `command` or `url`" discipline, extended with
//! the network-policy and allow-list fields the Tool Expander (pass 4)
//! needs to produce.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Transport kind for a normalized MCP server entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpTransport {
    Stdio {
        command: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        env: HashMap<String, String>,
        /// Optional container image when the command is `docker run`-shaped.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container_image: Option<String>,
    },
    Http {
        url: String,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        headers: HashMap<String, String>,
    },
}

impl McpTransport {
    pub fn label(&self) -> &'static str {
        match self {
            McpTransport::Stdio { .. } => "stdio",
            McpTransport::Http { .. } => "http",
        }
    }
}

/// Fully normalized, engine-agnostic MCP server record produced by the Tool
/// Expander and consumed by the Engine Renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpConfig {
    pub id: String,
    pub transport: McpTransport,
    /// Allow-list of tool names exposed by this server; empty means "all".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
}

impl McpConfig {
    pub fn is_stdio(&self) -> bool {
        matches!(self.transport, McpTransport::Stdio { .. })
    }

    pub fn is_http(&self) -> bool {
        matches!(self.transport, McpTransport::Http { .. })
    }

    pub fn new_stdio(id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            transport: McpTransport::Stdio {
                command: command.into(),
                args: Vec::new(),
                env: HashMap::new(),
                container_image: None,
            },
            allowed: Vec::new(),
        }
    }

    pub fn new_http(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            transport: McpTransport::Http {
                url: url.into(),
                headers: HashMap::new(),
            },
            allowed: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        if let McpTransport::Stdio { args: a, .. } = &mut self.transport {
            *a = args;
        }
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        match &mut self.transport {
            McpTransport::Stdio { env: e, .. } => *e = env,
            McpTransport::Http { headers, .. } => {
                // HTTP configs carry bearer/auth data as headers, not env.
                let _ = headers;
            }
        }
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        if let McpTransport::Http { headers: h, .. } = &mut self.transport {
            *h = headers;
        }
        self
    }

    pub fn with_allowed(mut self, allowed: Vec<String>) -> Self {
        self.allowed = allowed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdio_builder_roundtrips() {
        let cfg = McpConfig::new_stdio("github", "docker")
            .with_args(vec!["run".into(), "ghcr.io/github/mcp".into()]);
        assert!(cfg.is_stdio());
        assert!(!cfg.is_http());
        assert_eq!(cfg.transport.label(), "stdio");
    }

    #[test]
    fn http_builder_sets_headers() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer x".to_string());
        let cfg = McpConfig::new_http("github", "https://api.githubcopilot.com/mcp/")
            .with_headers(headers.clone());
        assert!(cfg.is_http());
        match cfg.transport {
            McpTransport::Http { headers: h, .. } => assert_eq!(h, headers),
            _ => panic!("expected http"),
        }
    }

    #[test]
    fn serializes_with_type_tag() {
        let cfg = McpConfig::new_stdio("safe-outputs", "node");
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["transport"]["type"], "stdio");
    }
}
