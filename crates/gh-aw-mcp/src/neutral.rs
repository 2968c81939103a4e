//! Expansion rules for the fixed set of neutral tool placeholders
//! (`github`, `playwright`, `bash`, `edit`, `web-fetch`, `web-search`,
//! `cache-memory`, `safe-outputs`, `agentic-workflows`) named in spec.md
//! §4.4. Grounded on `csa_config::mcp::McpServerConfig`'s own stdio/http
//! builder pattern, generalized from one fixed server shape per tool id.

use std::collections::HashMap;

use gh_aw_core::{CompileError, ExpansionContext, Map, McpConfig, McpTransportKind, Value};

/// The fixed set of tool ids the compiler understands without the author
/// declaring a custom MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeutralTool {
    Github,
    Playwright,
    Bash,
    Edit,
    WebFetch,
    WebSearch,
    CacheMemory,
    SafeOutputs,
    AgenticWorkflows,
}

impl NeutralTool {
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "github" => Some(Self::Github),
            "playwright" => Some(Self::Playwright),
            "bash" => Some(Self::Bash),
            "edit" => Some(Self::Edit),
            "web-fetch" => Some(Self::WebFetch),
            "web-search" => Some(Self::WebSearch),
            "cache-memory" => Some(Self::CacheMemory),
            "safe-outputs" => Some(Self::SafeOutputs),
            "agentic-workflows" => Some(Self::AgenticWorkflows),
            _ => None,
        }
    }
}

const DEFAULT_GITHUB_TOOLSETS: &str = "default";
const GITHUB_MCP_IMAGE: &str = "ghcr.io/github/github-mcp-server";

/// Expand one neutral tool into zero or one [`McpConfig`]. `None` means the
/// tool is a built-in engine capability (`bash`, `edit`) or a no-op on this
/// engine (`web-search` on an engine with a built-in search flag,
/// `cache-memory`'s directory mount is handled entirely by the job graph
/// builder, not the MCP layer).
pub fn expand_neutral_tool(
    tool: NeutralTool,
    config: &Map,
    ctx: &ExpansionContext<'_>,
) -> Result<Option<McpConfig>, CompileError> {
    match tool {
        NeutralTool::Bash | NeutralTool::Edit | NeutralTool::CacheMemory => Ok(None),
        NeutralTool::Github => Ok(Some(expand_github(config, ctx))),
        NeutralTool::Playwright => Ok(Some(expand_playwright(config, ctx))),
        NeutralTool::WebFetch => {
            if ctx.engine.builtin_web_fetch() {
                Ok(None)
            } else {
                Ok(Some(expand_web_fetch()))
            }
        }
        NeutralTool::WebSearch => {
            if ctx.engine.builtin_web_search() {
                Ok(None)
            } else {
                Ok(Some(expand_web_search()))
            }
        }
        NeutralTool::SafeOutputs => Ok(Some(expand_safe_outputs())),
        NeutralTool::AgenticWorkflows => Ok(Some(expand_agentic_workflows())),
    }
}

/// Bearer token precedence chain for remote `github` mode and for any
/// HTTP-transport neutral tool that needs a GitHub credential: custom
/// (per-tool `github-token`) → top-level `github-token` → default
/// `GH_AW_GITHUB_TOKEN || GITHUB_TOKEN` (spec.md §4.4).
pub fn select_github_token(custom: Option<&str>, top_level: Option<&str>) -> String {
    if let Some(custom) = custom {
        return custom.to_string();
    }
    if let Some(top_level) = top_level {
        return top_level.to_string();
    }
    "${{ secrets.GH_AW_GITHUB_TOKEN || secrets.GITHUB_TOKEN }}".to_string()
}

fn expand_github(config: &Map, ctx: &ExpansionContext<'_>) -> McpConfig {
    let mode = config.get("mode").and_then(Value::as_str).unwrap_or("local");
    let custom_token = config.get("github-token").and_then(Value::as_str);
    let allowed = allowed_list(config);

    if mode == "remote" && ctx.engine.supports_transport(McpTransportKind::Http) {
        let read_only = config.get("read-only").and_then(Value::as_bool).unwrap_or(false);
        let path = if read_only { "mcp-readonly" } else { "mcp" };
        let url = format!("https://api.githubcopilot.com/{path}/");
        let token = select_github_token(custom_token, ctx.github_token);
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        return McpConfig::new_http("github", url)
            .with_headers(headers)
            .with_allowed(allowed);
    }

    let toolsets = config
        .get("toolsets")
        .and_then(Value::as_seq)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(",")
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_GITHUB_TOOLSETS.to_string());
    let read_only = config.get("read-only").and_then(Value::as_bool).unwrap_or(false);

    let mut env = HashMap::new();
    env.insert(
        "GITHUB_PERSONAL_ACCESS_TOKEN".to_string(),
        select_github_token(custom_token, ctx.github_token),
    );
    if read_only {
        env.insert("GITHUB_READ_ONLY".to_string(), "1".to_string());
    }
    env.insert("GITHUB_TOOLSETS".to_string(), toolsets);

    McpConfig::new_stdio("github", "docker")
        .with_args(vec![
            "run".to_string(),
            "-i".to_string(),
            "--rm".to_string(),
            GITHUB_MCP_IMAGE.to_string(),
        ])
        .with_env(env)
        .with_allowed(allowed)
}

fn expand_playwright(config: &Map, ctx: &ExpansionContext<'_>) -> McpConfig {
    let version = config.get("version").and_then(Value::as_str).unwrap_or("latest");
    let mut origins: Vec<String> = ctx.network.allowed.clone();
    if let Some(extra) = config.get("allowed-origins").and_then(Value::as_seq) {
        for origin in extra.iter().filter_map(Value::as_str) {
            if !origins.iter().any(|o| o == origin) {
                origins.push(origin.to_string());
            }
        }
    }
    let allowed = allowed_list(config);

    let mut args = vec!["-y".to_string(), format!("@playwright/mcp@{version}")];
    if !origins.is_empty() {
        args.push("--allowed-origins".to_string());
        args.push(origins.join(";"));
    }

    McpConfig::new_stdio("playwright", "npx").with_args(args).with_allowed(allowed)
}

fn expand_web_fetch() -> McpConfig {
    McpConfig::new_stdio("web-fetch", "npx").with_args(vec![
        "-y".to_string(),
        "@modelcontextprotocol/server-fetch".to_string(),
    ])
}

fn expand_web_search() -> McpConfig {
    McpConfig::new_stdio("web-search", "npx").with_args(vec![
        "-y".to_string(),
        "@modelcontextprotocol/server-brave-search".to_string(),
    ])
}

fn expand_safe_outputs() -> McpConfig {
    let mut env = HashMap::new();
    env.insert("GH_AW_SAFE_OUTPUTS".to_string(), "/tmp/gh-aw/safe-outputs/outputs.jsonl".to_string());
    env.insert(
        "GH_AW_SAFE_OUTPUTS_CONFIG".to_string(),
        "/tmp/gh-aw/safe-outputs/config.json".to_string(),
    );
    env.insert("GH_AW_ASSETS_DIR".to_string(), "/tmp/gh-aw/assets".to_string());
    env.insert("GH_AW_ASSETS_BRANCH".to_string(), "${{ github.ref_name }}".to_string());
    env.insert("GITHUB_REPOSITORY".to_string(), "${{ github.repository }}".to_string());
    env.insert("GITHUB_SERVER_URL".to_string(), "${{ github.server_url }}".to_string());

    McpConfig::new_stdio("safe-outputs", "node")
        .with_args(vec!["/tmp/gh-aw/safeoutputs/mcp-server.cjs".to_string()])
        .with_env(env)
}

fn expand_agentic_workflows() -> McpConfig {
    McpConfig::new_stdio("agentic-workflows", "gh").with_args(vec!["aw".to_string(), "mcp-server".to_string()])
}

fn allowed_list(config: &Map) -> Vec<String> {
    config
        .get("allowed")
        .and_then(Value::as_seq)
        .map(|items| items.iter().filter_map(Value::as_str).map(ToOwned::to_owned).collect())
        .unwrap_or_default()
}
