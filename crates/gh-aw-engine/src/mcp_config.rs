//! MCP configuration file rendering (spec.md §4.5 (b)): JSON for
//! Claude/Copilot, TOML for Codex, each written into the job by a prelude
//! step before the execution step runs.

use gh_aw_core::{EngineId, McpConfig, McpTransport, StepSpec};

/// The rendered MCP config file plus the prelude step that writes it.
#[derive(Debug, Clone)]
pub struct McpConfigArtifact {
    pub path: &'static str,
    pub contents: String,
    pub step: StepSpec,
}

pub fn render_mcp_config(engine: EngineId, configs: &[McpConfig], raw_config: Option<&str>) -> McpConfigArtifact {
    let mut sorted: Vec<&McpConfig> = configs.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    match engine {
        EngineId::Claude => render_json(&sorted, "/tmp/mcp-config/mcp-servers.json"),
        EngineId::Copilot => render_json(&sorted, "/tmp/gh-aw/.copilot/mcp-config.json"),
        EngineId::Codex => render_toml(&sorted, raw_config),
        EngineId::Custom => render_json(&sorted, "/tmp/mcp-config/mcp-servers.json"),
    }
}

fn render_json(configs: &[&McpConfig], path: &'static str) -> McpConfigArtifact {
    let mut servers = serde_json::Map::new();
    for cfg in configs {
        let mut entry = serde_json::Map::new();
        match &cfg.transport {
            McpTransport::Stdio { command, args, env, .. } => {
                entry.insert("command".to_string(), serde_json::Value::String(command.clone()));
                entry.insert(
                    "args".to_string(),
                    serde_json::Value::Array(args.iter().cloned().map(serde_json::Value::String).collect()),
                );
                if !env.is_empty() {
                    let mut sorted_keys: Vec<&String> = env.keys().collect();
                    sorted_keys.sort();
                    let mut env_obj = serde_json::Map::new();
                    for key in sorted_keys {
                        env_obj.insert(key.clone(), serde_json::Value::String(env[key].clone()));
                    }
                    entry.insert("env".to_string(), serde_json::Value::Object(env_obj));
                }
            }
            McpTransport::Http { url, headers } => {
                entry.insert("type".to_string(), serde_json::Value::String("http".to_string()));
                entry.insert("url".to_string(), serde_json::Value::String(url.clone()));
                if !headers.is_empty() {
                    let mut sorted_keys: Vec<&String> = headers.keys().collect();
                    sorted_keys.sort();
                    let mut header_obj = serde_json::Map::new();
                    for key in sorted_keys {
                        header_obj.insert(key.clone(), serde_json::Value::String(headers[key].clone()));
                    }
                    entry.insert("headers".to_string(), serde_json::Value::Object(header_obj));
                }
            }
        }
        if !cfg.allowed.is_empty() {
            entry.insert(
                "allowed".to_string(),
                serde_json::Value::Array(cfg.allowed.iter().cloned().map(serde_json::Value::String).collect()),
            );
        }
        servers.insert(cfg.id.clone(), serde_json::Value::Object(entry));
    }
    let mut root = serde_json::Map::new();
    root.insert("mcpServers".to_string(), serde_json::Value::Object(servers));
    let contents = serde_json::to_string_pretty(&serde_json::Value::Object(root)).unwrap_or_default();
    McpConfigArtifact {
        path,
        step: write_file_step(path, &contents),
        contents,
    }
}

fn render_toml(configs: &[&McpConfig], raw_config: Option<&str>) -> McpConfigArtifact {
    const PATH: &str = "/tmp/gh-aw/mcp-config/config.toml";
    let mut out = String::new();
    out.push_str("[history]\npersistence = \"none\"\n");
    for cfg in configs {
        out.push('\n');
        out.push_str(&format!("[mcp_servers.{}]\n", cfg.id));
        match &cfg.transport {
            McpTransport::Stdio { command, args, env, .. } => {
                out.push_str(&format!("command = {}\n", toml_string(command)));
                if !args.is_empty() {
                    let rendered: Vec<String> = args.iter().map(|a| toml_string(a)).collect();
                    out.push_str(&format!("args = [{}]\n", rendered.join(", ")));
                }
                if !env.is_empty() {
                    let mut sorted_keys: Vec<&String> = env.keys().collect();
                    sorted_keys.sort();
                    out.push_str("[mcp_servers.");
                    out.push_str(&cfg.id);
                    out.push_str(".env]\n");
                    for key in sorted_keys {
                        out.push_str(&format!("{key} = {}\n", toml_string(&env[key])));
                    }
                }
            }
            McpTransport::Http { url, .. } => {
                out.push_str(&format!("url = {}\n", toml_string(url)));
                out.push_str("bearer_token_env_var = \"GH_AW_GITHUB_TOKEN\"\n");
            }
        }
    }
    if let Some(raw) = raw_config {
        out.push('\n');
        out.push_str(raw.trim_end());
        out.push('\n');
    }
    McpConfigArtifact {
        path: PATH,
        step: write_file_step(PATH, &out),
        contents: out,
    }
}

fn toml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn write_file_step(path: &str, contents: &str) -> StepSpec {
    let dir = std::path::Path::new(path)
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let run = format!(
        "mkdir -p {dir}\ncat > {path} << 'GH_AW_MCP_CONFIG_EOF'\n{contents}\nGH_AW_MCP_CONFIG_EOF\n"
    );
    StepSpec::run(run).named("Write MCP server configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_aw_core::McpConfig;

    #[test]
    fn claude_renders_json_at_fixed_path() {
        let configs = vec![McpConfig::new_stdio("github", "docker")];
        let artifact = render_mcp_config(EngineId::Claude, &configs, None);
        assert_eq!(artifact.path, "/tmp/mcp-config/mcp-servers.json");
        assert!(artifact.contents.contains("\"mcpServers\""));
    }

    #[test]
    fn copilot_renders_json_at_its_own_path() {
        let configs = vec![McpConfig::new_stdio("github", "docker")];
        let artifact = render_mcp_config(EngineId::Copilot, &configs, None);
        assert_eq!(artifact.path, "/tmp/gh-aw/.copilot/mcp-config.json");
    }

    #[test]
    fn codex_renders_toml_with_history_preamble_and_mcp_table() {
        let configs = vec![McpConfig::new_http("github", "https://api.githubcopilot.com/mcp/")];
        let artifact = render_mcp_config(EngineId::Codex, &configs, None);
        assert!(artifact.contents.contains("[history]"));
        assert!(artifact.contents.contains("persistence = \"none\""));
        assert!(artifact.contents.contains("[mcp_servers.github]"));
        assert!(artifact.contents.contains("bearer_token_env_var = \"GH_AW_GITHUB_TOKEN\""));
        assert!(!artifact.contents.contains("docker"));
    }

    #[test]
    fn codex_appends_raw_config_block() {
        let artifact = render_mcp_config(EngineId::Codex, &[], Some("[profiles.default]\nmodel = \"gpt-5\""));
        assert!(artifact.contents.contains("[profiles.default]"));
    }
}
