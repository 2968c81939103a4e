//! Codex engine rendering: Node + `npm -g` CLI install, TOML MCP config,
//! `--search` for the built-in web-search capability (spec.md §4.4/§4.5).

use gh_aw_core::{EngineConfig, McpConfig, StepSpec};

use crate::{execution_shell, render_mcp_config, secret_check_step, EngineArtifacts};

const LOG_FILE: &str = "/tmp/gh-aw/agent-logs/codex.log";

pub fn render(engine: &EngineConfig, mcp_configs: &[McpConfig], safe_outputs_enabled: bool) -> EngineArtifacts {
    let mut install_steps = vec![
        secret_check_step("codex", &["CODEX_API_KEY", "OPENAI_API_KEY"]),
        StepSpec::uses("actions/setup-node@v4")
            .named("Set up Node.js")
            .with_input("node-version", "22"),
        StepSpec::run(format!(
            "npm install -g @openai/codex@{}",
            engine.version.clone().unwrap_or_else(|| "latest".to_string())
        ))
        .named("Install Codex CLI"),
    ];

    let mcp_artifact = render_mcp_config(gh_aw_core::EngineId::Codex, mcp_configs, engine.raw_config.as_deref());
    install_steps.push(mcp_artifact.step.clone());

    let mut flags = vec!["--full-auto".to_string(), "--search".to_string()];
    if let Some(model) = &engine.model {
        flags.push("--model".to_string());
        flags.push(model.clone());
    }
    // Codex does not support `max-turns` (spec.md §4.3); never emitted here.
    flags.push("--mcp-config".to_string());
    flags.push(mcp_artifact.path.to_string());
    for extra in &engine.args {
        flags.push(extra.clone());
    }

    let mut execution_step = StepSpec::run(execution_shell("codex exec", &flags, LOG_FILE)).named("Run Codex CLI");
    execution_step.env.insert(
        "OPENAI_API_KEY".to_string(),
        gh_aw_core::Value::String("${{ secrets.CODEX_API_KEY || secrets.OPENAI_API_KEY }}".to_string()),
    );
    execution_step
        .env
        .insert("GH_AW_PROMPT".to_string(), gh_aw_core::Value::String("/tmp/gh-aw/aw-prompts/prompt.txt".to_string()));
    if safe_outputs_enabled {
        execution_step.env.insert(
            "GH_AW_SAFE_OUTPUTS".to_string(),
            gh_aw_core::Value::String("/tmp/gh-aw/safe-outputs/outputs.jsonl".to_string()),
        );
        execution_step.env.insert(
            "GH_AW_SAFE_OUTPUTS_CONFIG".to_string(),
            gh_aw_core::Value::String("/tmp/gh-aw/safe-outputs/config.json".to_string()),
        );
    }

    EngineArtifacts {
        install_steps,
        mcp_config_step: mcp_artifact.step,
        execution_step,
        mcp_config_path: mcp_artifact.path,
    }
}
