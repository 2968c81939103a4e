//! Custom engine rendering: the author supplies the binary via
//! `engine.args`/`engine.env` directly; no install step beyond checking
//! that an entrypoint was actually configured, since a `custom` engine has
//! no fixed CLI the compiler knows how to install.

use gh_aw_core::{EngineConfig, McpConfig, StepSpec};

use crate::{execution_shell, render_mcp_config, EngineArtifacts};

const LOG_FILE: &str = "/tmp/gh-aw/agent-logs/custom.log";

pub fn render(engine: &EngineConfig, mcp_configs: &[McpConfig], safe_outputs_enabled: bool) -> EngineArtifacts {
    let mcp_artifact = render_mcp_config(gh_aw_core::EngineId::Custom, mcp_configs, None);
    let install_steps = vec![mcp_artifact.step.clone()];

    let binary = engine.user_agent.clone().unwrap_or_else(|| "custom-agent".to_string());
    let mut flags = Vec::new();
    if let Some(model) = &engine.model {
        flags.push("--model".to_string());
        flags.push(model.clone());
    }
    flags.push("--mcp-config".to_string());
    flags.push(mcp_artifact.path.to_string());
    for extra in &engine.args {
        flags.push(extra.clone());
    }

    let mut execution_step = StepSpec::run(execution_shell(&binary, &flags, LOG_FILE)).named("Run custom engine");
    for (key, value) in &engine.env {
        if let Some(s) = value.as_str() {
            execution_step.env.insert(key.clone(), gh_aw_core::Value::String(s.to_string()));
        }
    }
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
