//! Claude engine rendering: a pinned setup action (no Node/npm install
//! needed, unlike Copilot/Codex) plus `claude` CLI invocation flags.

use gh_aw_core::{EngineConfig, McpConfig, StepSpec};

use crate::{execution_shell, render_mcp_config, secret_check_step, EngineArtifacts};

const LOG_FILE: &str = "/tmp/gh-aw/agent-logs/claude.log";

pub fn render(engine: &EngineConfig, mcp_configs: &[McpConfig], safe_outputs_enabled: bool) -> EngineArtifacts {
    let mut install_steps = vec![
        secret_check_step("claude", &["ANTHROPIC_API_KEY", "CLAUDE_CODE_OAUTH_TOKEN"]),
        StepSpec::uses("anthropics/claude-code-base-action@v1")
            .named("Install Claude Code")
            .with_input("claude-version", engine.version.clone().unwrap_or_else(|| "latest".to_string())),
    ];

    let mcp_artifact = render_mcp_config(gh_aw_core::EngineId::Claude, mcp_configs, None);
    install_steps.push(mcp_artifact.step.clone());

    let mut flags = vec!["--print".to_string(), "--output-format".to_string(), "stream-json".to_string()];
    if let Some(model) = &engine.model {
        flags.push("--model".to_string());
        flags.push(model.clone());
    }
    if let Some(max_turns) = engine.max_turns {
        flags.push("--max-turns".to_string());
        flags.push(max_turns.to_string());
    }
    flags.push("--mcp-config".to_string());
    flags.push(mcp_artifact.path.to_string());
    for extra in &engine.args {
        flags.push(extra.clone());
    }

    let mut execution_step = StepSpec::run(execution_shell("claude", &flags, LOG_FILE)).named("Run Claude Code");
    execution_step.env.insert(
        "ANTHROPIC_API_KEY".to_string(),
        gh_aw_core::Value::String("${{ secrets.ANTHROPIC_API_KEY }}".to_string()),
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
