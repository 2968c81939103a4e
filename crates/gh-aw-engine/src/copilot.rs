//! Copilot engine rendering: Node + `npm -g` CLI install, then the
//! `copilot` binary invoked in headless mode.

use gh_aw_core::{EngineConfig, McpConfig, StepSpec};

use crate::{execution_shell, render_mcp_config, secret_check_step, EngineArtifacts};

const LOG_FILE: &str = "/tmp/gh-aw/agent-logs/copilot.log";

pub fn render(engine: &EngineConfig, mcp_configs: &[McpConfig], safe_outputs_enabled: bool) -> EngineArtifacts {
    let mut install_steps = vec![
        secret_check_step("copilot", &["COPILOT_GITHUB_TOKEN", "GITHUB_TOKEN"]),
        StepSpec::uses("actions/setup-node@v4")
            .named("Set up Node.js")
            .with_input("node-version", "22"),
        StepSpec::run(format!(
            "npm install -g @github/copilot@{}",
            engine.version.clone().unwrap_or_else(|| "latest".to_string())
        ))
        .named("Install GitHub Copilot CLI"),
    ];

    let mcp_artifact = render_mcp_config(gh_aw_core::EngineId::Copilot, mcp_configs, None);
    install_steps.push(mcp_artifact.step.clone());

    let mut flags = vec!["--headless".to_string()];
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

    let mut execution_step = StepSpec::run(execution_shell("copilot", &flags, LOG_FILE)).named("Run GitHub Copilot CLI");
    execution_step.env.insert(
        "COPILOT_GITHUB_TOKEN".to_string(),
        gh_aw_core::Value::String("${{ secrets.COPILOT_GITHUB_TOKEN || secrets.GITHUB_TOKEN }}".to_string()),
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

#[cfg(test)]
mod tests {
    use super::*;
    use gh_aw_core::Map;

    fn base_engine() -> EngineConfig {
        EngineConfig {
            id: gh_aw_core::EngineId::Copilot,
            model: None,
            version: None,
            max_turns: None,
            env: Map::new(),
            args: Vec::new(),
            user_agent: None,
            raw_config: None,
            permissions: None,
            concurrency: None,
        }
    }

    #[test]
    fn installs_node_before_the_cli() {
        let artifacts = render(&base_engine(), &[], false);
        let uses: Vec<Option<String>> = artifacts.install_steps.iter().map(|s| s.uses.clone()).collect();
        assert!(uses.iter().any(|u| u.as_deref() == Some("actions/setup-node@v4")));
    }

    #[test]
    fn execution_step_runs_headless() {
        let artifacts = render(&base_engine(), &[], false);
        assert!(artifacts.execution_step.run.unwrap().contains("--headless"));
    }
}
