//! Pass 5: Engine Renderer.
//!
//! For the selected engine, produces the three artifacts spec.md §4.5
//! names: installation steps, an MCP configuration file (JSON for
//! Claude/Copilot, TOML for Codex) written by a prelude step, and the
//! execution step that invokes the engine binary against `$GH_AW_PROMPT`.
//! Grounded on `csa_executor::transport::{Transport, TransportFactory}`'s
//! own per-tool command-building dispatch, generalized from "build one
//! `tokio::process::Command`" to "build a list of GitHub Actions steps".

mod claude;
mod codex;
mod copilot;
mod custom;
mod mcp_config;
mod secrets;

pub use mcp_config::{render_mcp_config, McpConfigArtifact};
pub use secrets::secret_check_step;

use gh_aw_core::{EngineConfig, EngineId, McpConfig, StepSpec};

/// The three render outputs for one engine (spec.md §4.5).
#[derive(Debug, Clone)]
pub struct EngineArtifacts {
    /// Steps that install language runtimes / the engine CLI and validate
    /// secret presence, run before the MCP config and execution steps.
    pub install_steps: Vec<StepSpec>,
    /// The prelude step that materializes the MCP server config file.
    pub mcp_config_step: StepSpec,
    /// The actual engine invocation.
    pub execution_step: StepSpec,
    /// Absolute path the execution step passes as `--mcp-config`.
    pub mcp_config_path: &'static str,
}

/// Render the full set of engine artifacts for `engine` given the
/// normalized MCP servers the Tool Expander produced.
pub fn render(
    engine: &EngineConfig,
    mcp_configs: &[McpConfig],
    safe_outputs_enabled: bool,
) -> EngineArtifacts {
    match engine.id {
        EngineId::Claude => claude::render(engine, mcp_configs, safe_outputs_enabled),
        EngineId::Copilot => copilot::render(engine, mcp_configs, safe_outputs_enabled),
        EngineId::Codex => codex::render(engine, mcp_configs, safe_outputs_enabled),
        EngineId::Custom => custom::render(engine, mcp_configs, safe_outputs_enabled),
    }
}

/// Shared shape of the final `run:` invocation, built by each engine's own
/// flag-selection logic and common to all four engines (spec.md §4.5 (c)).
pub(crate) fn execution_shell(engine_binary: &str, flags: &[String], log_file: &str) -> String {
    let flags_joined = flags.join(" ");
    format!(
        "set -o pipefail\nINSTRUCTION=$(cat \"$GH_AW_PROMPT\")\n{engine_binary} {flags_joined} \"$INSTRUCTION\" 2>&1 | tee {log_file}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_aw_core::{EngineConfig, Map};

    fn engine(id: EngineId) -> EngineConfig {
        EngineConfig {
            id,
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
    fn renders_each_engine_without_panicking() {
        for id in [EngineId::Claude, EngineId::Copilot, EngineId::Codex, EngineId::Custom] {
            let artifacts = render(&engine(id), &[], false);
            assert!(!artifacts.install_steps.is_empty() || id == EngineId::Custom);
            assert!(artifacts.execution_step.run.is_some());
        }
    }

    #[test]
    fn execution_shell_pipes_through_tee() {
        let shell = execution_shell("claude", &["--model".to_string(), "sonnet".to_string()], "/tmp/log.txt");
        assert!(shell.contains("set -o pipefail"));
        assert!(shell.contains("tee /tmp/log.txt"));
        assert!(shell.contains("claude --model sonnet"));
    }
}
