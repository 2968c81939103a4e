//! Secret-presence validation step: a multi-secret OR chain
//! (e.g. Codex accepts `CODEX_API_KEY || OPENAI_API_KEY`), rendered as a
//! `run:` step that fails fast with a clear message rather than letting the
//! engine CLI itself produce an opaque auth error (spec.md §4.5 (a)).

use gh_aw_core::StepSpec;

/// Build a step that verifies at least one of `env_vars` is a non-empty
/// secret, failing the job with a named-secret error message otherwise.
pub fn secret_check_step(engine_label: &str, env_vars: &[&str]) -> StepSpec {
    let checks: Vec<String> = env_vars
        .iter()
        .map(|v| format!("-n \"${{{}}}\"", v))
        .collect();
    let condition = checks.join(" || ");
    let names = env_vars.join(" or ");
    let run = format!(
        "if [ {condition} ]; then\n  echo \"{engine_label} credential present\"\nelse\n  echo \"::error::{engine_label} requires one of: {names}\" >&2\n  exit 1\nfi\n"
    );
    let mut step = StepSpec::run(run).named(format!("Check {engine_label} credentials"));
    for var in env_vars {
        step.env.insert((*var).to_string(), gh_aw_core::Value::String(format!("${{{{ secrets.{var} }}}}")));
    }
    step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_chain_checks_every_candidate() {
        let step = secret_check_step("codex", &["CODEX_API_KEY", "OPENAI_API_KEY"]);
        let run = step.run.unwrap();
        assert!(run.contains("CODEX_API_KEY"));
        assert!(run.contains("OPENAI_API_KEY"));
        assert!(run.contains("||"));
    }

    #[test]
    fn env_carries_secret_expressions() {
        let step = secret_check_step("claude", &["ANTHROPIC_API_KEY"]);
        assert_eq!(
            step.env.get("ANTHROPIC_API_KEY").unwrap().as_str(),
            Some("${{ secrets.ANTHROPIC_API_KEY }}")
        );
    }
}
