//! Expansion of author-declared custom MCP servers (spec.md §4.4
//! "User-defined MCP"): exactly one of `command`/`url`, network policy
//! enforcement in strict mode, env/headers passed through verbatim.

use std::collections::HashMap;
use std::path::Path;

use gh_aw_core::{CompileError, Diagnostic, ExpansionContext, Map, McpConfig, Value};

pub fn expand_user_defined(
    file: &Path,
    id: &str,
    config: &Map,
    ctx: &ExpansionContext<'_>,
) -> Result<McpConfig, CompileError> {
    crate::assert_exactly_one_transport(file, id, config)?;

    let allowed = config
        .get("allowed")
        .and_then(Value::as_seq)
        .map(|items| items.iter().filter_map(Value::as_str).map(ToOwned::to_owned).collect())
        .unwrap_or_default();

    if let Some(url) = config.get("url").and_then(Value::as_str) {
        if ctx.strict && !ctx.network.configured {
            return Err(CompileError::Policy(vec![Diagnostic::error(
                file,
                "policy",
                format!("strict mode requires an explicit network policy for MCP server '{id}'"),
            )]));
        }
        let headers = map_to_string_pairs(config.get("headers"));
        return Ok(McpConfig::new_http(id, url).with_headers(headers).with_allowed(allowed));
    }

    let command = config
        .get("command")
        .and_then(Value::as_str)
        .expect("exactly-one-transport check guarantees a command here")
        .to_string();
    if ctx.strict && config.get("container").is_some() && !ctx.network.configured {
        return Err(CompileError::Policy(vec![Diagnostic::error(
            file,
            "policy",
            format!("strict mode requires an explicit network policy for container MCP server '{id}'"),
        )]));
    }
    let args = config
        .get("args")
        .and_then(Value::as_seq)
        .map(|items| items.iter().filter_map(Value::as_str).map(ToOwned::to_owned).collect())
        .unwrap_or_default();
    let env = map_to_string_pairs(config.get("env"));

    Ok(McpConfig::new_stdio(id, command).with_args(args).with_env(env).with_allowed(allowed))
}

fn map_to_string_pairs(value: Option<&Value>) -> HashMap<String, String> {
    let Some(map) = value.and_then(Value::as_map) else {
        return HashMap::new();
    };
    map.iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_aw_core::{EngineId, NetworkPolicy};

    fn ctx(strict: bool, network: &NetworkPolicy) -> ExpansionContext<'_> {
        ExpansionContext {
            engine: EngineId::Claude,
            network,
            strict,
            github_token: None,
        }
    }

    #[test]
    fn stdio_command_passes_through_env() {
        let mut config = Map::new();
        config.insert("command".to_string(), Value::String("npx".to_string()));
        let mut env = Map::new();
        env.insert("API_KEY".to_string(), Value::String("${{ secrets.API_KEY }}".to_string()));
        config.insert("env".to_string(), Value::Map(env));

        let network = NetworkPolicy::default();
        let cfg = expand_user_defined(Path::new("x.md"), "custom", &config, &ctx(false, &network)).unwrap();
        assert!(cfg.is_stdio());
    }

    #[test]
    fn http_in_strict_mode_requires_network_policy() {
        let mut config = Map::new();
        config.insert("url".to_string(), Value::String("https://example.com/mcp".to_string()));
        let network = NetworkPolicy::default();
        let err = expand_user_defined(Path::new("x.md"), "custom", &config, &ctx(true, &network)).unwrap_err();
        assert!(matches!(err, CompileError::Policy(_)));
    }

    #[test]
    fn http_in_strict_mode_with_explicit_network_is_allowed() {
        let mut config = Map::new();
        config.insert("url".to_string(), Value::String("https://example.com/mcp".to_string()));
        let network = NetworkPolicy::deny_all();
        let cfg = expand_user_defined(Path::new("x.md"), "custom", &config, &ctx(true, &network)).unwrap();
        assert!(cfg.is_http());
    }

    #[test]
    fn both_command_and_url_is_rejected() {
        let mut config = Map::new();
        config.insert("command".to_string(), Value::String("npx".to_string()));
        config.insert("url".to_string(), Value::String("https://example.com".to_string()));
        let network = NetworkPolicy::default();
        let err = expand_user_defined(Path::new("x.md"), "custom", &config, &ctx(false, &network)).unwrap_err();
        assert!(matches!(err, CompileError::Policy(_)));
    }
}
