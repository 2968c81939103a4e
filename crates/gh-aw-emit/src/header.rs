//! Generator header comment block (spec.md §4.8): every emitted lock file
//! opens with a `DO NOT EDIT` banner naming the source Markdown file and the
//! compiler version, so a reader (or another tool) never mistakes the
//! compiled YAML for hand-authored workflow config.

use gh_aw_core::WorkflowData;

pub fn render(workflow: &WorkflowData, generator_version: &str) -> String {
    let mut lines = vec![
        "# This file was automatically generated by gh-aw. DO NOT EDIT.".to_string(),
        format!("# Generator: gh-aw v{generator_version}"),
    ];
    if let Some(description) = &workflow.description {
        lines.push(format!("# Description: {description}"));
    }
    if let Some(source) = &workflow.source {
        lines.push(format!("# Source: {source}"));
    } else {
        lines.push(format!("# Source: {}.md", workflow.workflow_id));
    }
    lines.push(String::new());
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_aw_core::{EngineConfig, EngineId, Map, NetworkPolicy, Value};

    fn workflow() -> WorkflowData {
        WorkflowData {
            name: "wf".into(),
            workflow_id: "weekly-digest".into(),
            description: Some("Summarize the week".into()),
            source: None,
            github_token: None,
            on: Value::String("workflow_dispatch".into()),
            permissions: Value::Map(Map::new()),
            runs_on: None,
            timeout_minutes: 20,
            concurrency: None,
            env: Map::new(),
            environment: None,
            container: None,
            services: None,
            r#if: None,
            roles: WorkflowData::default_roles(),
            strict: false,
            engine: EngineConfig {
                id: EngineId::Claude,
                model: None,
                version: None,
                max_turns: None,
                env: Map::new(),
                args: Vec::new(),
                user_agent: None,
                raw_config: None,
                permissions: None,
                concurrency: None,
            },
            tools: Map::new(),
            network: NetworkPolicy::default(),
            safe_outputs: Vec::new(),
            body: "Say hi.".into(),
        }
    }

    #[test]
    fn header_names_source_and_description() {
        let header = render(&workflow(), "0.1.0");
        assert!(header.starts_with("# This file was automatically generated by gh-aw. DO NOT EDIT."));
        assert!(header.contains("weekly-digest.md"));
        assert!(header.contains("Summarize the week"));
        assert!(header.contains("v0.1.0"));
    }
}
