use std::path::Path;

use gh_aw_core::{CompileError, Map, Value};
use gh_aw_schema::validate;

#[test]
fn codex_engine_rejects_max_turns() {
    let mut engine = Map::new();
    engine.insert("id".to_string(), Value::String("codex".to_string()));
    engine.insert("max-turns".to_string(), Value::Int(3));
    let mut map = Map::new();
    map.insert("engine".to_string(), Value::Map(engine));

    let err = validate(Path::new("x.md"), &map, String::new()).unwrap_err();
    match err {
        CompileError::Policy(diagnostics) => {
            assert!(diagnostics.iter().any(|d| d.message.contains("max-turns")));
        }
        other => panic!("expected policy error, got {other:?}"),
    }
}

#[test]
fn http_tool_on_custom_engine_is_rejected() {
    let mut map = Map::new();
    map.insert("engine".to_string(), Value::String("custom".to_string()));
    let mut tool = Map::new();
    tool.insert("url".to_string(), Value::String("https://example.com/mcp".to_string()));
    let mut tools = Map::new();
    tools.insert("remote".to_string(), Value::Map(tool));
    map.insert("tools".to_string(), Value::Map(tools));

    let err = validate(Path::new("x.md"), &map, String::new()).unwrap_err();
    assert!(matches!(err, CompileError::Policy(_)));
}

#[test]
fn well_formed_workflow_with_safe_outputs_projects_cleanly() {
    let mut map = Map::new();
    map.insert("engine".to_string(), Value::String("claude".to_string()));

    let mut create_issue = Map::new();
    create_issue.insert("title-prefix".to_string(), Value::String("[bot] ".to_string()));
    let mut safe_outputs = Map::new();
    safe_outputs.insert("create-issue".to_string(), Value::Map(create_issue));
    map.insert("safe-outputs".to_string(), Value::Map(safe_outputs));

    let (data, warnings) = validate(Path::new("x.md"), &map, "Prompt.".to_string()).unwrap();
    assert_eq!(data.safe_outputs.len(), 1);
    assert_eq!(data.safe_outputs[0].kind, "create-issue");
    assert!(warnings.is_empty());
}
