use std::path::Path;

use gh_aw_core::Value;
use gh_aw_frontmatter::parse;

#[test]
fn real_workflow_shape_parses_end_to_end() {
    let src = r#"---
on:
  workflow_dispatch:
engine: claude
permissions:
  contents: read
  issues: write
tools:
  github:
    allowed: [list_issues, create_issue]
timeout-minutes: 15
---

# Weekly Digest

Summarize open issues from the last week.
"#;

    let parsed = parse(Path::new("weekly-digest.md"), src.as_bytes()).unwrap();
    assert_eq!(
        parsed.frontmatter.get("engine").and_then(Value::as_str),
        Some("claude")
    );
    assert_eq!(
        parsed
            .frontmatter
            .get("timeout-minutes")
            .and_then(Value::as_int),
        Some(15)
    );
    assert!(parsed.body.starts_with("\n# Weekly Digest"));

    let tools = parsed.frontmatter.get("tools").and_then(Value::as_map).unwrap();
    let github = tools.get("github").and_then(Value::as_map).unwrap();
    let allowed = github.get("allowed").and_then(Value::as_seq).unwrap();
    assert_eq!(allowed.len(), 2);
}

#[test]
fn crlf_line_endings_are_tolerated() {
    let src = "---\r\nengine: codex\r\n---\r\nBody line.\r\n";
    let parsed = parse(Path::new("x.md"), src.as_bytes()).unwrap();
    assert_eq!(
        parsed.frontmatter.get("engine").and_then(Value::as_str),
        Some("codex")
    );
}

#[test]
fn leading_blank_lines_before_delimiter_are_skipped() {
    let src = "\n\n---\nengine: copilot\n---\nBody\n";
    let parsed = parse(Path::new("x.md"), src.as_bytes()).unwrap();
    assert_eq!(
        parsed.frontmatter.get("engine").and_then(Value::as_str),
        Some("copilot")
    );
}
