//! Pass 1: Frontmatter Parser.
//!
//! Splits the raw bytes of a `.md` file into a YAML frontmatter mapping and
//! a Markdown body, per spec.md §4.1. Generalized from
//! `weave::parser::parse_frontmatter`'s `---`-delimited split (there, TOML
//! inside a `.skill.toml`-flavored dialect; here, YAML) with duplicate-key
//! rejection and integer-preserving decoding added on top.

use std::path::{Path, PathBuf};

use gh_aw_core::{CompileError, Diagnostic, Map, Value};

/// Result of splitting a source file: frontmatter mapping plus body text.
#[derive(Debug, Clone)]
pub struct ParsedFrontmatter {
    pub frontmatter: Map,
    pub body: String,
}

/// Parse the raw bytes of a workflow Markdown file.
///
/// If no opening `---` precedes only blank/comment lines, the frontmatter is
/// absent and the mapping is empty (spec.md §4.1).
#[tracing::instrument(skip(bytes))]
pub fn parse(path: &Path, bytes: &[u8]) -> Result<ParsedFrontmatter, CompileError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        CompileError::Syntax(Diagnostic::error(
            path,
            "syntax",
            format!("file is not valid UTF-8: {e}"),
        ))
    })?;

    match split_frontmatter(text) {
        Some((yaml_text, yaml_start_line, body)) => {
            reject_duplicate_top_level_keys(path, yaml_text, yaml_start_line)?;
            let frontmatter = decode_yaml(path, yaml_text, yaml_start_line)?;
            Ok(ParsedFrontmatter {
                frontmatter,
                body: body.to_string(),
            })
        }
        None => Ok(ParsedFrontmatter {
            frontmatter: Map::new(),
            body: text.to_string(),
        }),
    }
}

/// Locate the `---`-delimited frontmatter block.
///
/// Returns `(yaml_text, yaml_start_line, body)` where `yaml_start_line` is
/// the 1-based line number of the first line *inside* the block (used to
/// translate YAML decoder line numbers back into source-file line numbers).
fn split_frontmatter(text: &str) -> Option<(&str, u32, &str)> {
    let mut lines = text.split('\n');
    let mut consumed_bytes = 0usize;
    let mut line_no = 0u32;

    // Skip leading blank lines before the opening delimiter; any other
    // non-blank, non-`---` content means there is no frontmatter at all.
    loop {
        let line = lines.next()?;
        line_no += 1;
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() {
            consumed_bytes += line.len() + 1;
            continue;
        }
        if trimmed.trim_end() == "---" {
            consumed_bytes += line.len() + 1;
            break;
        }
        return None;
    }

    let yaml_start_line = line_no + 1;
    let yaml_start = consumed_bytes;
    let mut yaml_end = None;
    let mut cursor = consumed_bytes;

    for line in text[consumed_bytes..].split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed.trim_end() == "---" {
            yaml_end = Some(cursor);
            cursor += line.len();
            break;
        }
        cursor += line.len();
    }

    let yaml_end = yaml_end?;
    let yaml_text = &text[yaml_start..yaml_end];
    let body = &text[cursor..];
    let body = body.strip_prefix('\n').unwrap_or(body);
    Some((yaml_text, yaml_start_line, body))
}

/// Reject duplicate top-level keys.
///
/// A full YAML-aware duplicate check would require a custom event-level
/// parser; since frontmatter is always a top-level mapping, scanning for
/// repeated `key:` lines at zero indentation (outside of block scalars) is
/// sufficient and matches what authors actually write.
fn reject_duplicate_top_level_keys(
    path: &Path,
    yaml_text: &str,
    yaml_start_line: u32,
) -> Result<(), CompileError> {
    let mut seen = std::collections::HashSet::new();
    let mut in_block_scalar = false;
    let mut block_scalar_indent: Option<usize> = None;

    for (offset, raw_line) in yaml_text.split('\n').enumerate() {
        let line_no = yaml_start_line + offset as u32;
        let indent = raw_line.len() - raw_line.trim_start().len();

        if in_block_scalar {
            if raw_line.trim().is_empty() {
                continue;
            }
            if let Some(min_indent) = block_scalar_indent {
                if indent > min_indent {
                    continue;
                }
            }
            in_block_scalar = false;
        }

        if indent != 0 {
            continue;
        }
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some(colon) = find_key_colon(trimmed) else {
            continue;
        };
        let key = trimmed[..colon].trim();
        if key.is_empty() {
            continue;
        }
        let value_part = trimmed[colon + 1..].trim();
        if value_part == "|" || value_part == ">" || value_part.starts_with("|-") || value_part.starts_with(">-") {
            in_block_scalar = true;
            block_scalar_indent = Some(0);
        }

        if !seen.insert(key.to_string()) {
            return Err(CompileError::Syntax(
                Diagnostic::error(
                    path,
                    "syntax",
                    format!("duplicate frontmatter key: '{key}'"),
                )
                .at(gh_aw_core::Location {
                    line: line_no,
                    column: 1,
                }),
            ));
        }
    }

    Ok(())
}

fn find_key_colon(trimmed: &str) -> Option<usize> {
    let bytes = trimmed.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' if !in_double => in_single = !in_single,
            b'"' if !in_single => in_double = !in_double,
            b':' if !in_single && !in_double => {
                if i + 1 == bytes.len() || bytes[i + 1] == b' ' {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn decode_yaml(path: &Path, yaml_text: &str, yaml_start_line: u32) -> Result<Map, CompileError> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml_text).map_err(|e| {
        let location = e.location();
        let line = location
            .map(|l| l.line() as u32 + yaml_start_line.saturating_sub(1))
            .unwrap_or(yaml_start_line);
        let column = location.map(|l| l.column() as u32).unwrap_or(1);
        CompileError::Syntax(
            Diagnostic::error(path, "syntax", format!("frontmatter YAML error: {e}")).at(
                gh_aw_core::Location { line, column },
            ),
        )
    })?;

    match Value::from_yaml(value) {
        Value::Map(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(CompileError::Syntax(Diagnostic::error(
            path,
            "syntax",
            format!("frontmatter must be a mapping, found {}", other.type_name()),
        ))),
    }
}

/// Convenience wrapper reading from disk.
pub fn parse_file(path: &Path) -> Result<ParsedFrontmatter, CompileError> {
    let bytes = std::fs::read(path).map_err(|e| {
        CompileError::Internal(format!("failed to read {}: {e}", path.display()))
    })?;
    parse(path, &bytes)
}

/// Basename without extension, used as the workflow id (spec.md §3).
pub fn workflow_id(path: &Path) -> String {
    gh_aw_core::WorkflowData::workflow_id_from_path(path)
}

pub fn to_path_buf(path: &Path) -> PathBuf {
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_frontmatter_yields_empty_map() {
        let parsed = parse(Path::new("x.md"), b"# Hello\nJust markdown.\n").unwrap();
        assert!(parsed.frontmatter.is_empty());
        assert_eq!(parsed.body, "# Hello\nJust markdown.\n");
    }

    #[test]
    fn basic_frontmatter_splits_correctly() {
        let src = "---\non: workflow_dispatch\nengine: copilot\n---\nSay hi.\n";
        let parsed = parse(Path::new("x.md"), src.as_bytes()).unwrap();
        assert_eq!(
            parsed.frontmatter.get("engine").and_then(Value::as_str),
            Some("copilot")
        );
        assert_eq!(parsed.body, "Say hi.\n");
    }

    #[test]
    fn integer_values_round_trip_as_integers() {
        let src = "---\ntimeout-minutes: 7\n---\nbody\n";
        let parsed = parse(Path::new("x.md"), src.as_bytes()).unwrap();
        assert_eq!(
            parsed.frontmatter.get("timeout-minutes").and_then(Value::as_int),
            Some(7)
        );
    }

    #[test]
    fn duplicate_top_level_key_is_rejected() {
        let src = "---\nname: a\nname: b\n---\nbody\n";
        let err = parse(Path::new("x.md"), src.as_bytes()).unwrap_err();
        match err {
            CompileError::Syntax(d) => assert!(d.message.contains("duplicate frontmatter key")),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn block_scalar_body_does_not_trigger_duplicate_detection() {
        let src = "---\ndescription: |\n  name: not a key\n  engine: also not a key\nname: real\n---\nbody\n";
        let parsed = parse(Path::new("x.md"), src.as_bytes()).unwrap();
        assert_eq!(parsed.frontmatter.get("name").and_then(Value::as_str), Some("real"));
    }

    #[test]
    fn malformed_yaml_reports_location() {
        let src = "---\nengine: [unterminated\n---\nbody\n";
        let err = parse(Path::new("x.md"), src.as_bytes()).unwrap_err();
        match err {
            CompileError::Syntax(d) => assert!(d.location.line >= 1),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn non_mapping_frontmatter_is_rejected() {
        let src = "---\n- a\n- b\n---\nbody\n";
        let err = parse(Path::new("x.md"), src.as_bytes()).unwrap_err();
        assert!(matches!(err, CompileError::Syntax(_)));
    }

    #[test]
    fn workflow_id_strips_extension() {
        assert_eq!(workflow_id(Path::new("/a/weekly-digest.md")), "weekly-digest");
    }
}
