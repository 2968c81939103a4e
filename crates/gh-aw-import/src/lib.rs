//! Pass 2: Import Resolver.
//!
//! Recursively resolves `imports:` entries into a single merged frontmatter
//! plus a concatenated body, per spec.md §4.2. The merge algorithm is
//! `csa_config::config_merge::merge_toml_values` retargeted from
//! `toml::Value` to `gh_aw_core::Value`, generalized from "table merge,
//! overlay wins" into the field-kind-aware rules this pass needs (scalar
//! root-wins, list set-union, map deep-merge, permissions widen-only). Cycle
//! detection follows `csa_todo::dag::DependencyGraph`'s own visited-set
//! discipline, adapted to report the cycle path rather than just its nodes.

mod forbidden;
mod graph;
mod merge;

pub use forbidden::FORBIDDEN_IN_SHARED;
pub use graph::{ImportGraph, ImportNode};
pub use merge::{merge_fields, MergeWarning};

use std::path::{Path, PathBuf};

use gh_aw_core::{CompileError, Diagnostic, Map};

/// Source of `.md` file bytes for the import resolver; implemented by
/// `FsImportSource` for real compilation and by an in-memory fake in tests.
pub trait ImportSource {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Reads import targets from the local filesystem, relative to the
/// importing file's own directory (spec.md §4.2: "relative path to another
/// `.md` file in the same repository").
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImportSource;

impl ImportSource for FsImportSource {
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Result of resolving a root workflow's full import tree.
#[derive(Debug, Clone)]
pub struct ResolvedWorkflow {
    pub frontmatter: Map,
    pub body: String,
    /// Absolute paths of every shared file merged in, depth-first pre-order.
    pub imported_paths: Vec<PathBuf>,
    pub warnings: Vec<MergeWarning>,
}

/// Resolve `root`'s transitive imports against `source`.
pub fn resolve(
    source: &impl ImportSource,
    root: &Path,
) -> Result<ResolvedWorkflow, CompileError> {
    let root = root
        .canonicalize()
        .unwrap_or_else(|_| root.to_path_buf());
    let mut graph = ImportGraph::new();
    let root_bytes = source.read(&root).map_err(|e| {
        CompileError::Import(Diagnostic::error(
            &root,
            "import",
            format!("cannot read root workflow: {e}"),
        ))
    })?;
    let root_parsed = gh_aw_frontmatter::parse(&root, &root_bytes)?;

    let mut visiting = vec![root.clone()];
    let mut bodies = vec![root_parsed.body.clone()];
    let mut warnings = Vec::new();
    let mut merged = root_parsed.frontmatter.clone();
    let mut imported_paths = Vec::new();

    graph.insert_root(root.clone());

    let import_list = import_entries(&root, &root_parsed.frontmatter)?;
    for rel in import_list {
        resolve_one(
            source,
            &root,
            &root,
            &rel,
            &mut graph,
            &mut visiting,
            &mut merged,
            &mut bodies,
            &mut imported_paths,
            &mut warnings,
        )?;
    }

    Ok(ResolvedWorkflow {
        frontmatter: merged,
        body: bodies.join("\n\n"),
        imported_paths,
        warnings,
    })
}

#[allow(clippy::too_many_arguments)]
fn resolve_one(
    source: &impl ImportSource,
    root: &Path,
    importer: &Path,
    rel: &str,
    graph: &mut ImportGraph,
    visiting: &mut Vec<PathBuf>,
    merged: &mut Map,
    bodies: &mut Vec<String>,
    imported_paths: &mut Vec<PathBuf>,
    warnings: &mut Vec<MergeWarning>,
) -> Result<(), CompileError> {
    let base = importer.parent().unwrap_or_else(|| Path::new("."));
    let target = normalize(&base.join(rel));

    if let Some(pos) = visiting.iter().position(|p| p == &target) {
        let mut cycle: Vec<String> = visiting[pos..]
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        cycle.push(target.display().to_string());
        return Err(CompileError::Import(Diagnostic::error(
            root,
            "import",
            format!("import cycle detected: {}", cycle.join(" -> ")),
        )));
    }

    if imported_paths.contains(&target) {
        // Already merged via another path; depth-first pre-order dedup.
        return Ok(());
    }

    let bytes = source.read(&target).map_err(|e| {
        CompileError::Import(Diagnostic::error(
            importer,
            "import",
            format!("cannot read import '{rel}': {e}"),
        ))
    })?;
    let parsed = gh_aw_frontmatter::parse(&target, &bytes)?;

    // `imports` itself is excused here: a shared file must be allowed to
    // declare further imports so multi-hop chains (and therefore cycles)
    // can be walked and detected before the forbidden-field policy would
    // otherwise reject the first nested import outright (spec.md §8
    // scenario 4).
    forbidden::reject_forbidden_fields_except(&target, &parsed.frontmatter, &["imports"])?;

    graph.insert_edge(importer.to_path_buf(), target.clone());
    imported_paths.push(target.clone());
    visiting.push(target.clone());

    let nested = import_entries(&target, &parsed.frontmatter)?;
    // Depth-first pre-order: merge this file's own fields before descending
    // into its imports, then descend.
    let mut file_warnings = merge_fields(merged, &parsed.frontmatter)?;
    warnings.append(&mut file_warnings);
    bodies.push(parsed.body.clone());

    for nested_rel in nested {
        resolve_one(
            source,
            root,
            &target,
            &nested_rel,
            graph,
            visiting,
            merged,
            bodies,
            imported_paths,
            warnings,
        )?;
    }

    visiting.pop();
    Ok(())
}

fn import_entries(file: &Path, frontmatter: &Map) -> Result<Vec<String>, CompileError> {
    let Some(value) = frontmatter.get("imports") else {
        return Ok(Vec::new());
    };
    let seq = value.as_seq().ok_or_else(|| {
        CompileError::Import(Diagnostic::error(
            file,
            "import",
            "'imports' must be a list of paths",
        ))
    })?;
    seq.iter()
        .map(|v| {
            v.as_str()
                .map(ToOwned::to_owned)
                .ok_or_else(|| {
                    CompileError::Import(Diagnostic::error(
                        file,
                        "import",
                        "each 'imports' entry must be a string path",
                    ))
                })
        })
        .collect()
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        use std::path::Component;
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource(Mutex<HashMap<PathBuf, Vec<u8>>>);

    impl FakeSource {
        fn with(files: &[(&str, &str)]) -> Self {
            let mut map = HashMap::new();
            for (path, content) in files {
                map.insert(normalize(Path::new(path)), content.as_bytes().to_vec());
            }
            Self(Mutex::new(map))
        }
    }

    impl ImportSource for FakeSource {
        fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
            self.0
                .lock()
                .unwrap()
                .get(&normalize(path))
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "not found"))
        }
    }

    #[test]
    fn merges_single_import_with_root_wins_scalars() {
        let source = FakeSource::with(&[
            ("root.md", "---\nengine: claude\nimports: [shared.md]\n---\nRoot body.\n"),
            ("shared.md", "---\ntools:\n  github: {}\n---\nShared body.\n"),
        ]);
        let resolved = resolve(&source, Path::new("root.md")).unwrap();
        assert_eq!(
            resolved.frontmatter.get("engine").and_then(gh_aw_core::Value::as_str),
            Some("claude")
        );
        assert!(resolved.frontmatter.get("tools").is_some());
        assert!(resolved.body.contains("Root body."));
        assert!(resolved.body.contains("Shared body."));
    }

    #[test]
    fn detects_import_cycle() {
        let source = FakeSource::with(&[
            ("root.md", "---\nimports: [a.md]\n---\nRoot\n"),
            ("a.md", "---\nimports: [b.md]\n---\nA\n"),
            ("b.md", "---\nimports: [a.md]\n---\nB\n"),
        ]);
        let err = resolve(&source, Path::new("root.md")).unwrap_err();
        match err {
            CompileError::Import(d) => assert!(d.message.contains("import cycle detected")),
            other => panic!("expected import error, got {other:?}"),
        }
    }

    #[test]
    fn forbidden_field_in_shared_file_is_rejected() {
        let source = FakeSource::with(&[
            ("root.md", "---\nimports: [shared.md]\n---\nRoot\n"),
            ("shared.md", "---\non: issues\n---\nShared\n"),
        ]);
        let err = resolve(&source, Path::new("root.md")).unwrap_err();
        match err {
            CompileError::Import(d) => assert!(d.message.contains("cannot be used in shared")),
            other => panic!("expected import error, got {other:?}"),
        }
    }

    #[test]
    fn same_import_via_two_paths_is_merged_once() {
        let source = FakeSource::with(&[
            ("root.md", "---\nimports: [a.md, b.md]\n---\nRoot\n"),
            ("a.md", "---\nimports: [common.md]\n---\nA\n"),
            ("b.md", "---\nimports: [common.md]\n---\nB\n"),
            ("common.md", "---\ntools:\n  bash: {}\n---\nCommon\n"),
        ]);
        let resolved = resolve(&source, Path::new("root.md")).unwrap();
        assert_eq!(resolved.body.matches("Common").count(), 1);
    }
}
