//! Forbidden-in-shared field policy (spec.md §4.2).

use std::path::Path;

use gh_aw_core::{CompileError, Diagnostic, Map};

/// Keys a non-root (shared/imported) workflow file may never declare.
pub const FORBIDDEN_IN_SHARED: &[&str] = &[
    "on",
    "name",
    "run-name",
    "runs-on",
    "if",
    "concurrency",
    "env",
    "environment",
    "container",
    "services",
    "cache",
    "command",
    "features",
    "github-token",
    "imports",
    "labels",
    "roles",
    "sandbox",
    "source",
    "strict",
    "timeout-minutes",
    "timeout_minutes",
    "tracker-id",
];

pub fn reject_forbidden_fields(file: &Path, frontmatter: &Map) -> Result<(), CompileError> {
    reject_forbidden_fields_except(file, frontmatter, &[])
}

/// Same check as [`reject_forbidden_fields`], but tolerates the keys named
/// in `except`. The import resolver itself calls this with `except:
/// &["imports"]`: a shared file is still disallowed from declaring
/// `imports:` as authoring policy, but the resolver must keep descending
/// into a shared file's own `imports:` to detect multi-hop cycles
/// (spec.md §8 scenario 4) before that policy violation would otherwise
/// short-circuit the walk. Callers that only want the static authoring
/// check (e.g. schema suggestion tables) use `reject_forbidden_fields`.
pub fn reject_forbidden_fields_except(
    file: &Path,
    frontmatter: &Map,
    except: &[&str],
) -> Result<(), CompileError> {
    for key in FORBIDDEN_IN_SHARED {
        if except.contains(key) {
            continue;
        }
        if frontmatter.contains_key(*key) {
            return Err(CompileError::Import(Diagnostic::error(
                file,
                "import",
                format!("'{key}' cannot be used in shared workflows"),
            )));
        }
    }
    Ok(())
}
