//! Pipeline orchestration: wires passes 1-8 into a single `compile()` entry
//! point. Grounded on `weave::pipeline::run`'s own straight-line
//! stage-after-stage driver, generalized with the cooperative-cancellation
//! checks spec.md §5 requires between stages and a `futures`-backed batch
//! entry point for compiling many workflows concurrently.

use std::path::{Path, PathBuf};

use gh_aw_core::{CompileError, Diagnostic};
use gh_aw_import::FsImportSource;
use tokio_util::sync::CancellationToken;

fn cancelled(file: &Path, token: &CancellationToken) -> Option<CompileError> {
    token.is_cancelled().then(|| {
        CompileError::Internal(format!("compilation of {} was cancelled", file.display()))
    })
}

/// Knobs that shape one `compile()` call.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Fetch/cache-validate the emitted document against GitHub's own
    /// workflow JSON Schema before returning (spec.md §4.8). Requires
    /// network or a warm cache; failures here are fatal.
    pub validate_schema: bool,
    /// Embedded in the generated header comment.
    pub generator_version: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            validate_schema: false,
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Everything a successful compilation produces.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub workflow_id: String,
    pub yaml: String,
    pub warnings: Vec<Diagnostic>,
}

/// Run every pass over one workflow Markdown file and return its compiled
/// lock-file text. Never writes partial output: the caller receives either
/// a complete [`CompileOutput`] or a [`CompileError`], never a half-built
/// document (spec.md §7 "partial output is never written").
#[tracing::instrument(skip(options, cancellation))]
pub async fn compile(
    path: &Path,
    options: &CompileOptions,
    cancellation: &CancellationToken,
) -> Result<CompileOutput, CompileError> {
    let mut warnings = Vec::new();

    // Pass 1 + Pass 2: frontmatter parse + import resolution are one call
    // on the import resolver's side (it parses the root file itself).
    let resolved = gh_aw_import::resolve(&FsImportSource, path)?;
    warnings.extend(resolved.warnings.iter().map(|w| {
        Diagnostic::warning(path, "import", format!("{}: {}", w.field, w.message))
    }));

    if let Some(err) = cancelled(path, cancellation) {
        return Err(err);
    }

    // Pass 3: schema + policy validation, projected into a typed workflow.
    let (workflow, validate_warnings) =
        gh_aw_schema::validate(path, &resolved.frontmatter, resolved.body)?;
    warnings.extend(validate_warnings);

    if let Some(err) = cancelled(path, cancellation) {
        return Err(err);
    }

    let safe_outputs_enabled = !workflow.safe_outputs.is_empty();

    // Pass 4: tool expansion into normalized MCP server configs.
    let ctx = gh_aw_core::ExpansionContext {
        engine: workflow.engine.id,
        network: &workflow.network,
        strict: workflow.strict,
        github_token: workflow.github_token.as_deref(),
    };
    let mcp_configs = gh_aw_mcp::expand_tools(path, &workflow.tools, &ctx, safe_outputs_enabled)?;

    // I3: target-repo slugs must be well-formed before anything downstream
    // builds a handler job around them.
    gh_aw_safeoutputs::check_target_repo_slugs(path, &workflow.safe_outputs)?;

    // I6: every tool the prompt is allowed to call on the safe-outputs MCP
    // server must correspond to a configured safe-outputs entry.
    gh_aw_safeoutputs::check_prompt_tool_cross_reference(path, &workflow.tools, &workflow.safe_outputs)?;

    if let Some(err) = cancelled(path, cancellation) {
        return Err(err);
    }

    // Pass 5: engine rendering.
    let engine_artifacts = gh_aw_engine::render(&workflow.engine, &mcp_configs, safe_outputs_enabled);

    // Pass 6: safe-output planning.
    let safe_output_plans =
        gh_aw_safeoutputs::plan_safe_outputs(&workflow.safe_outputs, workflow.github_token.as_deref());

    let cache = gh_aw_cache::CacheMemoryConfig::from_tools(&workflow.tools, &workflow.workflow_id);

    if let Some(err) = cancelled(path, cancellation) {
        return Err(err);
    }

    // Pass 7: job graph assembly.
    let graph = gh_aw_jobgraph::build(
        &workflow,
        &mcp_configs,
        &engine_artifacts,
        &safe_output_plans,
        cache.as_ref(),
    );

    if let Some(err) = cancelled(path, cancellation) {
        return Err(err);
    }

    // Pass 8: serialize to the final document.
    let yaml = gh_aw_emit::emit(&workflow, &graph, &options.generator_version)?;

    if options.validate_schema {
        let cache = gh_aw_emit::SchemaCache::new();
        gh_aw_emit::validate_against_github_schema(&yaml, &cache).await?;
    }

    Ok(CompileOutput {
        workflow_id: workflow.workflow_id,
        yaml,
        warnings,
    })
}

/// Compile `path` and atomically write the result to `output_path`
/// (`<workflow>.lock.yml` by convention). No file is written on error.
pub async fn compile_to_file(
    path: &Path,
    output_path: &Path,
    options: &CompileOptions,
    cancellation: &CancellationToken,
) -> Result<CompileOutput, CompileError> {
    let output = compile(path, options, cancellation).await?;
    gh_aw_emit::write_atomic(output_path, &output.yaml)
        .map_err(|e| CompileError::Internal(format!("failed to write {}: {e}", output_path.display())))?;
    Ok(output)
}

/// Compile many workflows concurrently, one [`Result`] per input path in
/// the same order. A single file's failure never aborts the others.
pub async fn compile_batch(
    paths: &[PathBuf],
    options: &CompileOptions,
    cancellation: &CancellationToken,
) -> Vec<Result<CompileOutput, CompileError>> {
    let futures = paths
        .iter()
        .map(|path| compile(path, options, cancellation));
    futures::future::join_all(futures).await
}

/// The conventional output path for a workflow source file:
/// `foo.md` -> `foo.lock.yml`, sitting alongside the source.
pub fn lock_path_for(source: &Path) -> PathBuf {
    let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("workflow");
    source.with_file_name(format!("{stem}.lock.yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_workflow(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const MINIMAL: &str = "---\nengine: claude\n---\nSay hi.\n";

    #[tokio::test]
    async fn compiles_a_minimal_workflow_to_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workflow(dir.path(), "hello.md", MINIMAL);
        let output = compile(&path, &CompileOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(output.yaml.contains("jobs:"));
        assert_eq!(output.workflow_id, "hello");
    }

    #[tokio::test]
    async fn missing_engine_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workflow(dir.path(), "broken.md", "---\nname: broken\n---\nbody\n");
        let err = compile(&path, &CompileOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::Schema(_)));
    }

    #[tokio::test]
    async fn cancellation_before_compiling_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workflow(dir.path(), "hello.md", MINIMAL);
        let token = CancellationToken::new();
        token.cancel();
        let err = compile(&path, &CompileOptions::default(), &token).await.unwrap_err();
        assert!(matches!(err, CompileError::Internal(_)));
    }

    #[tokio::test]
    async fn compile_to_file_writes_the_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workflow(dir.path(), "hello.md", MINIMAL);
        let output_path = lock_path_for(&path);
        compile_to_file(&path, &output_path, &CompileOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(output_path.exists());
        assert_eq!(output_path.file_name().unwrap(), "hello.lock.yml");
    }

    #[tokio::test]
    async fn safe_output_tool_allow_list_referencing_unconfigured_kind_is_a_policy_error() {
        let dir = tempfile::tempdir().unwrap();
        let contents = "---\nengine: claude\nsafe-outputs:\n  create-issue: {}\ntools:\n  safe-outputs:\n    allowed: [create-pull-request]\n---\nSay hi.\n";
        let path = write_workflow(dir.path(), "cross-ref.md", contents);
        let err = compile(&path, &CompileOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::Policy(_)));
    }

    #[tokio::test]
    async fn compile_batch_compiles_every_file_independently() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_workflow(dir.path(), "good.md", MINIMAL);
        let bad = write_workflow(dir.path(), "bad.md", "---\nname: bad\n---\nbody\n");
        let results = compile_batch(
            &[good, bad],
            &CompileOptions::default(),
            &CancellationToken::new(),
        )
        .await;
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
