//! Pre-emit validation against the upstream GitHub Actions workflow schema
//! (spec.md §4.8). Unlike the opt-in `--validate` external checks in
//! `gh-aw-schema`, this check is fatal: an emitted document that does not
//! validate against GitHub's own schema is an internal defect in the
//! emitter, not an authoring error, so it returns `CompileError::Internal`.
//!
//! The schema is fetched once over HTTPS and cached on disk so repeated
//! compiles (and offline compiles against a warm cache) don't re-fetch it;
//! if neither the network nor a cached copy is available the check fails
//! loudly rather than silently skipping validation, since a generated
//! workflow that secretly violates GitHub's schema is worse than a slow
//! compile. Grounded on `csa_config::config_tiers`'s own
//! fetch-once-cache-on-disk discipline for its remote-backed config tier,
//! retargeted from a JSON config document to a JSON Schema document.

use std::path::PathBuf;
use std::time::Duration;

use gh_aw_core::CompileError;

const SCHEMA_URL: &str = "https://raw.githubusercontent.com/SchemaStore/schemastore/master/src/schemas/json/github-workflow.json";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

pub struct SchemaCache {
    client: reqwest::Client,
    cache_path: Option<PathBuf>,
}

impl SchemaCache {
    pub fn new() -> Self {
        let cache_path = directories::ProjectDirs::from("dev", "gh-aw", "gh-aw")
            .map(|dirs| dirs.cache_dir().join("github-workflow.schema.json"));
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            cache_path,
        }
    }

    /// Fetch the schema over HTTPS, falling back to the on-disk cache if the
    /// request fails, and writing a fresh copy to the cache on success.
    pub async fn fetch_or_load(&self) -> Result<serde_json::Value, CompileError> {
        match self.fetch_remote().await {
            Ok(schema) => {
                self.write_cache(&schema);
                Ok(schema)
            }
            Err(fetch_err) => self.load_cache().ok_or_else(|| {
                CompileError::Internal(format!(
                    "could not obtain the GitHub Actions workflow schema: {fetch_err} (no cached copy at {})",
                    self.cache_path.as_deref().map(|p| p.display().to_string()).unwrap_or_else(|| "<unavailable>".to_string())
                ))
            }),
        }
    }

    async fn fetch_remote(&self) -> Result<serde_json::Value, String> {
        let response = self
            .client
            .get(SCHEMA_URL)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        response.json::<serde_json::Value>().await.map_err(|e| e.to_string())
    }

    fn write_cache(&self, schema: &serde_json::Value) {
        let Some(path) = &self.cache_path else { return };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(text) = serde_json::to_string(schema) {
            let _ = std::fs::write(path, text);
        }
    }

    fn load_cache(&self) -> Option<serde_json::Value> {
        let path = self.cache_path.as_ref()?;
        let text = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&text).ok()
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a serialized workflow document against the cached GitHub
/// Actions schema.
pub fn validate(document: &serde_json::Value, schema: &serde_json::Value) -> Result<(), CompileError> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| CompileError::Internal(format!("github workflow schema failed to compile: {e}")))?;
    let errors: Vec<String> = validator.iter_errors(document).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CompileError::Internal(format!(
            "emitted workflow does not validate against the GitHub Actions workflow schema:\n{}",
            errors.join("\n")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_minimal_document_passes() {
        let schema = serde_json::json!({
            "type": "object",
            "required": ["on", "jobs"],
        });
        let document = serde_json::json!({"on": "push", "jobs": {}});
        assert!(validate(&document, &schema).is_ok());
    }

    #[test]
    fn missing_required_key_fails() {
        let schema = serde_json::json!({
            "type": "object",
            "required": ["on", "jobs"],
        });
        let document = serde_json::json!({"on": "push"});
        assert!(validate(&document, &schema).is_err());
    }
}
