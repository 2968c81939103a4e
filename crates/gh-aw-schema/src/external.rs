//! Opt-in external validators (spec.md §4.3: `--validate`): container image
//! reachability and package-registry existence. Never fatal — failures
//! downgrade to warnings. Grounded on
//! `csa_memory::llm_client::ApiClient`'s own `reqwest::Client` + bounded
//! timeout + graceful-degradation shape, retargeted from chat completions
//! to plain existence checks.

use std::time::Duration;

use async_trait::async_trait;
use gh_aw_core::Diagnostic;

const EXTERNAL_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// A pluggable external check; production uses `HttpExternalValidator`, unit
/// tests use an in-memory fake so no real network I/O is required.
#[async_trait]
pub trait ExternalValidator: Send + Sync {
    async fn container_image_reachable(&self, image: &str) -> bool;
    async fn package_exists(&self, ecosystem: &str, name: &str) -> bool;
}

/// Real implementation: HEAD/GET against the registry APIs.
pub struct HttpExternalValidator {
    client: reqwest::Client,
}

impl HttpExternalValidator {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(EXTERNAL_CHECK_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpExternalValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExternalValidator for HttpExternalValidator {
    async fn container_image_reachable(&self, image: &str) -> bool {
        let Some((registry_path, _tag)) = split_image_tag(image) else {
            return false;
        };
        let url = format!("https://ghcr.io/v2/{registry_path}/manifests/latest");
        matches!(self.client.head(&url).send().await, Ok(resp) if resp.status().is_success())
    }

    async fn package_exists(&self, ecosystem: &str, name: &str) -> bool {
        let url = match ecosystem {
            "pip" | "uv" => format!("https://pypi.org/pypi/{name}/json"),
            "npm" => format!("https://registry.npmjs.org/{name}"),
            _ => return true,
        };
        matches!(self.client.get(&url).send().await, Ok(resp) if resp.status().is_success())
    }
}

fn split_image_tag(image: &str) -> Option<(&str, &str)> {
    image.rsplit_once(':').or(Some((image, "latest")))
}

/// Run the external checks for every referenced container image / package,
/// producing warning-level diagnostics for anything unreachable.
pub async fn run_external_checks(
    file: &std::path::Path,
    validator: &dyn ExternalValidator,
    container_images: &[String],
    packages: &[(String, String)],
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for image in container_images {
        if !validator.container_image_reachable(image).await {
            diagnostics.push(Diagnostic::warning(
                file,
                "external",
                format!("container image '{image}' could not be confirmed reachable"),
            ));
        }
    }
    for (ecosystem, name) in packages {
        if !validator.package_exists(ecosystem, name).await {
            diagnostics.push(Diagnostic::warning(
                file,
                "external",
                format!("{ecosystem} package '{name}' could not be confirmed to exist"),
            ));
        }
    }
    diagnostics
}
