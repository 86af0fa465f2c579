//! Target table providers.
//!
//! A source is fetched exactly once per run and never retried; any failure
//! becomes [`PlannerError::SourceUnavailable`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::SourceSettings;
use crate::error::{PlannerError, PlannerResult};
use crate::models::TargetCatalog;
use crate::parsing::look_table::parse_look_str;

/// Provider of the published LOOK target tables.
#[async_trait]
pub trait TargetSource: Send + Sync {
    /// Fetch and parse both target tables.
    async fn fetch(&self) -> PlannerResult<TargetCatalog>;

    /// Human-readable origin, used in log lines.
    fn describe(&self) -> String;
}

/// Reads a JSON snapshot of the target tables from disk.
#[derive(Debug, Clone)]
pub struct FileTargetSource {
    path: PathBuf,
}

impl FileTargetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TargetSource for FileTargetSource {
    async fn fetch(&self) -> PlannerResult<TargetCatalog> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            PlannerError::SourceUnavailable(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let catalog = parse_look_str(&content).map_err(|e| {
            PlannerError::SourceUnavailable(format!(
                "Failed to parse {}: {:#}",
                self.path.display(),
                e
            ))
        })?;

        info!(
            path = %self.path.display(),
            active = catalog.active.len(),
            new = catalog.new.len(),
            "Loaded target tables from file"
        );
        Ok(catalog)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Fetches the target tables as a JSON document over HTTP.
#[cfg(feature = "http-source")]
#[derive(Debug, Clone)]
pub struct HttpTargetSource {
    url: String,
    client: reqwest::Client,
}

#[cfg(feature = "http-source")]
impl HttpTargetSource {
    pub fn new(url: impl Into<String>, timeout: std::time::Duration) -> PlannerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                PlannerError::SourceUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(feature = "http-source")]
#[async_trait]
impl TargetSource for HttpTargetSource {
    async fn fetch(&self) -> PlannerResult<TargetCatalog> {
        let unavailable =
            |e: reqwest::Error| PlannerError::SourceUnavailable(format!("{}: {}", self.url, e));

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;
        let body = response.text().await.map_err(unavailable)?;

        let catalog = parse_look_str(&body).map_err(|e| {
            PlannerError::SourceUnavailable(format!("Failed to parse {}: {:#}", self.url, e))
        })?;

        info!(
            url = %self.url,
            active = catalog.active.len(),
            new = catalog.new.len(),
            "Fetched target tables"
        );
        Ok(catalog)
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

/// Serves a fixed catalog. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTargetSource {
    catalog: TargetCatalog,
}

impl StaticTargetSource {
    pub fn new(catalog: TargetCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl TargetSource for StaticTargetSource {
    async fn fetch(&self) -> PlannerResult<TargetCatalog> {
        Ok(self.catalog.clone())
    }

    fn describe(&self) -> String {
        format!("static catalog of {} rows", self.catalog.len())
    }
}

/// Build the configured source. A local `path` wins over a `url`.
pub fn source_from_settings(settings: &SourceSettings) -> PlannerResult<Box<dyn TargetSource>> {
    if let Some(path) = &settings.path {
        return Ok(Box::new(FileTargetSource::new(path.clone())));
    }

    match &settings.url {
        #[cfg(feature = "http-source")]
        Some(url) => {
            let timeout = std::time::Duration::from_secs(settings.timeout_secs);
            Ok(Box::new(HttpTargetSource::new(url.clone(), timeout)?))
        }
        #[cfg(not(feature = "http-source"))]
        Some(url) => Err(PlannerError::ConfigurationError(format!(
            "source url '{}' requires the http-source feature",
            url
        ))),
        None => Err(PlannerError::ConfigurationError(
            "no target source configured: set source.path or source.url \
             (or LOOK_SOURCE_PATH / LOOK_SOURCE_URL)"
                .to_string(),
        )),
    }
}
