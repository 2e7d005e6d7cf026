use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{RunSourceError, TestRun};

/// Where the list of historical runs comes from
#[async_trait]
pub trait RunSource: std::fmt::Debug + Send + Sync {
    async fn fetch(&self, timeframe: &str) -> Result<Vec<TestRun>, RunSourceError>;
}

/// Reads runs from a json file containing an array of runs
///
/// The file has no notion of time, every timeframe yields all runs.
#[derive(Debug, Clone)]
pub struct FileRunSource {
    path: PathBuf,
}

impl FileRunSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RunSource for FileRunSource {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()), err)]
    async fn fetch(&self, timeframe: &str) -> Result<Vec<TestRun>, RunSourceError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| RunSourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        Ok(serde_json::from_slice(&raw)?)
    }
}

/// Fetches runs with `GET <url>?timeframe=<timeframe>`
#[derive(Debug, Clone)]
pub struct HttpRunSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRunSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl RunSource for HttpRunSource {
    #[tracing::instrument(skip(self), fields(url = %self.url), err)]
    async fn fetch(&self, timeframe: &str) -> Result<Vec<TestRun>, RunSourceError> {
        let runs = self
            .client
            .get(&self.url)
            .query(&[("timeframe", timeframe)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(runs)
    }
}

/// Used when neither a file nor a url is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRunSource;

#[async_trait]
impl RunSource for UnconfiguredRunSource {
    async fn fetch(&self, _timeframe: &str) -> Result<Vec<TestRun>, RunSourceError> {
        Err(RunSourceError::NotConfigured)
    }
}
