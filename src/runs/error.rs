use std::path::PathBuf;

use crate::gateway::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("run {0} is not a json object")]
    NotAnObject(String),
    #[error("could not merge the result into run {run_id}: {source}")]
    Decode {
        run_id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no run with id {0}")]
    UnknownRun(String),
}

/// A single failed re-run within a batch
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("re-running {run_id} failed: {source}")]
    Remote {
        run_id: String,
        #[source]
        source: GatewayError,
    },
    #[error(transparent)]
    Merge(#[from] MergeError),
}

#[derive(Debug, thiserror::Error)]
pub enum RunSourceError {
    #[error("failed to read runs from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode runs: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to fetch runs: {0}")]
    Remote(#[from] reqwest::Error),
    #[error("no run source configured, set `runs_file` or `runs_url`")]
    NotConfigured,
}
