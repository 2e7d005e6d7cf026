use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use super::defaults::{
    default_branch_name, default_file_extension, default_log_dir, default_timeframe,
};
use super::Endpoints;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "runboard.toml";

/// Prefix for environment overrides, i.e. `RUNBOARD_BRANCH_NAME` or `RUNBOARD_ENDPOINTS__EXECUTE`
pub const ENV_PREFIX: &str = "RUNBOARD";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Serves historical runs with `GET <runs_url>?timeframe=<timeframe>`
    #[serde(default)]
    pub runs_url: Option<String>,

    /// A json file with historical runs, takes precedence over `runs_url`
    #[serde(default)]
    pub runs_file: Option<PathBuf>,

    /// Branch files are fetched from
    #[serde(default = "default_branch_name")]
    pub branch_name: String,

    /// Extension test names are normalized to
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    #[serde(default = "default_timeframe")]
    pub default_timeframe: String,

    #[serde(default = "default_log_dir")]
    log_dir: PathBuf,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runs_url: None,
            runs_file: None,
            branch_name: default_branch_name(),
            file_extension: default_file_extension(),
            default_timeframe: default_timeframe(),
            log_dir: default_log_dir(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Loads the configuration
    ///
    /// Layers, last wins: defaults, the file at `path` (or an optional `runboard.toml` in the
    /// current directory), then `RUNBOARD_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let file = match path {
            Some(path) => ::config::File::from(path).required(true),
            None => ::config::File::with_name(CONFIG_FILE_NAME).required(false),
        };

        ::config::Config::builder()
            .add_source(file)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    #[must_use]
    pub fn log_dir(&self) -> &Path {
        self.log_dir.as_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::DEFAULT_EXECUTE_URL;
    use crate::gateway::EndpointKind;

    #[test]
    fn test_deserialize_toml_with_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.branch_name, "main");
        assert_eq!(config.file_extension, ".py");
        assert_eq!(config.default_timeframe, "today");
        assert_eq!(config.endpoints.url(EndpointKind::Execute), DEFAULT_EXECUTE_URL);
        assert!(config.runs_file.is_none());
    }

    #[test]
    fn test_deserialize_toml() {
        let toml = r#"
            branch_name = "develop"
            runs_url = "http://localhost:8080/runs"

            [endpoints]
            execute = "http://localhost:8080/execute"
            "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.branch_name, "develop");
        assert_eq!(config.runs_url.as_deref(), Some("http://localhost:8080/runs"));
        assert_eq!(
            config.endpoints.url(EndpointKind::Execute),
            "http://localhost:8080/execute"
        );
        assert_eq!(config.endpoints, Endpoints {
            execute: "http://localhost:8080/execute".into(),
            ..Endpoints::default()
        });
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runboard.toml");
        std::fs::write(
            &path,
            "file_extension = \".rb\"\nruns_file = \"runs.json\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.file_extension, ".rb");
        assert_eq!(config.runs_file, Some(PathBuf::from("runs.json")));
        assert_eq!(config.branch_name, "main");
    }

    #[test]
    fn test_load_requires_an_explicit_file_to_exist() {
        let dir = tempfile::tempdir().unwrap();

        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_print_roundtrip_keeps_values() {
        let config = Config::default();
        let printed = toml::to_string_pretty(&config).unwrap();

        assert!(printed.contains("branch_name = \"main\""));
        assert!(printed.contains("[endpoints]"));
    }
}
