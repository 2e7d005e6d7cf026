use std::path::PathBuf;

use clap::{builder::PossibleValuesParser, Parser};

use crate::{
    config::Config,
    navigation::{normalize_test_name, target_from_location, NavigationError},
    runs::TIMEFRAMES,
};

#[derive(Parser, Debug, Clone)]
#[clap(author, about, version)]
pub struct Args {
    /// Optional path to a config file, `runboard.toml` in the current directory is used if present
    #[arg(short, long)]
    pub config_path: Option<PathBuf>,

    /// Start on the run overview (default) or directly on a single test
    #[arg(short, long, value_enum, default_value_t)]
    pub mode: ModeArgs,

    /// Test file to open, anything after the file extension is ignored
    #[arg(short = 'n', long, conflicts_with = "location")]
    pub test_name: Option<String>,

    /// A location carrying the test file, i.e. `/ViewCode?testName=tests%2Flogin.py`
    #[arg(short, long)]
    pub location: Option<String>,

    /// Timeframe to load runs for
    #[arg(short, long, value_parser = PossibleValuesParser::new(TIMEFRAMES))]
    pub timeframe: Option<String>,

    /// Read runs from a json file instead of the configured source
    #[arg(long)]
    pub runs_file: Option<PathBuf>,

    /// Print the configuration and exit
    #[arg(long)]
    pub print_config: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModeArgs {
    ViewCode,
    #[default]
    TestRuns,
}

impl Args {
    /// Overrides configuration values given on the command line
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(runs_file) = &self.runs_file {
            config.runs_file = Some(runs_file.clone());
        }
        if let Some(timeframe) = &self.timeframe {
            config.default_timeframe.clone_from(timeframe);
        }
    }

    /// The test file to open on start
    ///
    /// View-code mode requires one, the run overview does not.
    pub fn target(&self, extension: &str) -> Result<Option<String>, NavigationError> {
        match (&self.test_name, &self.location) {
            (Some(name), _) => Ok(Some(normalize_test_name(name, extension))),
            (None, Some(location)) => target_from_location(location, extension).map(Some),
            (None, None) if self.mode == ModeArgs::ViewCode => {
                Err(NavigationError::MissingTestName)
            }
            (None, None) => Ok(None),
        }
    }
}
