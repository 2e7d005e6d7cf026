use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// File the daily rolling appender writes to, suffixed with the date
pub const LOG_FILE_PREFIX: &str = "runboard.log";

/// Logs to a daily rolling file in the configured log dir and to the in-app log view
///
/// `RUST_LOG` overrides the file filter.
pub fn init(config: &Config) -> Result<()> {
    let file_appender = tracing_appender::rolling::daily(config.log_dir(), LOG_FILE_PREFIX);
    let fmt_layer = fmt::layer().with_ansi(false).with_writer(file_appender);

    let env_filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
        .add_directive("h2=error".parse()?)
        .add_directive("hyper_util=error".parse()?)
        .add_directive("reqwest=warn".parse()?);

    // The log level tui logger will capture
    let default_level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let tui_layer = tui_logger::tracing_subscriber_layer();
    tui_logger::init_logger(default_level)?;

    tracing_subscriber::registry()
        .with(env_filter_layer)
        .with(vec![tui_layer.boxed(), fmt_layer.boxed()])
        .try_init()?;

    Ok(())
}
