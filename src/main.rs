use std::io::{self, stdout};
use std::panic::{set_hook, take_hook};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use runboard::{
    cli::Args,
    commands::CommandHandler,
    config::Config,
    frontend::App,
    gateway::HttpGateway,
    runboard_tracing,
    runs::{FileRunSource, HttpRunSource, RunSource, UnconfiguredRunSource},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config_path.as_deref())?;
    args.apply_to(&mut config);

    if args.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    // Resolved before the terminal is taken over so mistakes end up on stderr
    let target = args.target(&config.file_extension)?;

    runboard_tracing::init(&config).context("Failed to initialize logging")?;

    start_tui(&config, target).await
}

fn run_source(config: &Config) -> Arc<dyn RunSource> {
    match (&config.runs_file, &config.runs_url) {
        (Some(path), _) => Arc::new(FileRunSource::new(path)),
        (None, Some(url)) => Arc::new(HttpRunSource::new(url)),
        (None, None) => Arc::new(UnconfiguredRunSource),
    }
}

#[tracing::instrument(skip_all)]
async fn start_tui(config: &Config, target: Option<String>) -> Result<()> {
    tracing::info!("Loaded configuration: {:?}", config);

    let gateway = Arc::new(HttpGateway::new(config.endpoints.clone()));
    let mut handler = CommandHandler::new(gateway, run_source(config));

    let mut app = App::new(config);
    handler.register_ui(&mut app);
    let backend = handler.start();

    if let Some(target) = target {
        app.open_session(target);
    }

    let mut terminal = init_tui()?;
    let app_result = app.run(&mut terminal).await;

    restore_tui()?;
    terminal.show_cursor()?;

    backend.await.context("Backend panicked")?;

    if let Err(error) = &app_result {
        tracing::error!(?error, "Application error");
    } else {
        tracing::info!("Runboard exited cleanly");
    }

    app_result
}

pub fn init_tui() -> io::Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    init_panic_hook();
    Terminal::new(CrosstermBackend::new(stdout()))
}

fn init_panic_hook() {
    let original_hook = take_hook();
    set_hook(Box::new(move |panic_info| {
        // intentionally ignore errors here since we're already in a panic
        let _ = restore_tui();
        original_hook(panic_info);
    }));
}

pub fn restore_tui() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)
}
