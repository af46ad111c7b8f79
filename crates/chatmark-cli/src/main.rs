use anyhow::Result;
use chatmark_core::{constants::defaults, Settings};
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod input;
mod theme;

use cli::Cli;

/// The TUI owns the terminal, so in that mode logs go to a file in the
/// settings directory instead of stderr.
fn init_tracing(to_file: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if !to_file {
        builder.with_writer(std::io::stderr).init();
        return;
    }

    let dir = Settings::config_dir();
    let file = std::fs::create_dir_all(&dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(defaults::LOG_FILE))
    });
    match file {
        Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        Err(_) => builder.with_writer(std::io::sink).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.prompt.is_none());

    let mut settings = Settings::load();
    cli.apply(&mut settings)?;
    let options = cli.session_options();
    tracing::debug!(
        provider = %settings.llm.provider,
        model = %settings.llm.model,
        "settings resolved"
    );

    if let Some(ref prompt) = cli.prompt {
        app::run_single_prompt(&settings, &options, prompt, cli.export).await?;
    } else {
        app::run_tui(settings, options).await?;
    }

    Ok(())
}
