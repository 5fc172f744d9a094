use anyhow::{Context, Result};
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trivia::config::Config;
use trivia::repository::QuestionRepository;

mod menu;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env().context("Could not load configuration")?;
    info!("Using question bank at {}", config.data_dir.display());

    let repository = QuestionRepository::open(&config.data_dir).with_context(|| {
        format!(
            "Could not open question bank at {}",
            config.data_dir.display()
        )
    })?;

    let stdin = io::stdin();
    let mut menu = menu::Menu::new(repository, config, stdin.lock(), io::stdout());
    menu.run()
}
