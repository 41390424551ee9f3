//! CLI entry point for the literature library client.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use literature_core::library::DEFAULT_PAGE_SIZE;
use literature_core::{ApiClient, HttpEventSource, LibraryStore};
use tracing::debug;

mod app_config;
mod cli;
mod commands;
mod output;
mod terminal;

use app_config::{LoadedConfig, load_default_file_config};
use cli::{Args, Command, ConfigCommand};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let no_color = terminal::is_no_color_requested(&args);
    terminal::init_tracing(terminal::default_level(args.verbose, args.quiet), no_color);
    debug!(verbose = args.verbose, quiet = args.quiet, "CLI arguments parsed");

    let loaded = load_default_file_config()?;
    if let Some(path) = loaded.path.as_ref().filter(|_| loaded.loaded_from_file) {
        debug!(path = %path.display(), "Loaded config file");
    }

    match &args.command {
        Command::Settings(command) => commands::run_settings_command(command),
        Command::Config(ConfigCommand::Show) => {
            commands::run_config_show_command(&loaded, args.base_url.as_deref())
        }
        command => {
            let store = build_store(&loaded, args.base_url.as_deref())?;
            run_library_command(&store, command, &loaded, args.quiet).await
        }
    }
}

fn build_store(loaded: &LoadedConfig, base_url_override: Option<&str>) -> Result<LibraryStore> {
    let mut config = loaded.config.client_config();
    if let Some(base_url) = base_url_override {
        config.base_url = base_url.to_string();
    }
    debug!(base_url = %config.base_url, "Using literature service");

    let api = ApiClient::new(&config).context("Invalid service configuration")?;
    let source = HttpEventSource::new(&config).context("Cannot build progress stream client")?;
    Ok(LibraryStore::new(api, Arc::new(source))
        .with_page_size(loaded.config.page_size.unwrap_or(DEFAULT_PAGE_SIZE)))
}

async fn run_library_command(
    store: &LibraryStore,
    command: &Command,
    loaded: &LoadedConfig,
    quiet: bool,
) -> Result<()> {
    match command {
        Command::List(list) => {
            let default_size = loaded.config.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
            commands::run_list_command(store, list, default_size).await
        }
        Command::Detail { id } => commands::run_detail_command(store, *id).await,
        Command::Delete { id } => commands::run_delete_command(store, *id).await,
        Command::Upload { file } => commands::run_upload_command(store, file).await,
        Command::Download { id, output_dir } => {
            let dir = output_dir
                .clone()
                .or_else(|| loaded.config.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            commands::run_download_command(store, *id, &dir).await
        }
        Command::Import { files, timeout } => {
            let timeout = timeout
                .or(loaded.config.import_timeout_secs)
                .map(Duration::from_secs);
            commands::run_import_command(store, files, timeout, quiet).await
        }
        Command::Settings(_) | Command::Config(_) => Ok(()),
    }
}
