//! Settings command handlers: show and edit stored AI-provider keys.

use anyhow::{Result, anyhow};
use literature_core::{PersistOutcome, SettingsStore};
use tracing::warn;

use crate::cli::SettingsCommand;
use crate::output::mask_key;

pub fn run_settings_command(command: &SettingsCommand) -> Result<()> {
    let mut store = SettingsStore::open_default()
        .ok_or_else(|| anyhow!("unable to determine config directory (set XDG_CONFIG_HOME or HOME)"))?;

    let outcome = match command {
        SettingsCommand::Show => {
            show(&store);
            return Ok(());
        }
        SettingsCommand::SetKey { provider, key } => {
            if provider.is_empty() {
                println!("Provider name must not be empty; nothing changed.");
            }
            store.set_api_key(provider, key)
        }
        SettingsCommand::RemoveKey { provider } => store.remove_api_key(provider),
        SettingsCommand::Use { provider } => store.set_active_provider(provider),
    };
    report(&outcome);
    Ok(())
}

fn show(store: &SettingsStore) {
    println!("settings_path = {}", store.path().display());
    let active = &store.settings().active_ai_provider;
    println!(
        "active_provider = {}",
        if active.is_empty() { "<none>" } else { active }
    );
    let providers = store.list_providers();
    if providers.is_empty() {
        println!("No API keys stored.");
    }
    for provider in providers {
        let key = store
            .settings()
            .api_keys
            .get(provider)
            .map_or("", String::as_str);
        println!("{provider} = {}", mask_key(key));
    }
}

// Persistence failures are reported but never fail the command.
fn report(outcome: &PersistOutcome) {
    match outcome {
        PersistOutcome::Saved(path) => println!("Saved {}", path.display()),
        PersistOutcome::Unchanged => println!("No changes."),
        PersistOutcome::Failed { path, reason } => {
            warn!(path = %path.display(), %reason, "Settings change kept for this run only");
        }
    }
}
