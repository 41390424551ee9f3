//! Config command handlers: show effective configuration.

use anyhow::Result;
use literature_core::library::DEFAULT_PAGE_SIZE;

use crate::app_config::LoadedConfig;
use crate::output::mask_key;

pub fn run_config_show_command(loaded: &LoadedConfig, base_url_override: Option<&str>) -> Result<()> {
    let mut client = loaded.config.client_config();
    if let Some(base_url) = base_url_override {
        client.base_url = base_url.to_string();
    }

    let resolved_path = loaded.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded.loaded_from_file {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    println!("base_url = {}", client.base_url);
    println!(
        "page_size = {}",
        loaded.config.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    );
    println!("connect_timeout_secs = {}", client.connect_timeout.as_secs());
    println!("request_timeout_secs = {}", client.request_timeout.as_secs());
    println!(
        "import_timeout_secs = {}",
        loaded
            .config
            .import_timeout_secs
            .map_or_else(|| "none".to_string(), |secs| secs.to_string())
    );
    println!(
        "output_dir = {}",
        loaded
            .config
            .output_dir
            .as_ref()
            .map_or_else(|| ".".to_string(), |dir| dir.display().to_string())
    );
    if let Some(settings) = literature_core::SettingsStore::open_default() {
        let active = &settings.settings().active_ai_provider;
        if !active.is_empty() {
            println!("active_ai_provider = {active} ({})", mask_key(settings.active_key()));
        }
    }

    Ok(())
}
