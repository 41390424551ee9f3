//! CLI command handlers.

mod config;
mod import;
mod library;
mod settings;

pub use config::run_config_show_command;
pub use import::run_import_command;
pub use library::{
    run_delete_command, run_detail_command, run_download_command, run_list_command,
    run_upload_command,
};
pub use settings::run_settings_command;
