//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Manage a personal literature library.
///
/// Lists, filters, uploads, downloads and batch-imports documents stored by
/// a remote literature service.
#[derive(Parser, Debug)]
#[command(name = "literature")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored log output (also honors NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Base URL of the literature service (overrides the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List documents, one page at a time
    List(ListArgs),

    /// Show one document's details
    Detail {
        /// Document id
        id: i64,
    },

    /// Delete a document
    Delete {
        /// Document id
        id: i64,
    },

    /// Upload a single document
    Upload {
        /// File to upload
        file: PathBuf,
    },

    /// Download a document's original file
    Download {
        /// Document id
        id: i64,

        /// Directory to save into (default: config `output_dir`, else the current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Import several documents as one job and follow its progress
    Import {
        /// Files to import (1-16)
        #[arg(required = true, num_args = 1..=16)]
        files: Vec<PathBuf>,

        /// Give up if the job has not finished after this many seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=86_400))]
        timeout: Option<u64>,
    },

    /// Manage stored AI-provider keys
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Page size (1-100; default from config, else 10)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub size: Option<u32>,

    /// Filter by category
    #[arg(long)]
    pub category: Option<String>,

    /// Filter by description text
    #[arg(long)]
    pub description: Option<String>,

    /// Filter by reading-guide text
    #[arg(long)]
    pub reading_guide: Option<String>,

    /// Filter by tag
    #[arg(long)]
    pub tags: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show providers and the active one (keys are masked)
    Show,

    /// Store an API key for a provider
    SetKey { provider: String, key: String },

    /// Remove a provider's API key
    RemoveKey { provider: String },

    /// Make a provider active (empty string deactivates)
    Use { provider: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
}
