//! Clap derive structures for the `mistly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mistly -- endpoint reports from the Juniper Mist cloud
#[derive(Debug, Parser)]
#[command(
    name = "mistly",
    version,
    about = "Generate Mist endpoint reports from the command line",
    long_about = "Joins the Mist device inventory (user MACs) with recent NAC activity\n\
        and writes HTML, CSV, JSON and Excel reports with activity and\n\
        compliance statistics.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Mist API token
    #[arg(long, short = 't', env = "MIST_API_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Organization ID (UUID)
    #[arg(long, short = 'o', env = "MIST_ORG_ID", global = true)]
    pub org_id: Option<String>,

    /// API base URL (e.g. https://api.eu.mist.com)
    #[arg(long, short = 'b', env = "MIST_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Configuration file (bare names resolve under Resources/)
    #[arg(long, env = "MIST_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Key file for encrypted configuration (default: Resources/encryption.key)
    #[arg(long, global = true)]
    pub key_file: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "MIST_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch inventory and NAC activity, then write reports
    #[command(alias = "r")]
    Report(ReportArgs),

    /// Manage the configuration file and its encryption
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Report ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Days of NAC activity to look back (default: from config, else 7)
    #[arg(long, short = 'd', value_parser = clap::value_parser!(u32).range(1..))]
    pub days: Option<u32>,

    /// HTML report theme (default: from config)
    #[arg(long)]
    pub theme: Option<ThemeArg>,

    /// Only NAC activity from this site ID
    #[arg(long, short = 's')]
    pub site: Option<String>,

    /// Only NAC activity of this connection type
    #[arg(long)]
    pub connection_type: Option<ConnectionTypeArg>,

    /// Output formats, comma-separated: html, csv, json, excel
    #[arg(long, short = 'f', value_delimiter = ',', default_value = "html")]
    pub format: Vec<String>,

    /// Directory for report files
    #[arg(long, default_value = "Reports")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Default,
    Sunset,
    Ocean,
    Forest,
    Dark,
    Corporate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectionTypeArg {
    Wired,
    Wireless,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a sample configuration file
    Create {
        /// Prompt for token, org ID and base URL instead of placeholders
        #[arg(long, short = 'i')]
        interactive: bool,

        /// Destination (default: Resources/mist_config.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Encrypt a configuration file
    Encrypt {
        /// Plaintext file (default: Resources/mist_config.toml)
        file: Option<PathBuf>,

        /// Encrypted output (default: <file>.enc)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Scrub the plaintext afterwards without asking
        #[arg(long, conflicts_with = "keep_plaintext")]
        delete_plaintext: bool,

        /// Keep the plaintext without asking
        #[arg(long)]
        keep_plaintext: bool,
    },

    /// Decrypt a configuration file for editing
    Decrypt {
        /// Encrypted file (default: Resources/mist_config.toml.enc)
        file: Option<PathBuf>,

        /// Plaintext output (default: <file> without .enc)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Edit an encrypted configuration in $EDITOR, then re-encrypt it
    Edit {
        /// Encrypted file (default: Resources/mist_config.toml.enc)
        file: Option<PathBuf>,
    },

    /// Generate a random encryption key file
    CreateKey {
        /// Destination (default: Resources/encryption.key)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing key file
        #[arg(long)]
        force: bool,
    },

    /// Display the resolved configuration (token redacted)
    Show,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
