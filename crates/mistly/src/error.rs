//! CLI error types with miette diagnostics.
//!
//! Maps API and config errors into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use mistly_config::ConfigError;

/// Exit codes. Clap keeps its own code (2) for usage errors.
pub mod exit_code {
    pub const FAILURE: i32 = 1;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Credentials ──────────────────────────────────────────────────

    #[error("No {what} configured")]
    #[diagnostic(
        code(mistly::missing_credentials),
        help(
            "Pass --token/--org-id, set MIST_API_TOKEN/MIST_ORG_ID, or create a config:\n\
             mistly config create --interactive"
        )
    )]
    MissingCredentials { what: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(mistly::auth_failed),
        help(
            "Check the API token and that it has access to org {org_id}.\n\
             Tokens are managed under Organization > Settings > API Token in the Mist portal."
        )
    )]
    AuthFailed { org_id: String, message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(mistly::api))]
    Api(#[from] mistly_api::Error),

    // ── Reports ──────────────────────────────────────────────────────

    #[error("No report was written")]
    #[diagnostic(
        code(mistly::no_reports),
        help("Every requested format failed; rerun with -v for details.")
    )]
    NothingWritten,

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(mistly::config),
        help(
            "Encrypted configs read MIST_CONFIG_PASSWORD, a --key-file, or\n\
             Resources/encryption.key; otherwise the password is prompted for."
        )
    )]
    Config(#[from] ConfigError),

    #[error("{} already exists", path.display())]
    #[diagnostic(code(mistly::exists), help("Pass --force to overwrite it."))]
    AlreadyExists { path: std::path::PathBuf },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mistly::validation))]
    Validation { field: String, reason: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(mistly::prompt))]
    Prompt(String),

    #[error("Cancelled")]
    #[diagnostic(code(mistly::cancelled))]
    Cancelled,

    #[error("Interrupted")]
    #[diagnostic(code(mistly::interrupted))]
    Interrupted,

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    #[allow(clippy::unused_self)]
    pub fn exit_code(&self) -> i32 {
        exit_code::FAILURE
    }
}
