//! Shared helpers for command handlers: prompts and config loading.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input};
use secrecy::SecretString;

use mistly_config::settings::DEFAULT_BASE_URL;
use mistly_config::{
    Config, ConfigCipher, ConfigSource, PASSWORD_ENV, expand_config_path, load_config,
    resolve_config_source,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// True when prompts can be shown.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

/// Explicit path with bare names under `Resources/`, or `default`.
pub fn config_path_or(path: Option<&Path>, default: &str) -> PathBuf {
    path.map_or_else(|| PathBuf::from(default), expand_config_path)
}

pub fn confirm(message: &str, default: bool) -> Result<bool, CliError> {
    Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()
        .map_err(prompt_err)
}

// ── Credential prompts ──────────────────────────────────────────────

pub fn prompt_token() -> Result<String, CliError> {
    eprintln!("📋 Mist API token");
    eprintln!("   Create one in the Mist portal under Organization → Settings → API Token.");
    let token = rpassword::prompt_password("🔑 API token (input hidden): ").map_err(prompt_err)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "api_token".into(),
            reason: "API token is required".into(),
        });
    }
    Ok(token.to_owned())
}

pub fn prompt_org_id() -> Result<String, CliError> {
    eprintln!("🏢 Organization ID");
    eprintln!("   Shown in the portal URL after 'org_id=', e.g. 12345678-1234-1234-1234-123456789abc");
    let org_id: String = Input::new()
        .with_prompt("🆔 Organization ID")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let org_id = org_id.trim().to_owned();
    if org_id.is_empty() {
        return Err(CliError::Validation {
            field: "org_id".into(),
            reason: "organization ID is required".into(),
        });
    }
    if !looks_like_uuid(&org_id) {
        eprintln!("⚠️  Organization ID doesn't look like a UUID");
        if !confirm("Continue anyway?", false)? {
            return Err(CliError::Cancelled);
        }
    }
    Ok(org_id)
}

pub fn prompt_base_url() -> Result<String, CliError> {
    eprintln!("🌐 API base URL");
    eprintln!("   Other regions: https://api.eu.mist.com, https://api.ac2.mist.com, ...");
    let url: String = Input::new()
        .with_prompt("🔗 Base URL")
        .default(DEFAULT_BASE_URL.to_owned())
        .interact_text()
        .map_err(prompt_err)?;
    Ok(normalize_base_url(&url))
}

/// 36 characters with four dashes.
pub fn looks_like_uuid(value: &str) -> bool {
    value.len() == 36 && value.matches('-').count() == 4
}

/// Trim whitespace and trailing slashes; empty means the default.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_BASE_URL.to_owned()
    } else {
        trimmed.to_owned()
    }
}

// ── Encrypted configuration ─────────────────────────────────────────

fn prompt_password(confirm_entry: bool) -> Result<SecretString, CliError> {
    eprintln!("🔐 Configuration files are encrypted");
    let password = rpassword::prompt_password("🔑 Master password: ").map_err(prompt_err)?;
    let password = password.trim().to_owned();
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "master password cannot be empty".into(),
        });
    }
    if confirm_entry {
        let again = rpassword::prompt_password("🔑 Confirm master password: ").map_err(prompt_err)?;
        if again.trim() != password {
            return Err(CliError::Validation {
                field: "password".into(),
                reason: "passwords do not match".into(),
            });
        }
    }
    Ok(SecretString::from(password))
}

/// Key file, `MIST_CONFIG_PASSWORD`, or an interactive password prompt.
pub fn cipher_for(global: &GlobalOpts, confirm_entry: bool) -> Result<ConfigCipher, CliError> {
    if let Some(cipher) = ConfigCipher::discover(global.key_file.as_deref()) {
        if let ConfigCipher::KeyFile(ref path) = cipher {
            tracing::info!(path = %path.display(), "using encryption key file");
        }
        return Ok(cipher);
    }
    if !is_interactive() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: format!("no terminal to prompt on; set {PASSWORD_ENV} or pass --key-file"),
        });
    }
    prompt_password(confirm_entry).map(ConfigCipher::Password)
}

/// Resolve and load the configuration, decrypting it when needed.
pub fn load_settings(global: &GlobalOpts) -> Result<(Config, Option<ConfigSource>), CliError> {
    let source = resolve_config_source(global.config.as_deref())?;
    let cipher = match source {
        Some(ConfigSource::Encrypted(_)) => Some(cipher_for(global, false)?),
        _ => None,
    };
    let config = load_config(source.as_ref(), cipher.as_ref())?;
    Ok((config, source))
}

/// Apply `--token`, `--org-id` and `--base-url` on top of loaded settings.
pub fn apply_overrides(config: &mut Config, global: &GlobalOpts) {
    let mist = &mut config.mist;
    if let Some(token) = global.token.as_deref().filter(|t| !t.is_empty()) {
        mist.api_token = Some(token.to_owned());
    }
    if let Some(org_id) = global.org_id.as_deref().filter(|o| !o.is_empty()) {
        mist.org_id = Some(org_id.to_owned());
    }
    if let Some(ref base_url) = global.base_url {
        mist.base_url = normalize_base_url(base_url);
    }
}
