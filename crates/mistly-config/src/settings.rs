use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use ini::{Ini, ParseOption};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cipher::{self, ConfigCipher, ENCRYPTED_SUFFIX};
use crate::error::ConfigError;

// ── Locations ───────────────────────────────────────────────────────

/// Directory that holds configuration and key material.
pub const RESOURCES_DIR: &str = "Resources";

/// Default configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "Resources/mist_config.toml";

/// INI configuration written by earlier releases.
pub const LEGACY_CONFIG_PATH: &str = "Resources/mist_config.ini";

/// Tried in order when the default file is absent.
pub const FALLBACK_CONFIG_PATHS: &[&str] = &[
    LEGACY_CONFIG_PATH,
    "mist_config.toml",
    "mist_config.ini",
    "config.toml",
    "config.ini",
];

pub const DEFAULT_BASE_URL: &str = "https://api.mist.com";
pub const DEFAULT_THEME: &str = "default";
pub const DEFAULT_DAYS: u32 = 7;

const KEYRING_SERVICE: &str = "mistly";
const ENV_KEYS: &[&str] = &["api_token", "org_id", "base_url", "theme", "days"];
const INI_SECTION: &str = "mist";

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub mist: Settings,
}

/// The `[mist]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// API token (plaintext; prefer the keyring or an encrypted file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Report theme name.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// NAC lookback window in days.
    #[serde(default = "default_days")]
    pub days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_token: None,
            org_id: None,
            base_url: default_base_url(),
            theme: default_theme(),
            days: default_days(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_theme() -> String {
    DEFAULT_THEME.into()
}
fn default_days() -> u32 {
    DEFAULT_DAYS
}

/// Placeholder file written by `config create`.
pub fn sample_config() -> Config {
    Config {
        mist: Settings {
            api_token: Some("your_api_token_here".into()),
            org_id: Some("your_org_id_here".into()),
            ..Settings::default()
        },
    }
}

// ── File formats ────────────────────────────────────────────────────

/// On-disk syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    /// `[mist]` section with bare `key = value` lines.
    Ini,
}

impl ConfigFormat {
    /// `.ini` (optionally followed by `.enc`) is INI; anything else is TOML.
    pub fn of(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let name = name.strip_suffix(ENCRYPTED_SUFFIX).unwrap_or(&name);
        if name.ends_with(".ini") {
            Self::Ini
        } else {
            Self::Toml
        }
    }
}

// ── Source resolution ───────────────────────────────────────────────

/// Where the configuration will be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Plain(PathBuf),
    Encrypted(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Plain(p) | Self::Encrypted(p) => p,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }

    pub fn format(&self) -> ConfigFormat {
        ConfigFormat::of(self.path())
    }
}

/// A bare file name (no directory part) lives under [`RESOURCES_DIR`].
pub fn expand_config_path(path: &Path) -> PathBuf {
    let bare = path
        .parent()
        .is_none_or(|parent| parent.as_os_str().is_empty());
    if bare && !path.as_os_str().is_empty() {
        Path::new(RESOURCES_DIR).join(path)
    } else {
        path.to_path_buf()
    }
}

fn classify(path: &Path) -> Option<ConfigSource> {
    if path.to_string_lossy().ends_with(ENCRYPTED_SUFFIX) {
        return path
            .exists()
            .then(|| ConfigSource::Encrypted(path.to_path_buf()));
    }
    let sibling = cipher::encrypted_path(path);
    if sibling.exists() {
        return Some(ConfigSource::Encrypted(sibling));
    }
    path.exists().then(|| ConfigSource::Plain(path.to_path_buf()))
}

/// Find the configuration file to load.
///
/// An explicit path must exist (directly or as an encrypted sibling).
/// Without one, the default location and then the fallbacks are tried;
/// `Ok(None)` means nothing was found and defaults apply.
pub fn resolve_config_source(explicit: Option<&Path>) -> Result<Option<ConfigSource>, ConfigError> {
    if let Some(path) = explicit {
        let path = expand_config_path(path);
        return classify(&path)
            .map(Some)
            .ok_or(ConfigError::NotFound { path });
    }

    let found = std::iter::once(DEFAULT_CONFIG_PATH)
        .chain(FALLBACK_CONFIG_PATHS.iter().copied())
        .find_map(|candidate| classify(Path::new(candidate)));
    if let Some(ref source) = found {
        debug!(path = %source.path().display(), encrypted = source.is_encrypted(), "resolved config source");
    }
    Ok(found)
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load configuration: defaults, then the file (decrypted if needed),
/// then `MIST_*` environment overrides.
pub fn load_config(
    source: Option<&ConfigSource>,
    cipher: Option<&ConfigCipher>,
) -> Result<Config, ConfigError> {
    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

    match source {
        Some(ConfigSource::Plain(path)) => {
            info!(path = %path.display(), "loading configuration");
            figment = match ConfigFormat::of(path) {
                ConfigFormat::Toml => figment.merge(Toml::file(path)),
                ConfigFormat::Ini => {
                    let text = std::fs::read_to_string(path)?;
                    figment.merge(Serialized::defaults(parse_ini(&text)?))
                }
            };
        }
        Some(ConfigSource::Encrypted(path)) => {
            let cipher = cipher.ok_or_else(|| ConfigError::CipherRequired { path: path.clone() })?;
            let plaintext = cipher::decrypt_to_string(cipher, path)?;
            info!(path = %path.display(), "loaded encrypted configuration");
            figment = match ConfigFormat::of(path) {
                ConfigFormat::Toml => figment.merge(Toml::string(&plaintext)),
                ConfigFormat::Ini => figment.merge(Serialized::defaults(parse_ini(&plaintext)?)),
            };
        }
        None => debug!("no configuration file; using defaults"),
    }

    let figment = figment.merge(
        Env::prefixed("MIST_")
            .only(ENV_KEYS)
            .map(|key| format!("mist.{key}").into()),
    );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Parse configuration text without layering defaults or environment.
pub fn parse_config(text: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    match format {
        ConfigFormat::Toml => Ok(toml::from_str(text)?),
        ConfigFormat::Ini => parse_ini(text),
    }
}

/// Values are taken verbatim: no quote stripping, no escapes.
/// Keys are case-insensitive; unknown keys are ignored.
fn parse_ini(text: &str) -> Result<Config, ConfigError> {
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(text, options)?;
    let mut settings = Settings::default();
    let Some(section) = ini.section(Some(INI_SECTION)) else {
        debug!("no [mist] section in INI configuration");
        return Ok(Config { mist: settings });
    };

    for (key, value) in section.iter() {
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "api_token" => settings.api_token = Some(value.to_owned()),
            "org_id" => settings.org_id = Some(value.to_owned()),
            "base_url" => settings.base_url = value.to_owned(),
            "theme" => settings.theme = value.to_owned(),
            "days" => {
                settings.days = value.parse().map_err(|_| ConfigError::Validation {
                    field: "days".into(),
                    reason: format!("expected a whole number, got {value:?}"),
                })?;
            }
            other => debug!(key = other, "ignoring unknown INI key"),
        }
    }
    Ok(Config { mist: settings })
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Render config as TOML with the token masked.
pub fn redacted_toml(cfg: &Config) -> Result<String, ConfigError> {
    let mut shown = cfg.clone();
    if let Some(ref mut token) = shown.mist.api_token {
        *token = redact(token);
    }
    Ok(toml::to_string_pretty(&shown)?)
}

fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "********".into();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("********{tail}")
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API token: flag, then config/env, then the system keyring.
pub fn resolve_api_token(flag: Option<&str>, settings: &Settings) -> Option<SecretString> {
    // 1. Explicit flag
    if let Some(token) = flag.filter(|t| !t.is_empty()) {
        return Some(SecretString::from(token.to_owned()));
    }

    // 2. Config file / MIST_API_TOKEN
    if let Some(ref token) = settings.api_token {
        if !token.is_empty() {
            return Some(SecretString::from(token.clone()));
        }
    }

    // 3. System keyring
    let org_id = settings.org_id.as_deref()?;
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(org_id)) {
        if let Ok(secret) = entry.get_password() {
            debug!("API token read from system keyring");
            return Some(SecretString::from(secret));
        }
    }
    None
}

/// Store the API token for `org_id` in the system keyring.
pub fn store_api_token(org_id: &str, token: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(org_id))?.set_password(token)?;
    Ok(())
}

fn keyring_user(org_id: &str) -> String {
    format!("{org_id}/api-token")
}
