//! Configuration for the `mistly` CLI.
//!
//! TOML (or legacy INI) settings layered through figment (defaults → file
//! → `MIST_*` env), credential resolution (flag → config → keyring), and Fernet encryption
//! at rest for configuration files, compatible with password-derived and
//! key-file keys.

pub mod cipher;
pub mod error;
pub mod scrub;
pub mod settings;

pub use cipher::{
    ConfigCipher, DEFAULT_KEY_FILE, PASSWORD_ENV, create_key_file, decrypt_file,
    decrypt_to_string, decrypted_path, encrypt_file, encrypted_path,
};
pub use error::ConfigError;
pub use scrub::{ScrubbedTempFile, scrub_file};
pub use settings::{
    Config, ConfigFormat, ConfigSource, DEFAULT_CONFIG_PATH, Settings, expand_config_path,
    load_config, parse_config, redacted_toml, resolve_api_token, resolve_config_source,
    sample_config, save_config, store_api_token,
};
