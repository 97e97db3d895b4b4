use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("configuration file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{} is encrypted; a password or key file is required", path.display())]
    CipherRequired { path: PathBuf },

    #[error("decryption failed: {message}")]
    Decryption { message: String },

    #[error("invalid encryption key: {message}")]
    InvalidKey { message: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid INI configuration: {0}")]
    Ini(#[from] ini::ParseError),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}
