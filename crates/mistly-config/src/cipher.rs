// ── Encryption at rest ──
//
// Fernet tokens, keyed either from a master password or from a key file.
//
// Password mode: `salt (16 bytes) ‖ token`, key = PBKDF2-HMAC-SHA256
// (100 000 rounds, 32 bytes) of the password, URL-safe base64.
// Key-file mode: `token` only, key = SHA-256 of the key file contents.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use rand::RngCore;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Salt length prepended to password-mode files.
pub const SALT_LEN: usize = 16;

/// PBKDF2 rounds for password-derived keys.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Size of a freshly generated key file.
pub const KEY_FILE_LEN: usize = 64;

/// Environment variable holding the master password.
pub const PASSWORD_ENV: &str = "MIST_CONFIG_PASSWORD";

/// Suffix of encrypted configuration files.
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// Key file picked up automatically when present.
pub const DEFAULT_KEY_FILE: &str = "Resources/encryption.key";

/// How configuration files are keyed.
#[derive(Debug, Clone)]
pub enum ConfigCipher {
    Password(SecretString),
    KeyFile(PathBuf),
}

impl ConfigCipher {
    /// Password cipher from [`PASSWORD_ENV`], if set and non-empty.
    pub fn from_env() -> Option<Self> {
        std::env::var(PASSWORD_ENV)
            .ok()
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty())
            .map(|p| Self::Password(SecretString::from(p)))
    }

    /// Cipher available without prompting: an explicit key file, then
    /// [`DEFAULT_KEY_FILE`] if it exists, then [`PASSWORD_ENV`].
    pub fn discover(key_file: Option<&Path>) -> Option<Self> {
        if let Some(path) = key_file {
            return Some(Self::KeyFile(path.to_path_buf()));
        }
        let default = Path::new(DEFAULT_KEY_FILE);
        if default.exists() {
            debug!("using default key file");
            return Some(Self::KeyFile(default.to_path_buf()));
        }
        Self::from_env()
    }

    pub fn is_key_file(&self) -> bool {
        matches!(self, Self::KeyFile(_))
    }

    /// Encrypt `plaintext` into the on-disk layout for this mode.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, ConfigError> {
        match self {
            Self::Password(password) => {
                let mut salt = [0_u8; SALT_LEN];
                OsRng.fill_bytes(&mut salt);
                let token = fernet_for(&password_key(password, &salt))?.encrypt(plaintext);

                let mut out = Vec::with_capacity(SALT_LEN + token.len());
                out.extend_from_slice(&salt);
                out.extend_from_slice(token.as_bytes());
                Ok(out)
            }
            Self::KeyFile(path) => {
                let token = fernet_for(&key_file_key(path)?)?.encrypt(plaintext);
                Ok(token.into_bytes())
            }
        }
    }

    /// Decrypt bytes produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, ConfigError> {
        let (key, token) = match self {
            Self::Password(password) => {
                if data.len() <= SALT_LEN {
                    return Err(ConfigError::Decryption {
                        message: "file is too short to contain a salt and token".into(),
                    });
                }
                let (salt, token) = data.split_at(SALT_LEN);
                (password_key(password, salt), token)
            }
            Self::KeyFile(path) => (key_file_key(path)?, data),
        };

        let token = std::str::from_utf8(token)
            .map_err(|_| ConfigError::Decryption {
                message: "token is not valid text".into(),
            })?
            .trim();
        fernet_for(&key)?
            .decrypt(token)
            .map_err(|_| ConfigError::Decryption {
                message: "wrong password or key file, or the file is corrupted".into(),
            })
    }
}

fn password_key(password: &SecretString, salt: &[u8]) -> String {
    let mut key = [0_u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(
        password.expose_secret().as_bytes(),
        salt,
        PBKDF2_ROUNDS,
        &mut key,
    );
    URL_SAFE.encode(key)
}

fn key_file_key(path: &Path) -> Result<String, ConfigError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io(e),
    })?;
    Ok(URL_SAFE.encode(Sha256::digest(&bytes)))
}

fn fernet_for(key: &str) -> Result<fernet::Fernet, ConfigError> {
    fernet::Fernet::new(key).ok_or_else(|| ConfigError::InvalidKey {
        message: "derived key is not a valid Fernet key".into(),
    })
}

// ── File operations ─────────────────────────────────────────────────

/// Default output for [`encrypt_file`]: `<input>.enc`.
pub fn encrypted_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(ENCRYPTED_SUFFIX);
    PathBuf::from(name)
}

/// Default output for [`decrypt_file`]: strip `.enc`, else append `.dec`.
pub fn decrypted_path(input: &Path) -> PathBuf {
    let raw = input.to_string_lossy();
    raw.strip_suffix(ENCRYPTED_SUFFIX).map_or_else(
        || PathBuf::from(format!("{raw}.dec")),
        PathBuf::from,
    )
}

/// Encrypt `input` to `output` (default `<input>.enc`). Returns the output path.
pub fn encrypt_file(
    cipher: &ConfigCipher,
    input: &Path,
    output: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    let plaintext = read_existing(input)?;
    let output = output.map_or_else(|| encrypted_path(input), Path::to_path_buf);
    write_private(&output, &cipher.encrypt(&plaintext)?)?;
    info!(input = %input.display(), output = %output.display(), "encrypted configuration");
    Ok(output)
}

/// Decrypt `input` to `output` (default: `input` without `.enc`).
pub fn decrypt_file(
    cipher: &ConfigCipher,
    input: &Path,
    output: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    let plaintext = cipher.decrypt(&read_existing(input)?)?;
    let output = output.map_or_else(|| decrypted_path(input), Path::to_path_buf);
    write_private(&output, &plaintext)?;
    info!(input = %input.display(), output = %output.display(), "decrypted configuration");
    Ok(output)
}

/// Decrypt `path` in memory.
pub fn decrypt_to_string(cipher: &ConfigCipher, path: &Path) -> Result<String, ConfigError> {
    let plaintext = cipher.decrypt(&read_existing(path)?)?;
    debug!(path = %path.display(), "decrypted configuration in memory");
    String::from_utf8(plaintext).map_err(|_| ConfigError::Decryption {
        message: "decrypted configuration is not UTF-8".into(),
    })
}

/// Create a key file of [`KEY_FILE_LEN`] random bytes, owner-only.
pub fn create_key_file(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut key = [0_u8; KEY_FILE_LEN];
    OsRng.fill_bytes(&mut key);
    write_private(path, &key)?;
    info!(path = %path.display(), "created encryption key file");
    Ok(())
}

fn read_existing(path: &Path) -> Result<Vec<u8>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read(path)?)
}

/// Replace `path` with an owner-only file via rename, so readers see
/// either the old contents or the new ones.
fn write_private(path: &Path, bytes: &[u8]) -> Result<(), ConfigError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new().prefix(".mistly-").tempfile_in(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ConfigError::Io(e.error))?;
    Ok(())
}
