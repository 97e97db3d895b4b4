// ── Plaintext scrubbing ──
//
// Decrypted configuration that has to touch disk (e.g. for an editor) lives
// in a `ScrubbedTempFile`. Dropping the guard overwrites the file with
// random bytes before it is removed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use rand::RngCore;
use rand::rngs::OsRng;
use tempfile::NamedTempFile;

use crate::error::ConfigError;

/// Overwrite `path` with random bytes of the same length, then delete it.
pub fn scrub_file(path: &Path) -> Result<(), ConfigError> {
    let len = std::fs::metadata(path)?.len();
    let mut noise = vec![0_u8; usize::try_from(len).unwrap_or(usize::MAX)];
    OsRng.fill_bytes(&mut noise);

    let mut file = OpenOptions::new().write(true).truncate(false).open(path)?;
    file.write_all(&noise)?;
    file.sync_all()?;
    drop(file);

    std::fs::remove_file(path)?;
    Ok(())
}

/// Temporary plaintext file that is scrubbed on drop.
///
/// Created with owner-only permissions in the requested directory.
#[derive(Debug)]
pub struct ScrubbedTempFile {
    file: NamedTempFile,
}

impl ScrubbedTempFile {
    /// Write `contents` to a new temp file in `dir`.
    pub fn create_in(dir: &Path, suffix: &str, contents: &[u8]) -> Result<Self, ConfigError> {
        let mut file = tempfile::Builder::new()
            .prefix(".mistly-")
            .suffix(suffix)
            .tempfile_in(dir)?;
        file.write_all(contents)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Current contents (after an editor may have changed them).
    pub fn read(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(std::fs::read(self.path())?)
    }
}

impl Drop for ScrubbedTempFile {
    fn drop(&mut self) {
        let path = self.file.path();
        if !path.exists() {
            return;
        }
        if let Err(e) = scrub_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not scrub plaintext file");
        }
    }
}
