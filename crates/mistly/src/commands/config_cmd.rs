//! Config subcommand handlers.

use std::path::{Path, PathBuf};

use dialoguer::{Input, Select};
use tracing::debug;

use mistly_config::cipher::ENCRYPTED_SUFFIX;
use mistly_config::{
    Config, ConfigError, ConfigFormat, DEFAULT_CONFIG_PATH, DEFAULT_KEY_FILE, ScrubbedTempFile,
    Settings, create_key_file, decrypt_file, decrypt_to_string, encrypt_file, parse_config,
    redacted_toml, sample_config, save_config, scrub_file, store_api_token,
};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util::{self, prompt_err};
use crate::error::CliError;
use crate::output;

const THEMES: &[&str] = &["default", "sunset", "ocean", "forest", "dark", "corporate"];

fn default_encrypted_path() -> String {
    format!("{DEFAULT_CONFIG_PATH}{ENCRYPTED_SUFFIX}")
}

fn refuse_overwrite(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Create ──────────────────────────────────────────────────
        ConfigCommand::Create {
            interactive,
            path,
            force,
        } => {
            let path = util::config_path_or(path.as_deref(), DEFAULT_CONFIG_PATH);
            refuse_overwrite(&path, force)?;

            let cfg = if interactive { wizard()? } else { sample_config() };
            save_config(&path, &cfg)?;

            eprintln!("📁 Configuration written to {}", path.display());
            if !interactive {
                eprintln!("   Edit it with your credentials, then optionally encrypt it:");
                eprintln!("   mistly config encrypt {}", path.display());
            }
            Ok(())
        }

        // ── Encrypt ─────────────────────────────────────────────────
        ConfigCommand::Encrypt {
            file,
            output,
            delete_plaintext,
            keep_plaintext,
        } => {
            let input = util::config_path_or(file.as_deref(), DEFAULT_CONFIG_PATH);
            if !input.exists() {
                return Err(ConfigError::NotFound { path: input }.into());
            }
            let cipher = util::cipher_for(global, !key_file_in_use(global))?;
            let sealed = encrypt_file(&cipher, &input, output.as_deref())?;
            eprintln!("🔒 Encrypted {} → {}", input.display(), sealed.display());

            let delete = if delete_plaintext {
                true
            } else if keep_plaintext || !util::is_interactive() {
                false
            } else {
                util::confirm(&format!("🗑  Delete plaintext file {}?", input.display()), false)?
            };
            if delete {
                scrub_file(&input)?;
                eprintln!("🗑  Scrubbed plaintext {}", input.display());
            }
            Ok(())
        }

        // ── Decrypt ─────────────────────────────────────────────────
        ConfigCommand::Decrypt { file, output } => {
            let input = util::config_path_or(file.as_deref(), &default_encrypted_path());
            let cipher = util::cipher_for(global, false)?;
            let plain = decrypt_file(&cipher, &input, output.as_deref())?;
            eprintln!("🔓 Decrypted {} → {}", input.display(), plain.display());
            eprintln!("⚠️  Remember to re-encrypt after editing: mistly config encrypt");
            Ok(())
        }

        // ── Edit ────────────────────────────────────────────────────
        ConfigCommand::Edit { file } => {
            let input = util::config_path_or(file.as_deref(), &default_encrypted_path());
            let cipher = util::cipher_for(global, false)?;
            edit_encrypted(&input, &cipher).await
        }

        // ── Create key ──────────────────────────────────────────────
        ConfigCommand::CreateKey { path, force } => {
            let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE));
            refuse_overwrite(&path, force)?;
            create_key_file(&path)?;
            eprintln!("🔑 Created encryption key file: {}", path.display());
            eprintln!("⚠️  Keep this file secure; it is needed to decrypt your configs.");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let (mut cfg, source) = util::load_settings(global)?;
            util::apply_overrides(&mut cfg, global);
            match source {
                Some(ref s) => eprintln!("📋 Source: {}", s.path().display()),
                None => eprintln!("📋 No configuration file found; showing defaults"),
            }
            output::print_output(redacted_toml(&cfg)?.trim_end(), global.quiet);
            Ok(())
        }
    }
}

fn key_file_in_use(global: &GlobalOpts) -> bool {
    global.key_file.is_some() || Path::new(DEFAULT_KEY_FILE).exists()
}

// ── Interactive wizard ──────────────────────────────────────────────

fn wizard() -> Result<Config, CliError> {
    eprintln!("✨ mistly configuration wizard\n");

    let token = util::prompt_token()?;
    let org_id = util::prompt_org_id()?;
    let base_url = util::prompt_base_url()?;

    let theme = Select::new()
        .with_prompt("🎨 Report theme")
        .items(THEMES)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let days: u32 = Input::new()
        .with_prompt("📅 Days of NAC activity")
        .default(7)
        .validate_with(|d: &u32| if *d > 0 { Ok(()) } else { Err("must be at least 1") })
        .interact_text()
        .map_err(prompt_err)?;

    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store = Select::new()
        .with_prompt("Where to store the API token?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let api_token = if store == 0 {
        store_api_token(&org_id, &token)?;
        eprintln!("   ✓ API token stored in system keyring");
        None
    } else {
        Some(token)
    };

    Ok(Config {
        mist: Settings {
            api_token,
            org_id: Some(org_id),
            base_url,
            theme: THEMES.get(theme).copied().unwrap_or("default").to_owned(),
            days,
        },
    })
}

// ── Edit flow ───────────────────────────────────────────────────────

/// Decrypt into a scrubbed temp file, run the editor, validate, re-encrypt.
///
/// Ctrl-C reaches the editor through the terminal; this process keeps
/// waiting so the plaintext copy is always scrubbed.
async fn edit_encrypted(path: &Path, cipher: &mistly_config::ConfigCipher) -> Result<(), CliError> {
    let original = decrypt_to_string(cipher, path)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let format = ConfigFormat::of(path);
    let suffix = match format {
        ConfigFormat::Toml => ".toml",
        ConfigFormat::Ini => ".ini",
    };
    let scratch = ScrubbedTempFile::create_in(dir, suffix, original.as_bytes())?;

    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".into());
    let mut words = editor.split_whitespace();
    let program = words.next().unwrap_or("vi");
    let mut child = tokio::process::Command::new(program)
        .args(words)
        .arg(scratch.path())
        .spawn()?;
    let status = loop {
        tokio::select! {
            status = child.wait() => break status?,
            Ok(()) = tokio::signal::ctrl_c() => debug!("interrupted; waiting for the editor"),
        }
    };
    if !status.success() {
        return Err(CliError::Validation {
            field: "editor".into(),
            reason: format!("{editor} exited with {status}; nothing saved"),
        });
    }

    let edited = scratch.read()?;
    if edited == original.as_bytes() {
        eprintln!("No changes; {} left as is", path.display());
        return Ok(());
    }
    let text = String::from_utf8(edited).map_err(|_| CliError::Validation {
        field: "config".into(),
        reason: "edited file is not UTF-8; nothing saved".into(),
    })?;
    parse_config(&text, format)?;

    encrypt_file(cipher, scratch.path(), Some(path))?;
    eprintln!("🔒 Saved and re-encrypted {}", path.display());
    Ok(())
}
