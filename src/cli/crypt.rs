//! Document commands: encrypt, decrypt, detect, open, save.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroize;

use crate::cli::{output, Session};
use crate::core::editor::{is_encrypted_path, SaveAction};
use crate::error::{Error, Result};

/// Per-run overrides for `encrypt`.
#[derive(Debug, Default)]
pub struct EncryptArgs {
    pub key: Option<String>,
    pub to: Option<String>,
    pub binary: bool,
    pub symmetric: bool,
    pub output: Option<PathBuf>,
}

/// Default output path: `<file>.asc`, or `<file>.gpg` for binary output.
pub fn encrypted_path(file: &Path, armor: bool) -> PathBuf {
    let ext = if armor { "asc" } else { "gpg" };
    let mut name = file.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn write_stdout(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()
}

/// Encrypt a file.
pub fn encrypt(mut session: Session, file: &Path, args: EncryptArgs) -> Result<()> {
    let mut text = std::fs::read(file)?;
    let editor = &mut session.editor;

    if let Some(fingerprint) = &args.key {
        editor.refresh_keys()?;
        editor.select_key(fingerprint)?;
    }
    {
        let settings = editor.settings_mut();
        if let Some(to) = args.to {
            settings.selection.mail_address = to;
        }
        if args.binary {
            settings.options.ascii_armor = false;
        }
        if args.symmetric {
            settings.options.symmetric = true;
        }
    }

    let armor = editor.settings().options.ascii_armor;
    let result = editor.encrypt_document(&text);
    text.zeroize();
    let ciphertext = result?.into_output()?;

    let target = args.output.unwrap_or_else(|| encrypted_path(file, armor));
    std::fs::write(&target, &ciphertext)?;
    debug!(path = %target.display(), bytes = ciphertext.len(), "ciphertext written");

    output::success(&format!("encrypted {}", output::path(&target.display().to_string())));
    Ok(())
}

/// Decrypt a file to stdout or `output`.
///
/// The key the message was addressed to becomes the stored selection.
pub fn decrypt(
    mut session: Session,
    file: &Path,
    key: Option<String>,
    output_path: Option<PathBuf>,
) -> Result<()> {
    let ciphertext = std::fs::read(file)?;
    let editor = &mut session.editor;

    editor.refresh_keys()?;
    if let Some(fingerprint) = &key {
        editor.select_key(fingerprint)?;
    }

    let mut plaintext = editor.decrypt_document(&ciphertext)?.into_output()?;
    let written = match &output_path {
        Some(path) => std::fs::write(path, &plaintext),
        None => write_stdout(&plaintext),
    };
    plaintext.zeroize();
    written?;

    session.save()?;
    if let Some(path) = output_path {
        output::success(&format!("decrypted to {}", output::path(&path.display().to_string())));
    }
    Ok(())
}

/// Print `encrypted` or `plaintext`.
pub fn detect(session: Session, file: &Path) -> Result<()> {
    let content = std::fs::read(file)?;
    let encrypted = session.editor.service().is_encrypted(&content);
    output::data(if encrypted { "encrypted" } else { "plaintext" });
    Ok(())
}

/// Print a document, decrypting it if it is an encrypted file.
pub fn open(mut session: Session, file: &Path) -> Result<()> {
    let content = std::fs::read(file)?;
    if is_encrypted_path(file) {
        session.editor.refresh_keys()?;
    }

    match session.editor.on_document_opened(file, &content)? {
        Some(result) => {
            let mut plaintext = result.into_output()?;
            let written = write_stdout(&plaintext);
            plaintext.zeroize();
            written?;
            session.save()?;
        }
        None => write_stdout(&content)?,
    }
    Ok(())
}

/// Write stdin to a document, encrypting it for `.gpg`/`.asc` paths.
pub fn save(session: Session, file: &Path) -> Result<()> {
    let mut text = Vec::new();
    std::io::stdin().lock().read_to_end(&mut text)?;

    let action = session.editor.on_document_will_save(file, &text);
    let written: Result<()> = match action {
        Ok(SaveAction::Unchanged) => std::fs::write(file, &text).map_err(Error::from),
        Ok(SaveAction::Encrypted(result)) => match result.into_output() {
            Ok(ciphertext) => std::fs::write(file, ciphertext).map_err(Error::from),
            Err(failure) => Err(failure.into()),
        },
        Err(e) => Err(e),
    };
    text.zeroize();
    written?;

    output::success(&format!("saved {}", output::path(&file.display().to_string())));
    Ok(())
}
