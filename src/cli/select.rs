//! Select command.
//!
//! Stores the key (and recipient address) used by later commands.

use crate::cli::{output, Session};
use crate::error::{ConfigError, Result};

/// Select a key by fingerprint and persist the choice.
pub fn execute(mut session: Session, fingerprint: &str, mail: Option<String>) -> Result<()> {
    let editor = &mut session.editor;
    editor.refresh_keys()?;
    editor.select_key(fingerprint)?;

    if let Some(mail) = mail {
        let catalog = editor.catalog();
        let belongs = catalog
            .find(fingerprint)
            .map(|key| key.emails().any(|email| email == mail))
            .unwrap_or(false);
        if !belongs {
            return Err(ConfigError::InvalidValue {
                field: "selection.mail_address",
                reason: format!("{} is not an address of key {}", mail, fingerprint),
            }
            .into());
        }
        editor.settings_mut().selection.mail_address = mail;
    }

    let selection = editor.settings().selection.clone();
    session.save()?;

    output::success(&format!("selected {}", output::key(&selection.fingerprint)));
    if !selection.mail_address.is_empty() {
        output::hint(&format!("recipient: {}", selection.mail_address));
    }
    Ok(())
}
