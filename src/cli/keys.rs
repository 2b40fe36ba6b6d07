//! Keys command.
//!
//! Lists the catalog newest first and marks keys matching the mail search.

use crate::cli::{output, Session};
use crate::core::catalog::KeyMetadata;
use crate::core::selection;
use crate::error::Result;

/// List keys.
///
/// Filter flags apply to this run only and are not persisted.
pub fn execute(
    mut session: Session,
    private: bool,
    include_expired: bool,
    search: Option<String>,
    json: bool,
) -> Result<()> {
    let settings = session.editor.settings_mut();
    if private {
        settings.options.only_private_keys = true;
    }
    if include_expired {
        settings.options.hide_expired_keys = false;
    }
    if let Some(search) = search {
        settings.selection.search_string = search;
    }

    let catalog = session.editor.refresh_keys()?;
    let search = session.editor.settings().selection.search_string.clone();
    let selected = session.editor.settings().selection.fingerprint.clone();
    let ranked = selection::rank(catalog.iter());

    if json {
        let keys: Vec<_> = ranked
            .iter()
            .map(|k| {
                serde_json::json!({
                    "key": k,
                    "preferred": selection::is_preferred_key(k, &search),
                    "selected": k.fingerprint() == selected,
                })
            })
            .collect();
        let count = keys.len();
        let result = serde_json::json!({
            "keys": keys,
            "count": count,
            "filter": catalog.filter(),
            "no_keys_found": catalog.no_keys_found(),
        });
        output::data(&serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if catalog.no_keys_found() {
        output::warn("no keys found");
        return Ok(());
    }
    if catalog.is_empty() {
        output::dimmed("no keys match the current filters");
        return Ok(());
    }

    output::header(&format!("{} keys", output::count(catalog.len())));
    output::rule();
    for key in ranked {
        print_key(
            key,
            selection::is_preferred_key(key, &search),
            key.fingerprint() == selected,
        );
    }
    Ok(())
}

fn print_key(key: &KeyMetadata, preferred: bool, selected: bool) {
    let marker = if preferred {
        output::preferred("★")
    } else {
        " ".to_string()
    };
    let suffix = if selected { "  (selected)" } else { "" };
    output::data(&format!("{} {}{}", marker, output::key(key.fingerprint()), suffix));
    output::kv("created", key.creation_date());
    output::kv("expires", key.expiry_date());
    output::kv(
        "type",
        format!("{} {}", key.algorithm(), key.bit_length()),
    );
    if key.is_expired() {
        output::kv("status", "expired");
    }
    if key.has_private_key() {
        output::kv("secret", "yes");
    }
    for line in key.identities_summary().lines() {
        output::kv("uid", line);
    }
    output::blank();
}
