//! Key selection policy.
//!
//! Decides which catalog keys are preferred for a recipient mail search,
//! orders keys for display, and maps decrypt recipients back to a key.

use crate::core::catalog::KeyMetadata;

/// True if any identity email of `key` contains `mail_search`.
///
/// Matching is a case-sensitive substring test. An empty search string
/// is never preferred; use [`matches_mail_filter`] for "show all".
pub fn is_preferred_key(key: &KeyMetadata, mail_search: &str) -> bool {
    if mail_search.is_empty() {
        return false;
    }
    key.emails().any(|email| email.contains(mail_search))
}

/// Display filter: an empty search shows every key.
pub fn matches_mail_filter(key: &KeyMetadata, mail_search: &str) -> bool {
    mail_search.is_empty() || is_preferred_key(key, mail_search)
}

/// Order keys for display, newest creation date first.
///
/// The sort is stable, so keys created at the same moment keep their
/// provider order. Keys without a creation date sort last.
pub fn rank<'a, I>(keys: I) -> Vec<&'a KeyMetadata>
where
    I: IntoIterator<Item = &'a KeyMetadata>,
{
    let mut ranked: Vec<&KeyMetadata> = keys.into_iter().collect();
    ranked.sort_by(|a, b| b.created().cmp(&a.created()));
    ranked
}

/// Find the key a decrypted message was addressed to.
///
/// A recipient id matches when it equals one of the key's identity
/// subkey ids, or when it is the tail of the key's fingerprint (the
/// primary key id). Comparison ignores ASCII case. The first key, in
/// the order given, matching any recipient wins.
pub fn select_by_recipient<'a, I, S>(keys: I, recipient_ids: &[S]) -> Option<&'a KeyMetadata>
where
    I: IntoIterator<Item = &'a KeyMetadata>,
    S: AsRef<str>,
{
    keys.into_iter().find(|key| {
        recipient_ids
            .iter()
            .map(AsRef::as_ref)
            .filter(|id| !id.is_empty())
            .any(|id| recipient_matches(key, id))
    })
}

fn recipient_matches(key: &KeyMetadata, id: &str) -> bool {
    let id = id.to_ascii_uppercase();
    // key ids are at least 8 hex digits; shorter tails would match anything
    (id.len() >= 8 && key.fingerprint().to_ascii_uppercase().ends_with(&id))
        || key
            .identities()
            .iter()
            .any(|ident| !ident.subkey_id.is_empty() && ident.subkey_id.eq_ignore_ascii_case(&id))
}
