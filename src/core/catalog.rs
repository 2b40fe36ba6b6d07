//! Key catalog.
//!
//! Converts provider key records into display-ready [`KeyMetadata`] and
//! groups them into immutable [`KeyCatalog`] snapshots. A rebuild produces
//! a new snapshot; keys are never updated in place, so anything holding
//! an older snapshot keeps a frozen, consistent view. Match keys across
//! rebuilds by fingerprint, never by position.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::provider::{Provider, ProviderKey};
use crate::error::{ProviderError, Result};

/// One user id of a key, with the subkey id it is displayed next to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub display_name: String,
    pub email: String,
    /// Empty when no subkey is available at the paired position.
    pub subkey_id: String,
}

/// Immutable snapshot of one provider key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMetadata {
    fingerprint: String,
    short_key_id: String,
    algorithm: String,
    bit_length: u32,
    created: Option<DateTime<Utc>>,
    expires: Option<DateTime<Utc>>,
    identities: Vec<UserIdentity>,
    is_expired: bool,
    has_private_key: bool,
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    if secs == 0 {
        None
    } else {
        Utc.timestamp_opt(secs, 0).single()
    }
}

impl KeyMetadata {
    /// Convert a provider record.
    ///
    /// Algorithm, bit length and timestamps come from the primary subkey
    /// (index 0) only. User id `i` is paired with the subkey at index
    /// `i + 1`; when there is no such subkey the id is left empty.
    pub fn from_provider(key: &ProviderKey) -> Self {
        let primary = key.primary().cloned().unwrap_or_default();

        // Positional pairing, not something the provider guarantees.
        let identities = key
            .user_ids
            .iter()
            .enumerate()
            .map(|(i, uid)| UserIdentity {
                display_name: uid.name.clone(),
                email: uid.email.clone(),
                subkey_id: key
                    .subkeys
                    .get(i + 1)
                    .map(|s| s.key_id.clone())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            fingerprint: key.fingerprint.clone(),
            short_key_id: key.short_key_id(),
            algorithm: primary.algorithm,
            bit_length: primary.length,
            created: timestamp(primary.created),
            expires: timestamp(primary.expires),
            identities,
            is_expired: key.expired,
            has_private_key: key.has_secret,
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn short_key_id(&self) -> &str {
        &self.short_key_id
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }

    /// Creation time; `None` when the provider reported zero.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    /// Expiry time; `None` means the key does not expire.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    pub fn identities(&self) -> &[UserIdentity] {
        &self.identities
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired
    }

    pub fn has_private_key(&self) -> bool {
        self.has_private_key
    }

    /// Email addresses of all identities, in provider order.
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.identities.iter().map(|id| id.email.as_str())
    }

    /// Creation date as `YYYY-MM-DD`, empty if unknown.
    pub fn creation_date(&self) -> String {
        self.created
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    /// Expiry date as `YYYY-MM-DD`, or `never`.
    pub fn expiry_date(&self) -> String {
        self.expires
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "never".to_string())
    }

    /// One `name <email> (subkey)` line per identity.
    pub fn identities_summary(&self) -> String {
        self.identities
            .iter()
            .map(|id| format!("{} <{}> ({})", id.display_name, id.email, id.subkey_id))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Filter parameters a catalog is built with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyFilter {
    pub include_only_private: bool,
    pub exclude_expired: bool,
    /// Passed to the provider as is; empty means all keys.
    pub search_pattern: String,
}

impl KeyFilter {
    /// Whether a key satisfies the private/expired parts of the filter.
    ///
    /// Pattern matching belongs to the provider and is not re-checked.
    pub fn admits(&self, key: &KeyMetadata) -> bool {
        (!self.include_only_private || key.has_private_key())
            && (!self.exclude_expired || !key.is_expired())
    }
}

/// Immutable snapshot of the keys matching a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyCatalog {
    keys: Vec<KeyMetadata>,
    filter: KeyFilter,
    no_keys_found: bool,
}

impl KeyCatalog {
    pub fn keys(&self) -> &[KeyMetadata] {
        &self.keys
    }

    pub fn filter(&self) -> &KeyFilter {
        &self.filter
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True when the provider itself returned no keys.
    ///
    /// A catalog emptied by the expiry filter is empty but not in this state.
    pub fn no_keys_found(&self) -> bool {
        self.no_keys_found
    }

    pub fn find(&self, fingerprint: &str) -> Option<&KeyMetadata> {
        self.keys
            .iter()
            .find(|k| k.fingerprint().eq_ignore_ascii_case(fingerprint))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyMetadata> {
        self.keys.iter()
    }
}

impl<'a> IntoIterator for &'a KeyCatalog {
    type Item = &'a KeyMetadata;
    type IntoIter = std::slice::Iter<'a, KeyMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// Build a catalog from the provider.
///
/// # Errors
///
/// Fails only when the provider is unavailable. Any other listing error
/// is treated like an empty keyring.
pub fn enumerate<P: Provider + ?Sized>(provider: &P, filter: &KeyFilter) -> Result<KeyCatalog> {
    debug!(
        provider = provider.name(),
        pattern = %filter.search_pattern,
        only_private = filter.include_only_private,
        exclude_expired = filter.exclude_expired,
        "enumerating keys"
    );

    let records = match provider.list_keys(&filter.search_pattern, filter.include_only_private) {
        Ok(records) => records,
        Err(e @ ProviderError::Unavailable(_)) => return Err(e.into()),
        Err(e) => {
            warn!(error = %e, "key listing failed, treating as empty");
            Vec::new()
        }
    };

    if records.is_empty() {
        debug!("no keys found");
        return Ok(KeyCatalog {
            keys: Vec::new(),
            filter: filter.clone(),
            no_keys_found: true,
        });
    }

    let total = records.len();
    let keys: Vec<KeyMetadata> = records
        .iter()
        .filter(|r| !(filter.exclude_expired && r.expired))
        .map(KeyMetadata::from_provider)
        .filter(|k| filter.admits(k))
        .collect();

    debug!(listed = total, kept = keys.len(), "catalog built");

    Ok(KeyCatalog {
        keys,
        filter: filter.clone(),
        no_keys_found: false,
    })
}

/// Owner of the current catalog snapshot.
///
/// `rebuild` takes `&mut self`, so rebuilds are serialized by the borrow
/// checker. Readers get an `Arc` to a snapshot that is never mutated.
#[derive(Debug, Default)]
pub struct CatalogCache {
    current: Arc<KeyCatalog>,
    generation: u64,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<KeyCatalog> {
        Arc::clone(&self.current)
    }

    /// Number of successful rebuilds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the snapshot with a freshly enumerated one.
    ///
    /// On error the previous snapshot stays current.
    pub fn rebuild<P: Provider + ?Sized>(
        &mut self,
        provider: &P,
        filter: &KeyFilter,
    ) -> Result<Arc<KeyCatalog>> {
        let catalog = enumerate(provider, filter)?;
        self.current = Arc::new(catalog);
        self.generation += 1;
        Ok(self.snapshot())
    }
}
