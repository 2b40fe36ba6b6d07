//! OpenPGP provider abstraction.
//!
//! Everything cryptographic is delegated to a provider reached through the
//! narrow [`Provider`] trait: list keys, look one up, decrypt, encrypt to
//! keys, encrypt symmetrically. The orchestration layer never parses
//! OpenPGP data itself.
//!
//! ## Backends
//!
//! - **gpg**: the system GnuPG binary, driven in batch/colon mode.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Provider` trait
//! 2. Add the implementation in a new file next to `gpg.rs`
//! 3. Re-export from this module

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

pub mod gpg;

#[cfg(test)]
pub(crate) mod mock;

pub use gpg::GpgProvider;

/// Result type for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// One subkey as reported by the provider.
///
/// Index 0 of [`ProviderKey::subkeys`] is always the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderSubkey {
    /// Long (16 hex digit) key id.
    pub key_id: String,
    pub algorithm: String,
    pub length: u32,
    /// Seconds since the epoch; 0 when unknown.
    pub created: i64,
    /// Seconds since the epoch; 0 means no expiry.
    pub expires: i64,
}

/// A user id bound to a key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderUserId {
    pub name: String,
    pub email: String,
}

/// Provider-native key record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderKey {
    pub fingerprint: String,
    pub subkeys: Vec<ProviderSubkey>,
    pub user_ids: Vec<ProviderUserId>,
    pub expired: bool,
    pub has_secret: bool,
}

impl ProviderKey {
    /// The primary subkey, if the provider reported any.
    pub fn primary(&self) -> Option<&ProviderSubkey> {
        self.subkeys.first()
    }

    /// Last eight hex digits of the primary key id.
    pub fn short_key_id(&self) -> String {
        let long = self
            .primary()
            .map(|s| s.key_id.as_str())
            .filter(|id| !id.is_empty())
            .unwrap_or(self.fingerprint.as_str());
        let start = long.len().saturating_sub(8);
        long.get(start..).unwrap_or(long).to_string()
    }
}

/// Trust policy applied when encrypting to recipient keys.
///
/// `Always` skips the provider's validity checks. Key trust levels are
/// not modeled here, so with `Default` a freshly imported, uncertified
/// recipient key is rejected by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustPolicy {
    #[default]
    Always,
    Default,
}

impl TrustPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Default => "default",
        }
    }
}

/// Options for a provider decrypt call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptOptions {
    pub armor: bool,
    pub text_mode: bool,
    /// Drop the plaintext instead of returning it (detection probes).
    pub discard_output: bool,
}

impl Default for DecryptOptions {
    fn default() -> Self {
        Self {
            armor: true,
            text_mode: true,
            discard_output: false,
        }
    }
}

/// Options for a provider encrypt-to-keys call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptOptions {
    pub armor: bool,
    pub text_mode: bool,
    pub trust: TrustPolicy,
}

/// Successful provider decryption.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decryption {
    pub plaintext: Vec<u8>,
    /// Recipient key ids in provider order, duplicates kept.
    pub recipients: Vec<String>,
}

/// Capability interface of an OpenPGP implementation.
pub trait Provider {
    /// Backend name for display.
    fn name(&self) -> &'static str;

    /// List keys whose user ids match `pattern` (empty = all keys).
    ///
    /// Matching semantics are the provider's own.
    fn list_keys(&self, pattern: &str, only_private: bool) -> ProviderResult<Vec<ProviderKey>>;

    /// Find the key with exactly this fingerprint.
    fn lookup_key(&self, fingerprint: &str) -> ProviderResult<Option<ProviderKey>>;

    /// Decrypt a message with whatever private key the provider picks.
    fn decrypt(&self, ciphertext: &[u8], options: &DecryptOptions) -> ProviderResult<Decryption>;

    /// Encrypt to the given recipient keys.
    fn encrypt_to_keys(
        &self,
        plaintext: &[u8],
        recipients: &[ProviderKey],
        options: &EncryptOptions,
    ) -> ProviderResult<Vec<u8>>;

    /// Passphrase-based encryption with no recipient key.
    fn encrypt_symmetric(&self, plaintext: &[u8], armor: bool) -> ProviderResult<Vec<u8>>;
}
