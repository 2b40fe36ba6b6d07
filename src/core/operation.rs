//! Encrypt/decrypt orchestration.
//!
//! [`CryptoService`] runs one operation per call through the state machine
//! `Idle -> KeyLookup -> {NotFound | Decrypting | Encrypting} -> {Succeeded | Failed}`
//! and folds every outcome into an [`OperationResult`]. Nothing is retried
//! and nothing is returned as `Err`; callers render the result record.

use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, trace, warn};
use zeroize::Zeroize;

use crate::core::catalog::{self, KeyCatalog, KeyFilter};
use crate::core::detect::EncryptionDetector;
use crate::core::provider::{
    DecryptOptions, EncryptOptions, Provider, ProviderKey, TrustPolicy,
};
use crate::error::{ProviderError, Result};

/// Outcome of the key lookup step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyLookup {
    /// No lookup was made: symmetric mode, or the input was rejected first.
    NotAttempted,
    NotFound,
    Found,
}

/// Failure categories reported through [`OperationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The backend could not be reached.
    ProviderUnavailable,
    /// The requested fingerprint is not in the keyring or search scope.
    KeyNotFound,
    /// The provider rejected the decrypt/encrypt step.
    CryptoOperationFailed,
    /// Empty document or missing fingerprint.
    MalformedInput,
}

/// A classified operation failure with its diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn from_provider(error: ProviderError) -> Self {
        match error {
            ProviderError::Unavailable(msg) => Self::new(FailureKind::ProviderUnavailable, msg),
            ProviderError::Operation(msg) => Self::new(FailureKind::CryptoOperationFailed, msg),
        }
    }
}

/// Result record of a single encrypt or decrypt call.
///
/// `error_message()` is non-empty exactly when the operation did not
/// succeed; a failed key lookup always means the operation did not
/// succeed. The output buffer is wiped on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    output: Vec<u8>,
    key_lookup: KeyLookup,
    recipient_key_ids: Vec<String>,
    failure: Option<Failure>,
}

impl OperationResult {
    fn success(output: Vec<u8>, key_lookup: KeyLookup, recipient_key_ids: Vec<String>) -> Self {
        Self {
            output,
            key_lookup,
            recipient_key_ids,
            failure: None,
        }
    }

    fn failed(key_lookup: KeyLookup, failure: Failure) -> Self {
        Self {
            output: Vec::new(),
            key_lookup,
            recipient_key_ids: Vec::new(),
            failure: Some(failure),
        }
    }

    /// Raw payload: plaintext after decrypt, ciphertext after encrypt.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Payload as text. Binary ciphertext is converted lossily.
    pub fn result_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }

    pub fn key_lookup(&self) -> KeyLookup {
        self.key_lookup
    }

    /// True iff the requested key was located before the crypto step.
    ///
    /// Always false in symmetric mode; check [`Self::key_lookup`] there.
    pub fn key_found(&self) -> bool {
        self.key_lookup == KeyLookup::Found
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Diagnostic text, empty on success.
    pub fn error_message(&self) -> &str {
        self.failure.as_ref().map(|f| f.message.as_str()).unwrap_or("")
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// Recipient key ids reported by a successful decrypt, in provider
    /// order with duplicates kept. Empty for every other outcome.
    pub fn recipient_key_ids(&self) -> &[String] {
        &self.recipient_key_ids
    }

    /// Consume the result, yielding the payload or the failure.
    pub fn into_output(mut self) -> std::result::Result<Vec<u8>, Failure> {
        match self.failure.take() {
            Some(failure) => Err(failure),
            None => Ok(std::mem::take(&mut self.output)),
        }
    }
}

impl Drop for OperationResult {
    fn drop(&mut self) {
        self.output.zeroize();
    }
}

/// Parameters of an encrypt call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptRequest {
    /// Recipient key; ignored in symmetric mode.
    pub fingerprint: String,
    /// Search pattern the recipient key is re-enumerated with.
    pub recipient_mail_filter: String,
    pub armor: bool,
    pub symmetric: bool,
    pub include_only_private: bool,
    pub trust: TrustPolicy,
}

impl Default for EncryptRequest {
    fn default() -> Self {
        Self {
            fingerprint: String::new(),
            recipient_mail_filter: String::new(),
            armor: true,
            symmetric: false,
            include_only_private: false,
            trust: TrustPolicy::Always,
        }
    }
}

impl EncryptRequest {
    /// Encrypt to one key, searched for with `mail_filter`.
    pub fn to_key(fingerprint: impl Into<String>, mail_filter: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            recipient_mail_filter: mail_filter.into(),
            ..Default::default()
        }
    }

    /// Passphrase-based encryption.
    pub fn symmetric() -> Self {
        Self {
            symmetric: true,
            ..Default::default()
        }
    }
}

/// Orchestrates provider calls for the editor host.
pub struct CryptoService<P> {
    provider: P,
}

impl<P: Provider> CryptoService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Build a catalog snapshot; fails only when the provider is unavailable.
    pub fn enumerate_keys(&self, filter: &KeyFilter) -> Result<KeyCatalog> {
        catalog::enumerate(&self.provider, filter)
    }

    /// See [`EncryptionDetector::is_encrypted`].
    pub fn is_encrypted(&self, text: &[u8]) -> bool {
        EncryptionDetector::is_encrypted(&self.provider, text)
    }

    /// Decrypt `ciphertext` after confirming `fingerprint` exists.
    ///
    /// The looked-up key only proves existence; the provider picks the
    /// private key it actually decrypts with.
    pub fn decrypt(&self, ciphertext: &[u8], fingerprint: &str) -> OperationResult {
        debug!(fingerprint, input_len = ciphertext.len(), "decrypt requested");

        if ciphertext.is_empty() {
            return OperationResult::failed(
                KeyLookup::NotAttempted,
                Failure::new(FailureKind::MalformedInput, "nothing to decrypt"),
            );
        }
        if fingerprint.is_empty() {
            return OperationResult::failed(
                KeyLookup::NotFound,
                Failure::new(FailureKind::MalformedInput, "no key fingerprint given"),
            );
        }

        match self.provider.lookup_key(fingerprint) {
            Ok(Some(_)) => trace!(fingerprint, "key located"),
            Ok(None) => {
                debug!(fingerprint, "key not found, decrypt skipped");
                return OperationResult::failed(
                    KeyLookup::NotFound,
                    Failure::new(
                        FailureKind::KeyNotFound,
                        format!("no key with fingerprint {}", fingerprint),
                    ),
                );
            }
            Err(e) => {
                warn!(fingerprint, error = %e, "key lookup failed");
                let failure = match e {
                    ProviderError::Unavailable(msg) => {
                        Failure::new(FailureKind::ProviderUnavailable, msg)
                    }
                    other => Failure::new(FailureKind::KeyNotFound, other.to_string()),
                };
                return OperationResult::failed(KeyLookup::NotFound, failure);
            }
        }

        match self.provider.decrypt(ciphertext, &DecryptOptions::default()) {
            Ok(mut decryption) => {
                debug!(
                    plaintext_len = decryption.plaintext.len(),
                    recipients = decryption.recipients.len(),
                    "decrypt succeeded"
                );
                let plaintext = std::mem::take(&mut decryption.plaintext);
                OperationResult::success(plaintext, KeyLookup::Found, decryption.recipients)
            }
            Err(e) => {
                debug!(error = %e, "decrypt failed");
                OperationResult::failed(KeyLookup::Found, Failure::from_provider(e))
            }
        }
    }

    /// Encrypt `plaintext` to the requested key, or symmetrically.
    pub fn encrypt(&self, plaintext: &[u8], request: &EncryptRequest) -> OperationResult {
        debug!(
            fingerprint = %request.fingerprint,
            symmetric = request.symmetric,
            armor = request.armor,
            input_len = plaintext.len(),
            "encrypt requested"
        );

        if plaintext.is_empty() {
            return OperationResult::failed(
                KeyLookup::NotAttempted,
                Failure::new(FailureKind::MalformedInput, "nothing to encrypt"),
            );
        }

        if request.symmetric {
            return match self.provider.encrypt_symmetric(plaintext, request.armor) {
                Ok(ciphertext) => {
                    trace!(output_len = ciphertext.len(), "symmetric encrypt succeeded");
                    OperationResult::success(ciphertext, KeyLookup::NotAttempted, Vec::new())
                }
                Err(e) => {
                    OperationResult::failed(KeyLookup::NotAttempted, Failure::from_provider(e))
                }
            };
        }

        if request.fingerprint.is_empty() {
            return OperationResult::failed(
                KeyLookup::NotFound,
                Failure::new(FailureKind::MalformedInput, "no key fingerprint given"),
            );
        }

        let recipient = match self.find_recipient(request) {
            Ok(Some(key)) => key,
            Ok(None) => {
                debug!(fingerprint = %request.fingerprint, "recipient key not in search scope");
                return OperationResult::failed(
                    KeyLookup::NotFound,
                    Failure::new(
                        FailureKind::KeyNotFound,
                        format!(
                            "no key with fingerprint {} matches '{}'",
                            request.fingerprint, request.recipient_mail_filter
                        ),
                    ),
                );
            }
            Err(failure) => return OperationResult::failed(KeyLookup::NotFound, failure),
        };

        let options = EncryptOptions {
            armor: request.armor,
            text_mode: true,
            trust: request.trust,
        };
        match self
            .provider
            .encrypt_to_keys(plaintext, std::slice::from_ref(&recipient), &options)
        {
            Ok(ciphertext) => {
                trace!(output_len = ciphertext.len(), "encrypt succeeded");
                OperationResult::success(ciphertext, KeyLookup::Found, Vec::new())
            }
            Err(e) => {
                debug!(error = %e, "encrypt failed");
                OperationResult::failed(KeyLookup::Found, Failure::from_provider(e))
            }
        }
    }

    /// First key, in enumeration order, with the requested fingerprint.
    fn find_recipient(
        &self,
        request: &EncryptRequest,
    ) -> std::result::Result<Option<ProviderKey>, Failure> {
        let keys = self
            .provider
            .list_keys(&request.recipient_mail_filter, request.include_only_private)
            .map_err(|e| match e {
                ProviderError::Unavailable(msg) => {
                    Failure::new(FailureKind::ProviderUnavailable, msg)
                }
                other => Failure::new(FailureKind::KeyNotFound, other.to_string()),
            })?;

        Ok(keys.into_iter().find(|k| {
            (!request.include_only_private || k.has_secret)
                && k.fingerprint.eq_ignore_ascii_case(&request.fingerprint)
        }))
    }
}
