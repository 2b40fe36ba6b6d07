//! Encrypted-content detection.
//!
//! Used to block double encryption and to trigger decrypt-on-open.

use tracing::trace;

use crate::core::constants::ARMOR_MESSAGE_HEADER;
use crate::core::provider::{DecryptOptions, Provider};

/// Probe for OpenPGP-encrypted content.
pub struct EncryptionDetector;

impl EncryptionDetector {
    /// Whether `text` is a message addressed to at least one recipient key.
    ///
    /// Runs a provider decrypt with the output discarded. Any provider
    /// error counts as "not encrypted". Symmetric messages carry no
    /// recipient key ids, so gpg-produced symmetric ciphertext is
    /// reported as not encrypted.
    pub fn is_encrypted<P: Provider + ?Sized>(provider: &P, text: &[u8]) -> bool {
        if text.is_empty() {
            return false;
        }

        let options = DecryptOptions {
            discard_output: true,
            ..Default::default()
        };
        match provider.decrypt(text, &options) {
            Ok(probe) => {
                trace!(recipients = probe.recipients.len(), "detection probe decrypted");
                !probe.recipients.is_empty()
            }
            Err(e) => {
                trace!(error = %e, "detection probe failed");
                false
            }
        }
    }
}

/// Whether `text` starts with the ASCII armor message marker.
pub fn has_armor_header(text: &[u8]) -> bool {
    text.starts_with(ARMOR_MESSAGE_HEADER.as_bytes())
}
