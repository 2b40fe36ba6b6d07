//! In-memory OpenPGP provider.
//!
//! "Encrypts" by hex-encoding the plaintext behind a header naming the
//! recipient subkeys, so round trips and recipient reporting can be tested
//! without gpg. Only keys with a secret part can decrypt.

use std::cell::Cell;

use gpgpad::core::provider::{
    DecryptOptions, Decryption, EncryptOptions, Provider, ProviderKey, ProviderResult,
};
use gpgpad::error::ProviderError;

const ARMOR_BEGIN: &str = "-----BEGIN PGP MESSAGE-----\n";
const ARMOR_END: &str = "-----END PGP MESSAGE-----\n";
const BINARY_TAG: &[u8] = b"\x85FAKE";

pub struct FakeKeyring {
    keys: Vec<ProviderKey>,
    offline: bool,
    /// Number of decrypt calls, probes included.
    pub decrypts: Cell<usize>,
}

impl FakeKeyring {
    pub fn new(keys: Vec<ProviderKey>) -> Self {
        Self {
            keys,
            offline: false,
            decrypts: Cell::new(0),
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn keys(&self) -> &[ProviderKey] {
        &self.keys
    }

    fn online(&self) -> ProviderResult<()> {
        if self.offline {
            Err(ProviderError::Unavailable("keyring offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn can_decrypt(&self, subkey_id: &str) -> bool {
        self.keys
            .iter()
            .any(|k| k.has_secret && k.subkeys.iter().any(|s| s.key_id == subkey_id))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Body is `<recipients comma separated>:<hex>`; symmetric bodies have no recipients.
fn seal(recipients: &[String], plaintext: &[u8], armor: bool) -> Vec<u8> {
    let body = format!("{}:{}", recipients.join(","), to_hex(plaintext));
    if armor {
        format!("{}\n{}\n{}", ARMOR_BEGIN, body, ARMOR_END).into_bytes()
    } else {
        let mut out = BINARY_TAG.to_vec();
        out.extend_from_slice(body.as_bytes());
        out
    }
}

fn open(message: &[u8]) -> Option<(Vec<String>, Vec<u8>)> {
    let body = if let Some(rest) = message.strip_prefix(BINARY_TAG) {
        std::str::from_utf8(rest).ok()?.trim().to_string()
    } else {
        let text = std::str::from_utf8(message).ok()?;
        let inner = text.strip_prefix(ARMOR_BEGIN)?;
        let end = inner.find(ARMOR_END.trim_end())?;
        inner[..end].trim().to_string()
    };
    let (recipients, hex) = body.split_once(':')?;
    let recipients = recipients
        .split(',')
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();
    Some((recipients, from_hex(hex)?))
}

impl Provider for FakeKeyring {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn list_keys(&self, pattern: &str, only_private: bool) -> ProviderResult<Vec<ProviderKey>> {
        self.online()?;
        let pattern = pattern.to_lowercase();
        Ok(self
            .keys
            .iter()
            .filter(|k| !only_private || k.has_secret)
            .filter(|k| {
                pattern.is_empty()
                    || k.user_ids.iter().any(|u| {
                        format!("{} <{}>", u.name, u.email)
                            .to_lowercase()
                            .contains(&pattern)
                    })
            })
            .cloned()
            .collect())
    }

    fn lookup_key(&self, fingerprint: &str) -> ProviderResult<Option<ProviderKey>> {
        self.online()?;
        if fingerprint.is_empty() {
            return Ok(None);
        }
        Ok(self
            .keys
            .iter()
            .find(|k| k.fingerprint.eq_ignore_ascii_case(fingerprint))
            .cloned())
    }

    fn decrypt(&self, ciphertext: &[u8], options: &DecryptOptions) -> ProviderResult<Decryption> {
        self.decrypts.set(self.decrypts.get() + 1);
        self.online()?;
        let (recipients, plaintext) = open(ciphertext)
            .ok_or_else(|| ProviderError::Operation("no valid OpenPGP data found".to_string()))?;

        if !recipients.is_empty() && !recipients.iter().any(|r| self.can_decrypt(r)) {
            return Err(ProviderError::Operation(
                "decryption failed: No secret key".to_string(),
            ));
        }
        Ok(Decryption {
            plaintext: if options.discard_output {
                Vec::new()
            } else {
                plaintext
            },
            recipients,
        })
    }

    fn encrypt_to_keys(
        &self,
        plaintext: &[u8],
        recipients: &[ProviderKey],
        options: &EncryptOptions,
    ) -> ProviderResult<Vec<u8>> {
        self.online()?;
        if recipients.is_empty() {
            return Err(ProviderError::Operation("no recipients".to_string()));
        }
        let ids: Vec<String> = recipients
            .iter()
            .map(|k| {
                k.subkeys
                    .get(1)
                    .or_else(|| k.subkeys.first())
                    .map(|s| s.key_id.clone())
                    .unwrap_or_else(|| k.fingerprint.clone())
            })
            .collect();
        Ok(seal(&ids, plaintext, options.armor))
    }

    fn encrypt_symmetric(&self, plaintext: &[u8], armor: bool) -> ProviderResult<Vec<u8>> {
        self.online()?;
        Ok(seal(&[], plaintext, armor))
    }
}
