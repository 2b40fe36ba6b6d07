//! Scripted provider for unit tests.
//!
//! Returns canned key records and canned decrypt/encrypt responses, and
//! counts calls so tests can assert which provider steps ran.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use super::{
    DecryptOptions, Decryption, EncryptOptions, Provider, ProviderKey, ProviderResult,
    ProviderSubkey, ProviderUserId,
};
use crate::error::ProviderError;

#[derive(Default)]
pub(crate) struct MockProvider {
    pub keys: Vec<ProviderKey>,
    pub unavailable: bool,
    pub lookup_error: RefCell<Option<ProviderError>>,
    pub decrypt_response: RefCell<Option<ProviderResult<Decryption>>>,
    pub encrypt_response: RefCell<Option<ProviderResult<Vec<u8>>>>,
    pub list_calls: Cell<usize>,
    pub lookup_calls: Cell<usize>,
    pub decrypt_calls: Cell<usize>,
    pub encrypt_calls: Cell<usize>,
    pub symmetric_calls: Cell<usize>,
    pub last_recipients: RefCell<Vec<String>>,
    pub last_encrypt_options: Cell<Option<EncryptOptions>>,
    pub last_decrypt_options: Cell<Option<DecryptOptions>>,
}

impl MockProvider {
    pub fn with_keys(keys: Vec<ProviderKey>) -> Self {
        Self {
            keys,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn script_decrypt(&self, response: ProviderResult<Decryption>) {
        *self.decrypt_response.borrow_mut() = Some(response);
    }

    pub fn script_lookup_error(&self, error: ProviderError) {
        *self.lookup_error.borrow_mut() = Some(error);
    }

    pub fn script_encrypt(&self, response: ProviderResult<Vec<u8>>) {
        *self.encrypt_response.borrow_mut() = Some(response);
    }

    fn check_available(&self) -> ProviderResult<()> {
        if self.unavailable {
            Err(ProviderError::Unavailable("mock offline".to_string()))
        } else {
            Ok(())
        }
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

/// Build a key with one user id and a primary plus one encryption subkey.
pub(crate) fn key(fingerprint: &str, email: &str, expired: bool, has_secret: bool) -> ProviderKey {
    let local = email.split('@').next().unwrap_or(email);
    ProviderKey {
        fingerprint: fingerprint.to_string(),
        subkeys: vec![
            ProviderSubkey {
                key_id: format!("{}PRIM", fingerprint),
                algorithm: "EdDSA".to_string(),
                length: 255,
                created: 1_700_000_000,
                expires: 0,
            },
            ProviderSubkey {
                key_id: format!("{}SUB1", fingerprint),
                algorithm: "ECDH".to_string(),
                length: 255,
                created: 1_700_000_000,
                expires: 0,
            },
        ],
        user_ids: vec![ProviderUserId {
            name: local.to_string(),
            email: email.to_string(),
        }],
        expired,
        has_secret,
    }
}

impl Provider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn list_keys(&self, pattern: &str, only_private: bool) -> ProviderResult<Vec<ProviderKey>> {
        bump(&self.list_calls);
        self.check_available()?;
        Ok(self
            .keys
            .iter()
            .filter(|k| !only_private || k.has_secret)
            .filter(|k| {
                pattern.is_empty()
                    || k
                        .user_ids
                        .iter()
                        .any(|u| u.email.contains(pattern) || u.name.contains(pattern))
            })
            .cloned()
            .collect())
    }

    fn lookup_key(&self, fingerprint: &str) -> ProviderResult<Option<ProviderKey>> {
        bump(&self.lookup_calls);
        self.check_available()?;
        if let Some(error) = self.lookup_error.borrow().clone() {
            return Err(error);
        }
        Ok(self
            .keys
            .iter()
            .find(|k| !fingerprint.is_empty() && k.fingerprint == fingerprint)
            .cloned())
    }

    fn decrypt(&self, _ciphertext: &[u8], options: &DecryptOptions) -> ProviderResult<Decryption> {
        bump(&self.decrypt_calls);
        self.last_decrypt_options.set(Some(*options));
        self.check_available()?;
        self.decrypt_response
            .borrow()
            .clone()
            .unwrap_or_else(|| Err(ProviderError::Operation("no data".to_string())))
    }

    fn encrypt_to_keys(
        &self,
        _plaintext: &[u8],
        recipients: &[ProviderKey],
        options: &EncryptOptions,
    ) -> ProviderResult<Vec<u8>> {
        bump(&self.encrypt_calls);
        *self.last_recipients.borrow_mut() =
            recipients.iter().map(|k| k.fingerprint.clone()).collect();
        self.last_encrypt_options.set(Some(*options));
        self.check_available()?;
        self.encrypt_response
            .borrow()
            .clone()
            .unwrap_or_else(|| Ok(b"-----BEGIN PGP MESSAGE-----\nmock\n".to_vec()))
    }

    fn encrypt_symmetric(&self, _plaintext: &[u8], _armor: bool) -> ProviderResult<Vec<u8>> {
        bump(&self.symmetric_calls);
        self.check_available()?;
        self.encrypt_response
            .borrow()
            .clone()
            .unwrap_or_else(|| Ok(b"-----BEGIN PGP MESSAGE-----\nsym\n".to_vec()))
    }
}
