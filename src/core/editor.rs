//! Editor session.
//!
//! Binds the crypto service, the current catalog snapshot, and the user's
//! settings into the operations a host editor triggers: key selection,
//! explicit encrypt/decrypt of a document, and the open/save hooks for
//! `.gpg`/`.asc` files.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::core::catalog::{CatalogCache, KeyCatalog};
use crate::core::config::Settings;
use crate::core::constants::ENCRYPTED_EXTENSIONS;
use crate::core::detect::has_armor_header;
use crate::core::operation::{
    CryptoService, EncryptRequest, Failure, FailureKind, OperationResult,
};
use crate::core::provider::Provider;
use crate::core::selection;
use crate::error::{DocumentError, Result};

/// What the save hook did with the document.
#[derive(Debug)]
pub enum SaveAction {
    /// Not an encrypted-file path; write the text as is.
    Unchanged,
    /// The document was run through encryption; check the result.
    Encrypted(OperationResult),
}

/// Whether `path` names a file that is kept encrypted on disk.
pub fn is_encrypted_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ENCRYPTED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// A host editor's view of keys, selection and document operations.
pub struct Editor<P> {
    service: CryptoService<P>,
    cache: CatalogCache,
    settings: Settings,
}

impl<P: Provider> Editor<P> {
    pub fn new(provider: P, settings: Settings) -> Self {
        Self {
            service: CryptoService::new(provider),
            cache: CatalogCache::new(),
            settings,
        }
    }

    pub fn service(&self) -> &CryptoService<P> {
        &self.service
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// The current catalog snapshot.
    pub fn catalog(&self) -> Arc<KeyCatalog> {
        self.cache.snapshot()
    }

    /// Rebuild the catalog from the settings' filter options.
    pub fn refresh_keys(&mut self) -> Result<Arc<KeyCatalog>> {
        let filter = self.settings.key_filter();
        self.cache.rebuild(self.service.provider(), &filter)
    }

    /// Select a key by fingerprint from the current snapshot.
    ///
    /// The stored mail address is kept if it belongs to the key, otherwise
    /// it becomes the key's first email.
    pub fn select_key(&mut self, fingerprint: &str) -> Result<()> {
        let catalog = self.cache.snapshot();
        let key = catalog.find(fingerprint).ok_or_else(|| {
            Failure::new(
                FailureKind::KeyNotFound,
                format!("no key with fingerprint {} in the current list", fingerprint),
            )
        })?;

        let selection = &mut self.settings.selection;
        selection.fingerprint = key.fingerprint().to_string();
        if !key.emails().any(|email| email == selection.mail_address) {
            selection.mail_address = key.emails().next().unwrap_or_default().to_string();
        }

        debug!(
            fingerprint = %selection.fingerprint,
            mail = %selection.mail_address,
            "key selected"
        );
        Ok(())
    }

    /// Decrypt a document with the selected key.
    ///
    /// On success the key the message was addressed to becomes the
    /// selected key, if it is in the current snapshot.
    pub fn decrypt_document(&mut self, text: &[u8]) -> Result<OperationResult> {
        if text.is_empty() {
            return Err(DocumentError::Empty.into());
        }
        if self.settings.selection.fingerprint.is_empty() {
            return Err(DocumentError::NoFingerprint.into());
        }

        let result = self
            .service
            .decrypt(text, &self.settings.selection.fingerprint);

        if result.succeeded() {
            let catalog = self.cache.snapshot();
            let used = selection::select_by_recipient(catalog.iter(), result.recipient_key_ids())
                .map(|key| key.fingerprint().to_string());
            if let Some(fingerprint) = used {
                self.select_key(&fingerprint)?;
            }
        }
        Ok(result)
    }

    /// Encrypt a document with the selected key and options.
    ///
    /// Refuses text that is already encrypted.
    pub fn encrypt_document(&self, text: &[u8]) -> Result<OperationResult> {
        self.check_encryptable(text)?;
        if self.is_already_encrypted(text) {
            return Err(DocumentError::AlreadyEncrypted.into());
        }
        Ok(self.encrypt_checked(text))
    }

    fn check_encryptable(&self, text: &[u8]) -> Result<()> {
        if text.is_empty() {
            return Err(DocumentError::Empty.into());
        }
        if !self.settings.options.symmetric && self.settings.selection.fingerprint.is_empty() {
            return Err(DocumentError::NoFingerprint.into());
        }
        Ok(())
    }

    /// Armor marker first; the detector costs a provider decrypt.
    fn is_already_encrypted(&self, text: &[u8]) -> bool {
        has_armor_header(text) || self.service.is_encrypted(text)
    }

    /// Encrypt without the double-encryption check; callers run it first.
    fn encrypt_checked(&self, text: &[u8]) -> OperationResult {
        let options = &self.settings.options;
        let selection = &self.settings.selection;
        let request = EncryptRequest {
            fingerprint: selection.fingerprint.clone(),
            recipient_mail_filter: selection.mail_address.clone(),
            armor: options.ascii_armor,
            symmetric: options.symmetric,
            include_only_private: options.only_private_keys,
            trust: options.trust_model,
        };
        self.service.encrypt(text, &request)
    }

    /// Hook for a freshly opened document.
    ///
    /// Encrypted content in a `.gpg`/`.asc` file is decrypted right away.
    pub fn on_document_opened(
        &mut self,
        path: &Path,
        text: &[u8],
    ) -> Result<Option<OperationResult>> {
        if !is_encrypted_path(path) || !self.service.is_encrypted(text) {
            return Ok(None);
        }
        info!(path = %path.display(), "decrypting on open");
        self.decrypt_document(text).map(Some)
    }

    /// Hook run right before a document is written.
    pub fn on_document_will_save(&self, path: &Path, text: &[u8]) -> Result<SaveAction> {
        if !is_encrypted_path(path) {
            return Ok(SaveAction::Unchanged);
        }
        if self.is_already_encrypted(text) {
            return Err(DocumentError::AlreadyEncrypted.into());
        }
        self.check_encryptable(text)?;
        info!(path = %path.display(), "encrypting on save");
        Ok(SaveAction::Encrypted(self.encrypt_checked(text)))
    }
}
