//! Persisted settings.
//!
//! Handles reading, writing, and validating the `config.toml` that keeps
//! the editor's key selection, encryption options, and gpg invocation
//! settings between sessions.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::catalog::KeyFilter;
use crate::core::constants;
use crate::core::provider::TrustPolicy;
use crate::error::{ConfigError, Result};

/// User settings stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub selection: Selection,
    pub options: Options,
    pub gpg: GpgSettings,
}

/// The currently selected key and recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    /// Mail search string; also the recipient filter when encrypting.
    pub search_string: String,
    /// Selected key, by fingerprint. Row positions are never persisted.
    pub fingerprint: String,
    /// Selected recipient address of that key.
    pub mail_address: String,
}

/// Encryption and listing options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub ascii_armor: bool,
    pub symmetric: bool,
    pub only_private_keys: bool,
    pub hide_expired_keys: bool,
    pub trust_model: TrustPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ascii_armor: true,
            symmetric: false,
            only_private_keys: false,
            hide_expired_keys: true,
            trust_model: TrustPolicy::Always,
        }
    }
}

/// Pinentry mode passed to gpg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinentryMode {
    #[default]
    Default,
    Ask,
    Loopback,
}

impl PinentryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Ask => "ask",
            Self::Loopback => "loopback",
        }
    }
}

/// How to invoke gpg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpgSettings {
    /// Binary name or path
    pub binary: String,
    /// Alternative GNUPGHOME
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homedir: Option<PathBuf>,
    /// File holding the passphrase (implies loopback pinentry)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase_file: Option<PathBuf>,
    pub pinentry_mode: PinentryMode,
    pub batch: bool,
}

impl Default for GpgSettings {
    fn default() -> Self {
        Self {
            binary: constants::DEFAULT_GPG_BINARY.to_string(),
            homedir: None,
            passphrase_file: None,
            pinentry_mode: PinentryMode::Default,
            batch: false,
        }
    }
}

impl GpgSettings {
    /// Pinentry mode actually used; a passphrase file needs loopback.
    pub fn effective_pinentry(&self) -> PinentryMode {
        if self.passphrase_file.is_some() && self.pinentry_mode == PinentryMode::Default {
            PinentryMode::Loopback
        } else {
            self.pinentry_mode
        }
    }
}

impl Settings {
    /// Default settings location (`~/.config/gpgpad/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join(constants::APP_DIR).join(constants::CONFIG_FILE))
    }

    /// Load settings from `path`.
    ///
    /// A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed, or
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading settings");

        if !path.exists() {
            debug!("settings file missing, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let settings: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        settings.validate()?;

        debug!(
            fingerprint = %settings.selection.fingerprint,
            symmetric = settings.options.symmetric,
            "settings loaded"
        );
        Ok(settings)
    }

    /// Save settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving settings");

        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ConfigError::WriteFile)?;
            }
        }
        std::fs::write(path, contents).map_err(ConfigError::WriteFile)?;
        Ok(())
    }

    /// Validate settings contents.
    ///
    /// Checks:
    /// - gpg binary is not empty
    /// - a passphrase file is not combined with `ask` pinentry
    pub fn validate(&self) -> Result<()> {
        if self.gpg.binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "gpg.binary",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if self.gpg.passphrase_file.is_some() && self.gpg.pinentry_mode == PinentryMode::Ask {
            return Err(ConfigError::InvalidValue {
                field: "gpg.pinentry_mode",
                reason: "a passphrase file requires loopback pinentry".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Catalog filter described by the current options.
    pub fn key_filter(&self) -> KeyFilter {
        KeyFilter {
            include_only_private: self.options.only_private_keys,
            exclude_expired: self.options.hide_expired_keys,
            search_pattern: self.selection.search_string.clone(),
        }
    }
}
