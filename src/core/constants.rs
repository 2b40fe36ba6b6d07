//! Constants used throughout gpgpad.
//!
//! Centralizes magic strings and configuration values.

/// Leading line of an ASCII-armored OpenPGP message.
pub const ARMOR_MESSAGE_HEADER: &str = "-----BEGIN PGP MESSAGE-----";

/// File extensions that trigger auto-decrypt on open and auto-encrypt on save.
pub const ENCRYPTED_EXTENSIONS: &[&str] = &["gpg", "asc"];

/// Directory name under the user config dir (~/.config/gpgpad).
pub const APP_DIR: &str = "gpgpad";

/// Settings file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the settings file path.
pub const CONFIG_ENV: &str = "GPGPAD_CONFIG";

/// Environment variable holding the tracing filter.
pub const LOG_ENV: &str = "GPGPAD_LOG";

/// Default gpg binary name, resolved on PATH.
pub const DEFAULT_GPG_BINARY: &str = "gpg";
