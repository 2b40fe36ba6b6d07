//! gpgpad - OpenPGP encryption for plain-text documents.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line host
//! │   ├── keys          # List the key catalog
//! │   ├── select        # Persist the selected key
//! │   ├── crypt         # encrypt, decrypt, detect, open, save
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── provider/     # OpenPGP backends
//!     │   ├── mod       # Provider trait
//!     │   └── gpg       # GnuPG binary
//!     ├── catalog       # Key snapshots and filters
//!     ├── selection     # Preferred keys, ordering
//!     ├── operation     # Encrypt/decrypt results
//!     ├── detect        # Encrypted-content probe
//!     ├── editor        # Open/save hooks, selection state
//!     └── config        # config.toml management
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gpgpad::core::config::Settings;
//! use gpgpad::core::operation::{CryptoService, EncryptRequest};
//! use gpgpad::core::provider::GpgProvider;
//!
//! let service = CryptoService::new(GpgProvider::new(Settings::default().gpg));
//! let request = EncryptRequest::to_key("0123456789ABCDEF0123456789ABCDEF01234567", "alice@example.com");
//! let result = service.encrypt(b"hello world", &request);
//! if !result.succeeded() {
//!     eprintln!("{}", result.error_message());
//! }
//! ```

pub mod cli;
pub mod core;
pub mod error;
