//! Command-line interface.

pub mod completions;
pub mod crypt;
pub mod keys;
pub mod output;
pub mod select;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::core::config::Settings;
use crate::core::constants;
use crate::core::editor::Editor;
use crate::core::provider::GpgProvider;
use crate::error::Result;

/// gpgpad - OpenPGP encryption for plain-text documents.
#[derive(Parser)]
#[command(
    name = "gpgpad",
    about = "Encrypt and decrypt plain-text documents with your GnuPG keys",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (default: ~/.config/gpgpad/config.toml)
    #[arg(long, global = true, env = constants::CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// GnuPG home directory for this run
    #[arg(long, global = true)]
    pub homedir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// List available keys, newest first
    Keys {
        /// Only keys with a private part
        #[arg(long)]
        private: bool,
        /// Show expired keys too
        #[arg(long)]
        include_expired: bool,
        /// Mail search string (default: the stored one)
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Select the key used for encryption and decryption
    Select {
        /// Key fingerprint
        fingerprint: String,
        /// Recipient address of that key
        #[arg(short, long)]
        mail: Option<String>,
    },

    /// Encrypt a file
    Encrypt {
        /// File to encrypt
        file: PathBuf,
        /// Recipient key fingerprint (default: the selected key)
        #[arg(short, long)]
        key: Option<String>,
        /// Recipient address used to find the key
        #[arg(long)]
        to: Option<String>,
        /// Binary output instead of ASCII armor
        #[arg(long)]
        binary: bool,
        /// Passphrase-based encryption, no recipient key
        #[arg(long)]
        symmetric: bool,
        /// Output file (default: <file>.asc, or <file>.gpg with --binary)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decrypt a file
    Decrypt {
        /// File to decrypt
        file: PathBuf,
        /// Key fingerprint (default: the selected key)
        #[arg(short, long)]
        key: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report whether a file is encrypted
    Detect {
        /// File to inspect
        file: PathBuf,
    },

    /// Print a document, decrypting .gpg/.asc files
    Open {
        /// Document path
        file: PathBuf,
    },

    /// Write stdin to a document, encrypting .gpg/.asc files
    Save {
        /// Document path
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Loaded settings bound to a gpg-backed editor session.
pub struct Session {
    path: PathBuf,
    stored_homedir: Option<PathBuf>,
    pub editor: Editor<GpgProvider>,
}

impl Session {
    /// Load settings and apply per-run overrides.
    pub fn open(config: Option<&Path>, homedir: Option<&Path>) -> Result<Self> {
        let path = match config {
            Some(p) => p.to_path_buf(),
            None => Settings::default_path()?,
        };
        let mut settings = Settings::load(&path)?;
        let stored_homedir = settings.gpg.homedir.clone();
        if let Some(dir) = homedir {
            settings.gpg.homedir = Some(dir.to_path_buf());
        }

        let provider = GpgProvider::new(settings.gpg.clone());
        Ok(Self {
            path,
            stored_homedir,
            editor: Editor::new(provider, settings),
        })
    }

    /// Persist the settings, without the per-run homedir override.
    pub fn save(self) -> Result<()> {
        let mut settings = self.editor.into_settings();
        settings.gpg.homedir = self.stored_homedir;
        debug!(path = %self.path.display(), "persisting selection");
        settings.save(&self.path)
    }
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    use Command::*;

    // completions need no settings or gpg
    let command = match cli.command {
        Completions { shell } => return completions::execute(shell),
        command => command,
    };

    let session = Session::open(cli.config.as_deref(), cli.homedir.as_deref())?;
    match command {
        Keys {
            private,
            include_expired,
            search,
            json,
        } => keys::execute(session, private, include_expired, search, json),
        Select { fingerprint, mail } => select::execute(session, &fingerprint, mail),
        Encrypt {
            file,
            key,
            to,
            binary,
            symmetric,
            output,
        } => crypt::encrypt(
            session,
            &file,
            crypt::EncryptArgs {
                key,
                to,
                binary,
                symmetric,
                output,
            },
        ),
        Decrypt { file, key, output } => crypt::decrypt(session, &file, key, output),
        Detect { file } => crypt::detect(session, &file),
        Open { file } => crypt::open(session, &file),
        Save { file } => crypt::save(session, &file),
        Completions { .. } => Ok(()),
    }
}
