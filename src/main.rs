//! gpgpad - OpenPGP encryption for plain-text documents.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gpgpad::cli::output;
use gpgpad::cli::{execute, Cli};
use gpgpad::core::constants::LOG_ENV;
use gpgpad::core::operation::{Failure, FailureKind};
use gpgpad::error::{DocumentError, Error, ProviderError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("gpgpad=debug")
        } else {
            EnvFilter::new("gpgpad=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::Provider(ProviderError::Unavailable(_))
            | Error::Operation(Failure {
                kind: FailureKind::ProviderUnavailable,
                ..
            }) => Some("install GnuPG or set gpg.binary in the config file"),
            Error::Document(DocumentError::NoFingerprint) => {
                Some("run: gpgpad select <fingerprint>")
            }
            Error::Operation(Failure {
                kind: FailureKind::KeyNotFound,
                ..
            }) => Some("run: gpgpad keys --include-expired"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
