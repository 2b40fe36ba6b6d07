//! GPG provider backend.
//!
//! Drives the system GnuPG binary.
//!
//! ## Requirements
//!
//! - `gpg` CLI must be installed (or `gpg.binary` must point at it)
//! - The keyring must hold recipient public keys, and private keys for decryption
//!
//! Key listings use `--with-colons --fixed-list-mode`; decryption reads
//! recipient key ids from `--status-fd` output.

use std::collections::HashSet;
use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};

use tracing::{debug, trace};
use zeroize::Zeroize;

use super::{
    DecryptOptions, Decryption, EncryptOptions, Provider, ProviderKey, ProviderResult,
    ProviderSubkey, ProviderUserId, TrustPolicy,
};
use crate::core::config::{GpgSettings, PinentryMode};
use crate::error::ProviderError;

const STATUS_PREFIX: &str = "[GNUPG:] ";

/// Provider backed by the gpg CLI.
#[derive(Debug, Clone, Default)]
pub struct GpgProvider {
    settings: GpgSettings,
}

struct CommandOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl GpgProvider {
    pub fn new(settings: GpgSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GpgSettings {
        &self.settings
    }

    /// Check if the configured gpg binary can be found.
    pub fn is_available(&self) -> bool {
        which::which(&self.settings.binary).is_ok()
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(homedir) = &self.settings.homedir {
            args.push("--homedir".to_string());
            args.push(homedir.to_string_lossy().to_string());
        }

        let pinentry = self.settings.effective_pinentry();
        if let Some(path) = &self.settings.passphrase_file {
            args.push("--passphrase-file".to_string());
            args.push(path.to_string_lossy().to_string());
        }

        if self.settings.batch || self.settings.passphrase_file.is_some() {
            args.push("--batch".to_string());
        }

        if pinentry != PinentryMode::Default {
            args.push("--pinentry-mode".to_string());
            args.push(pinentry.as_str().to_string());
        }

        args
    }

    fn run_gpg(&self, args: &[&str], input: Option<&[u8]>) -> ProviderResult<CommandOutput> {
        let binary = which::which(&self.settings.binary).map_err(|e| {
            ProviderError::Unavailable(format!(
                "gpg binary '{}' not found: {}. Install GnuPG from https://gnupg.org/download/",
                self.settings.binary, e
            ))
        })?;

        let mut cmd = Command::new(binary);
        cmd.args(self.base_args())
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| ProviderError::Unavailable(format!("failed to spawn gpg: {}", e)))?;

        // stdin is fed from its own thread so a large document cannot
        // deadlock against gpg filling the stdout pipe
        let stdin = child.stdin.take();
        let output = std::thread::scope(|scope| {
            let writer = match (input, stdin) {
                (Some(data), Some(mut stdin)) => Some(scope.spawn(move || stdin.write_all(data))),
                _ => None,
            };
            let output = child.wait_with_output();
            if let Some(Ok(Err(e))) = writer.map(|handle| handle.join()) {
                // gpg stopped reading; its exit status carries the reason
                trace!(error = %e, "gpg closed stdin early");
            }
            output
        })
        .map_err(|e| ProviderError::Operation(format!("gpg process failed: {}", e)))?;

        trace!(
            status = %output.status,
            stdout_len = output.stdout.len(),
            "gpg finished"
        );

        Ok(CommandOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn output_or_error(output: CommandOutput) -> ProviderResult<Vec<u8>> {
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(ProviderError::Operation(diagnostic(
                &output.stderr,
                output.status,
            )))
        }
    }

    fn list_raw(&self, pattern: &str, secret: bool) -> ProviderResult<Vec<ProviderKey>> {
        let mut args = vec![
            "--with-colons",
            "--fixed-list-mode",
            if secret {
                "--list-secret-keys"
            } else {
                "--list-keys"
            },
        ];
        if !pattern.is_empty() {
            args.push("--");
            args.push(pattern);
        }

        let output = self.run_gpg(&args, None)?;
        let keys = parse_colon_listing(&output.stdout);

        // gpg exits non-zero when a pattern matches nothing
        if !output.status.success() && keys.is_empty() {
            debug!(pattern = %pattern, secret, "gpg listed no keys");
        }
        Ok(keys)
    }
}

impl Provider for GpgProvider {
    fn name(&self) -> &'static str {
        "gpg"
    }

    fn list_keys(&self, pattern: &str, only_private: bool) -> ProviderResult<Vec<ProviderKey>> {
        debug!(pattern = %pattern, only_private, "listing gpg keys");

        let mut keys = self.list_raw(pattern, only_private)?;
        if !only_private {
            let secret: HashSet<String> = self
                .list_raw(pattern, true)?
                .into_iter()
                .map(|k| k.fingerprint)
                .collect();
            for key in &mut keys {
                key.has_secret = secret.contains(&key.fingerprint);
            }
        }

        debug!(count = keys.len(), "gpg keys listed");
        Ok(keys)
    }

    fn lookup_key(&self, fingerprint: &str) -> ProviderResult<Option<ProviderKey>> {
        let fingerprint = fingerprint.trim();
        if fingerprint.is_empty() {
            return Ok(None);
        }
        debug!(fingerprint = %fingerprint, "looking up gpg key");

        Ok(self
            .list_raw(fingerprint, false)?
            .into_iter()
            .find(|k| k.fingerprint.eq_ignore_ascii_case(fingerprint)))
    }

    fn decrypt(&self, ciphertext: &[u8], options: &DecryptOptions) -> ProviderResult<Decryption> {
        // gpg detects armor on input and text mode is an encryption-side flag
        trace!(
            ciphertext_len = ciphertext.len(),
            armor = options.armor,
            text_mode = options.text_mode,
            probe = options.discard_output,
            "decrypting with gpg"
        );

        let mut output = self.run_gpg(&["--status-fd", "2", "--decrypt"], Some(ciphertext))?;
        let recipients = parse_enc_to(&output.stderr);

        // gpg exits 2 after a good decryption whose signature it cannot
        // check, so the status stream decides
        if !decryption_okay(&output.stderr, output.status) {
            output.stdout.zeroize();
            return Err(ProviderError::Operation(diagnostic(
                &output.stderr,
                output.status,
            )));
        }

        let plaintext = if options.discard_output {
            output.stdout.zeroize();
            Vec::new()
        } else {
            output.stdout
        };

        trace!(
            plaintext_len = plaintext.len(),
            recipients = recipients.len(),
            "decrypted with gpg"
        );
        Ok(Decryption {
            plaintext,
            recipients,
        })
    }

    fn encrypt_to_keys(
        &self,
        plaintext: &[u8],
        recipients: &[ProviderKey],
        options: &EncryptOptions,
    ) -> ProviderResult<Vec<u8>> {
        trace!(
            recipients = recipients.len(),
            plaintext_len = plaintext.len(),
            armor = options.armor,
            "encrypting with gpg"
        );

        if recipients.is_empty() {
            return Err(ProviderError::Operation(
                "no recipients provided".to_string(),
            ));
        }

        let mut args: Vec<&str> = encrypt_args(options);
        let recipient_args: Vec<String> = recipients
            .iter()
            .flat_map(|k| ["--recipient".to_string(), k.fingerprint.clone()])
            .collect();
        args.extend(recipient_args.iter().map(|s| s.as_str()));

        let output = self.run_gpg(&args, Some(plaintext))?;
        let ciphertext = Self::output_or_error(output)?;

        trace!(ciphertext_len = ciphertext.len(), "encrypted with gpg");
        Ok(ciphertext)
    }

    fn encrypt_symmetric(&self, plaintext: &[u8], armor: bool) -> ProviderResult<Vec<u8>> {
        trace!(plaintext_len = plaintext.len(), armor, "symmetric encryption with gpg");

        let output = self.run_gpg(&symmetric_args(armor), Some(plaintext))?;
        Self::output_or_error(output)
    }
}

fn encrypt_args(options: &EncryptOptions) -> Vec<&'static str> {
    let mut args = vec!["--encrypt"];
    if options.armor {
        args.push("--armor");
    }
    if options.text_mode {
        args.push("--textmode");
    }
    args.push("--trust-model");
    args.push(match options.trust {
        TrustPolicy::Always => "always",
        TrustPolicy::Default => "pgp",
    });
    args
}

/// Symmetric encryption always runs in text mode, like the recipient path.
fn symmetric_args(armor: bool) -> Vec<&'static str> {
    let mut args = vec!["--symmetric", "--textmode"];
    if armor {
        args.push("--armor");
    }
    args
}

/// Whether a decrypt run produced valid plaintext.
///
/// `DECRYPTION_OKAY` wins over the exit code; signature trouble makes gpg
/// exit non-zero even though the message itself decrypted fine.
fn decryption_okay(stderr: &[u8], status: ExitStatus) -> bool {
    let text = String::from_utf8_lossy(stderr);
    let mut okay = false;
    for keyword in text
        .lines()
        .filter_map(|line| line.strip_prefix(STATUS_PREFIX))
        .filter_map(|rest| rest.split_whitespace().next())
    {
        match keyword {
            "DECRYPTION_FAILED" => return false,
            "DECRYPTION_OKAY" => okay = true,
            _ => {}
        }
    }
    okay || status.success()
}

/// Non-status stderr lines, or the exit status when gpg said nothing.
fn diagnostic(stderr: &[u8], status: ExitStatus) -> String {
    let text = String::from_utf8_lossy(stderr);
    let message = text
        .lines()
        .filter(|line| !line.starts_with(STATUS_PREFIX))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if message.is_empty() {
        format!("gpg exited with {}", status)
    } else {
        message
    }
}

/// Recipient key ids from `ENC_TO` status lines, in order.
fn parse_enc_to(stderr: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stderr)
        .lines()
        .filter_map(|line| line.strip_prefix(STATUS_PREFIX))
        .filter_map(|rest| rest.strip_prefix("ENC_TO "))
        .filter_map(|rest| rest.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Parse `--with-colons` key listing output.
fn parse_colon_listing(output: &[u8]) -> Vec<ProviderKey> {
    let text = String::from_utf8_lossy(output);
    let mut keys = Vec::new();
    let mut current: Option<ProviderKey> = None;

    for line in text.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        let field = |i: usize| fields.get(i).copied().unwrap_or("");

        match field(0) {
            "pub" | "sec" => {
                if let Some(key) = current.take() {
                    keys.push(key);
                }
                current = Some(ProviderKey {
                    fingerprint: String::new(),
                    subkeys: vec![parse_subkey(&fields)],
                    user_ids: Vec::new(),
                    expired: field(1) == "e",
                    has_secret: field(0) == "sec",
                });
            }
            "sub" | "ssb" => {
                if let Some(key) = current.as_mut() {
                    key.subkeys.push(parse_subkey(&fields));
                }
            }
            "fpr" => {
                // The first fpr record after pub/sec belongs to the primary key.
                if let Some(key) = current.as_mut() {
                    if key.fingerprint.is_empty() && key.subkeys.len() == 1 {
                        key.fingerprint = field(9).to_string();
                    }
                }
            }
            "uid" => {
                if let Some(key) = current.as_mut() {
                    key.user_ids.push(split_user_id(&unescape_field(field(9))));
                }
            }
            _ => {}
        }
    }

    if let Some(key) = current {
        keys.push(key);
    }

    keys
}

fn parse_subkey(fields: &[&str]) -> ProviderSubkey {
    let field = |i: usize| fields.get(i).copied().unwrap_or("");
    ProviderSubkey {
        key_id: field(4).to_string(),
        algorithm: algorithm_name(field(3)),
        length: field(2).parse().unwrap_or(0),
        created: field(5).parse().unwrap_or(0),
        expires: field(6).parse().unwrap_or(0),
    }
}

/// Split `Name (comment) <mail>` into display name and email.
fn split_user_id(uid: &str) -> ProviderUserId {
    if let (Some(start), Some(end)) = (uid.rfind('<'), uid.rfind('>')) {
        if start < end {
            let mut name = uid[..start].trim();
            if name.ends_with(')') {
                if let Some(open) = name.rfind(" (") {
                    name = name[..open].trim();
                }
            }
            return ProviderUserId {
                name: name.to_string(),
                email: uid[start + 1..end].to_string(),
            };
        }
    }

    if uid.contains('@') && !uid.contains(' ') {
        ProviderUserId {
            name: String::new(),
            email: uid.to_string(),
        }
    } else {
        ProviderUserId {
            name: uid.trim().to_string(),
            email: String::new(),
        }
    }
}

/// Decode the `\xHH` escapes gpg uses inside colon fields.
fn unescape_field(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'x') {
            if let Some(value) = raw
                .get(i + 2..i + 4)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                out.push(value);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).to_string()
}

fn algorithm_name(id: &str) -> String {
    match id {
        "1" | "2" | "3" => "RSA".to_string(),
        "16" => "ELG".to_string(),
        "17" => "DSA".to_string(),
        "18" => "ECDH".to_string(),
        "19" => "ECDSA".to_string(),
        "22" => "EdDSA".to_string(),
        "" => String::new(),
        other => format!("algo-{}", other),
    }
}
