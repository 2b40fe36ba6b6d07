//! Test fixtures and constants.

use gpgpad::core::provider::{ProviderKey, ProviderSubkey, ProviderUserId};

pub const ALICE_FPR: &str = "AAAA1111";
pub const ALICE_MAIL: &str = "alice@example.com";
pub const BOB_FPR: &str = "BBBB2222";
pub const BOB_MAIL: &str = "bob@example.com";

/// Plain document used across round-trip tests.
pub const HELLO: &str = "hello world";

/// Multi-line document with non-ASCII content.
pub const NOTES: &str = "# Notes\n\npasswords: ✓ rotated\nübung macht den meister\n";

/// Build a key with a primary and one encryption subkey.
///
/// Subkey ids are `<fingerprint>PRIM` and `<fingerprint>SUB1`.
pub fn make_key(
    fingerprint: &str,
    name: &str,
    email: &str,
    created: i64,
    expired: bool,
    has_secret: bool,
) -> ProviderKey {
    ProviderKey {
        fingerprint: fingerprint.to_string(),
        subkeys: vec![
            ProviderSubkey {
                key_id: format!("{}PRIM", fingerprint),
                algorithm: "EdDSA".to_string(),
                length: 255,
                created,
                expires: 0,
            },
            ProviderSubkey {
                key_id: format!("{}SUB1", fingerprint),
                algorithm: "ECDH".to_string(),
                length: 255,
                created,
                expires: 0,
            },
        ],
        user_ids: vec![ProviderUserId {
            name: name.to_string(),
            email: email.to_string(),
        }],
        expired,
        has_secret,
    }
}

/// alice: valid, private key available.
pub fn alice() -> ProviderKey {
    make_key(ALICE_FPR, "Alice", ALICE_MAIL, 1_700_000_000, false, true)
}

/// bob: expired, public key only.
pub fn bob() -> ProviderKey {
    make_key(BOB_FPR, "Bob", BOB_MAIL, 1_600_000_000, true, false)
}

/// The two-key scenario keyring.
pub fn alice_and_bob() -> super::FakeKeyring {
    super::FakeKeyring::new(vec![alice(), bob()])
}
