//! Property-based tests for hashing and blob encryption
//!
//! Tests for:
//! - Hashing: determinism, commitment sensitivity to the secret
//! - Encryption: AES-256-GCM roundtrip, key isolation, IV uniqueness
//!
//! Key derivation is deliberately slow, so keys are derived once per case and
//! the case count is kept low.

use super::encryptor::{decrypt, encrypt, CryptoError, DerivedKey};
use crate::hashing::{commitment, digest};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: digest is stable across repeated calls
    #[test]
    fn digest_is_deterministic(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert_eq!(digest(&data), digest(&data));
    }

    /// Property: a hex rendering always parses back and matches case-insensitively
    #[test]
    fn digest_hex_matches_either_case(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let address = digest(&data);
        prop_assert!(address.matches_hex(&address.to_hex()));
        prop_assert!(address.matches_hex(&address.to_hex().to_uppercase()));
    }

    /// Property: commitments differ when secrets differ
    #[test]
    fn commitment_binds_secret(
        data in prop::collection::vec(any::<u8>(), 0..512),
        secret1 in "0x[0-9a-f]{1,40}",
        secret2 in "0x[0-9a-f]{1,40}",
    ) {
        prop_assume!(secret1 != secret2);
        let address = digest(&data);
        prop_assert_ne!(commitment(&address, &secret1), commitment(&address, &secret2));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Property: Encryption roundtrip preserves data
    #[test]
    fn encryption_roundtrip_preserves_data(
        data in prop::collection::vec(any::<u8>(), 0..50_000),
        secret in "0x[0-9a-f]{40}",
    ) {
        let blob = encrypt(&data, &secret).unwrap();
        let decrypted = decrypt(blob.as_bytes(), &secret).unwrap();
        prop_assert_eq!(decrypted, data, "Roundtrip should preserve data exactly");
    }

    /// Property: Decryption fails with a different secret
    #[test]
    fn decryption_fails_with_wrong_secret(
        data in prop::collection::vec(any::<u8>(), 0..1000),
        secret1 in "0x[0-9a-f]{40}",
        secret2 in "0x[0-9a-f]{40}",
    ) {
        prop_assume!(secret1 != secret2);
        let blob = encrypt(&data, &secret1).unwrap();
        let result = decrypt(blob.as_bytes(), &secret2);
        prop_assert!(matches!(result, Err(CryptoError::Decryption(_))));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: IVs never repeat under one key
    #[test]
    fn iv_unique_per_seal(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let key = shared_key();
        let first = key.seal(&data).unwrap();
        let second = key.seal(&data).unwrap();
        prop_assert_ne!(first.iv(), second.iv());
        prop_assert_eq!(key.open(&first).unwrap(), data.clone());
        prop_assert_eq!(key.open(&second).unwrap(), data);
    }
}

fn shared_key() -> &'static DerivedKey {
    static KEY: std::sync::OnceLock<DerivedKey> = std::sync::OnceLock::new();
    KEY.get_or_init(|| DerivedKey::derive("0xproptest"))
}
