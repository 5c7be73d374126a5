//! Passphrase-derived blob encryption
//!
//! Files are encrypted before they leave the device:
//!
//! ```text
//! secret (lower-cased identity)
//!      │
//!      ▼ PBKDF2-HMAC-SHA256(salt = "storyproof", 100_000 rounds)
//! 256-bit key
//!      │
//!      ▼ AES-256-GCM, fresh 96-bit IV
//! EncryptedBlob = IV || ciphertext || tag
//! ```
//!
//! The salt is fixed application-wide, so the same secret always derives the
//! same key. That lets any holder of the secret open every blob they produced.
//! See `identity` for why the secret is weak.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;
use thiserror::Error;
use zeroize::Zeroizing;

/// Fixed application-wide PBKDF2 salt.
pub const KDF_SALT: &[u8] = b"storyproof";

/// PBKDF2 iteration count.
pub const KDF_ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

/// AES-GCM IV length in bytes.
pub const IV_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

const KEY_LEN: usize = 32;

/// Errors from the encryption primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Primitive failure while sealing. Not a normal control path.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Malformed blob or authentication failure (wrong secret, tampering).
    #[error("Decryption failed: {0}")]
    Decryption(String),
}

/// IV followed by AES-256-GCM ciphertext (tag appended).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob(Vec<u8>);

impl EncryptedBlob {
    /// Wrap raw blob bytes, rejecting anything too short to hold an IV and tag.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.len() < IV_LEN + TAG_LEN {
            return Err(CryptoError::Decryption(format!(
                "Blob too short: {} bytes, need at least {}",
                bytes.len(),
                IV_LEN + TAG_LEN
            )));
        }
        Ok(Self(bytes))
    }

    pub fn iv(&self) -> &[u8] {
        &self.0[..IV_LEN]
    }

    /// Ciphertext including the trailing tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.0[IV_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// AES-256 key derived from a secret. Zeroized on drop.
pub struct DerivedKey {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl DerivedKey {
    /// Run PBKDF2 over `secret`. Deliberately slow.
    pub fn derive(secret: &str) -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            KDF_ITERATIONS,
            KDF_SALT,
            secret.as_bytes(),
            &mut key[..],
        );
        Self { key }
    }

    fn aead_key(&self) -> Result<LessSafeKey, String> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.key[..])
            .map_err(|e| format!("Key creation failed: {}", e))?;
        Ok(LessSafeKey::new(unbound))
    }

    /// Encrypt `plaintext` under a fresh random IV.
    pub fn seal(&self, plaintext: &[u8]) -> Result<EncryptedBlob, CryptoError> {
        let key = self.aead_key().map_err(CryptoError::Encryption)?;

        let iv = generate_iv()?;
        let nonce = Nonce::assume_unique_for_key(iv);

        let mut buffer = plaintext.to_vec();
        key.seal_in_place_append_tag(nonce, Aad::empty(), &mut buffer)
            .map_err(|e| CryptoError::Encryption(format!("Seal failed: {}", e)))?;

        let mut combined = Vec::with_capacity(IV_LEN + buffer.len());
        combined.extend_from_slice(&iv);
        combined.extend_from_slice(&buffer);
        Ok(EncryptedBlob(combined))
    }

    /// Decrypt and authenticate a blob.
    pub fn open(&self, blob: &EncryptedBlob) -> Result<Vec<u8>, CryptoError> {
        let key = self.aead_key().map_err(CryptoError::Decryption)?;

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(blob.iv());
        let nonce = Nonce::assume_unique_for_key(iv);

        let mut buffer = blob.ciphertext().to_vec();
        let plaintext_len = key
            .open_in_place(nonce, Aad::empty(), &mut buffer)
            .map_err(|_| CryptoError::Decryption("Authentication tag mismatch".to_string()))?
            .len();
        buffer.truncate(plaintext_len);
        Ok(buffer)
    }
}

fn generate_iv() -> Result<[u8; IV_LEN], CryptoError> {
    let rng = SystemRandom::new();
    let mut iv = [0u8; IV_LEN];
    rng.fill(&mut iv)
        .map_err(|_| CryptoError::Encryption("RNG failure".to_string()))?;
    Ok(iv)
}

/// Encrypt `bytes` under a key derived from `secret`.
pub fn encrypt(bytes: &[u8], secret: &str) -> Result<EncryptedBlob, CryptoError> {
    DerivedKey::derive(secret).seal(bytes)
}

/// Decrypt raw blob bytes produced by [`encrypt`].
pub fn decrypt(blob: &[u8], secret: &str) -> Result<Vec<u8>, CryptoError> {
    let blob = EncryptedBlob::from_bytes(blob.to_vec())?;
    DerivedKey::derive(secret).open(&blob)
}
