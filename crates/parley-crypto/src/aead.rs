//! Authenticated encryption with `AES-256-GCM` or `ChaCha20-Poly1305`.
//!
//! A [`SymmetricKey`] binds key bytes to one algorithm. Both algorithms use a
//! 96-bit nonce and a 128-bit tag, and the tag is appended to the ciphertext.
//!
//! Every [`SymmetricKey::seal`] call draws a fresh random nonce. The nonce is
//! returned next to the ciphertext so the caller can transmit it; it is never
//! an input to sealing.

use std::fmt;

use aes_gcm::{Aes256Gcm, Nonce};
use chacha20poly1305::{
    ChaCha20Poly1305,
    aead::{Aead, KeyInit},
};
use rand::{CryptoRng, RngCore, rngs::OsRng};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Symmetric key size (32 bytes) for both algorithms
pub const KEY_SIZE: usize = 32;

/// Nonce size (12 bytes) for both algorithms
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (16 bytes) for both algorithms
pub const TAG_SIZE: usize = 16;

/// AEAD algorithm a [`SymmetricKey`] is used with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AeadAlgorithm {
    /// AES-256 in Galois/Counter Mode
    Aes256Gcm,
    /// ChaCha20 stream cipher with Poly1305 authenticator
    ChaCha20Poly1305,
}

impl fmt::Display for AeadAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aes256Gcm => f.write_str("AES-256-GCM"),
            Self::ChaCha20Poly1305 => f.write_str("ChaCha20-Poly1305"),
        }
    }
}

/// Output of a seal operation: ciphertext with appended tag, and the nonce
/// that was generated for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Ciphertext including the 16-byte authentication tag
    pub ciphertext: Vec<u8>,
    /// The nonce generated for this seal
    pub nonce: [u8; NONCE_SIZE],
}

impl Sealed {
    /// Authentication tag (last 16 bytes of the ciphertext).
    pub fn tag(&self) -> &[u8] {
        let split = self.ciphertext.len().saturating_sub(TAG_SIZE);
        &self.ciphertext[split..]
    }

    /// Plaintext length (ciphertext length minus authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_SIZE)
    }
}

/// A pre-shared symmetric key for one AEAD algorithm.
///
/// Immutable after creation. Cloning copies the key bytes; every copy is
/// zeroized when dropped.
#[derive(Clone)]
pub struct SymmetricKey {
    algorithm: AeadAlgorithm,
    key: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Generate a key from the OS cryptographic RNG.
    pub fn generate(algorithm: AeadAlgorithm) -> Self {
        Self::generate_with_rng(algorithm, &mut OsRng)
    }

    /// Generate a key from the given RNG.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(algorithm: AeadAlgorithm, rng: &mut R) -> Self {
        let mut key = [0u8; KEY_SIZE];
        rng.fill_bytes(&mut key);
        Self { algorithm, key }
    }

    /// Wrap existing key bytes.
    pub fn from_bytes(algorithm: AeadAlgorithm, key: [u8; KEY_SIZE]) -> Self {
        Self { algorithm, key }
    }

    /// Algorithm this key is bound to.
    pub fn algorithm(&self) -> AeadAlgorithm {
        self.algorithm
    }

    /// Encrypt `plaintext` under a fresh nonce from the OS RNG.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Sealed, CryptoError> {
        self.seal_with_rng(plaintext, &mut OsRng)
    }

    /// Encrypt `plaintext` under a fresh nonce drawn from `rng`.
    ///
    /// Crate-private: a reseeded RNG under the same key repeats nonces, so
    /// [`seal`](Self::seal) is the only public sealing path.
    pub(crate) fn seal_with_rng<R: RngCore + CryptoRng>(
        &self,
        plaintext: &[u8],
        rng: &mut R,
    ) -> Result<Sealed, CryptoError> {
        let mut nonce = [0u8; NONCE_SIZE];
        rng.fill_bytes(&mut nonce);

        let ciphertext = match self.algorithm {
            AeadAlgorithm::Aes256Gcm => {
                Aes256Gcm::new((&self.key).into()).encrypt(Nonce::from_slice(&nonce), plaintext)
            },
            AeadAlgorithm::ChaCha20Poly1305 => ChaCha20Poly1305::new((&self.key).into())
                .encrypt(chacha20poly1305::Nonce::from_slice(&nonce), plaintext),
        }
        .map_err(|_| CryptoError::Encryption {
            reason: format!("{} rejected a {}-byte plaintext", self.algorithm, plaintext.len()),
        })?;

        Ok(Sealed { ciphertext, nonce })
    }

    /// Decrypt and authenticate `ciphertext` (with appended tag) under `nonce`.
    ///
    /// # Errors
    ///
    /// - `InvalidNonceLength`: nonce is not 12 bytes
    /// - `Authentication`: tag mismatch (tamper, wrong key or wrong nonce)
    pub fn open(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if nonce.len() != NONCE_SIZE {
            return Err(CryptoError::InvalidNonceLength {
                expected: NONCE_SIZE,
                actual: nonce.len(),
            });
        }

        match self.algorithm {
            AeadAlgorithm::Aes256Gcm => {
                Aes256Gcm::new((&self.key).into()).decrypt(Nonce::from_slice(nonce), ciphertext)
            },
            AeadAlgorithm::ChaCha20Poly1305 => ChaCha20Poly1305::new((&self.key).into())
                .decrypt(chacha20poly1305::Nonce::from_slice(nonce), ciphertext),
        }
        .map_err(|_| CryptoError::Authentication)
    }

    /// Open a [`Sealed`] value.
    pub fn open_sealed(&self, sealed: &Sealed) -> Result<Vec<u8>, CryptoError> {
        self.open(&sealed.ciphertext, &sealed.nonce)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("algorithm", &self.algorithm)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}
