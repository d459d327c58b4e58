//! One-shot RSA-OAEP encryption with SHA-256.
//!
//! The plaintext bound is `k - 2 * hLen - 2` bytes, where `k` is the modulus
//! length in bytes and `hLen` the SHA-256 output length. A 2048-bit key
//! therefore carries at most 190 bytes. Longer input is rejected, never
//! truncated or silently chunked.

use std::fmt;

use rand::{CryptoRng, RngCore, rngs::OsRng};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey, traits::PublicKeyParts};
use sha2::Sha256;

use crate::{digest::DIGEST_SIZE, error::CryptoError};

/// Default RSA modulus size in bits
pub const DEFAULT_MODULUS_BITS: usize = 2048;

/// OAEP padding overhead with SHA-256 as both label hash and MGF1 hash
const OAEP_OVERHEAD: usize = 2 * DIGEST_SIZE + 2;

/// An RSA public key used for OAEP encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Modulus length in bytes, which is also the ciphertext length.
    pub fn modulus_len(&self) -> usize {
        self.0.size()
    }

    /// Largest plaintext this key can encrypt in one message.
    pub fn max_plaintext_len(&self) -> usize {
        self.modulus_len().saturating_sub(OAEP_OVERHEAD)
    }

    /// Encrypt `plaintext` with OAEP padding randomness from the OS RNG.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.encrypt_with_rng(plaintext, &mut OsRng)
    }

    /// Encrypt `plaintext` with OAEP padding randomness from `rng`.
    ///
    /// # Errors
    ///
    /// - `MessageTooLong`: plaintext exceeds [`Self::max_plaintext_len`]
    pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
        &self,
        plaintext: &[u8],
        rng: &mut R,
    ) -> Result<Vec<u8>, CryptoError> {
        let max = self.max_plaintext_len();
        if plaintext.len() > max {
            return Err(CryptoError::MessageTooLong { len: plaintext.len(), max });
        }

        self.0
            .encrypt(rng, Oaep::new::<Sha256>(), plaintext)
            .map_err(|e| CryptoError::Encryption { reason: e.to_string() })
    }
}

/// An RSA key pair. Only the holder of the pair can decrypt.
#[derive(Clone)]
pub struct KeyPair {
    private: RsaPrivateKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a key pair of `bits` modulus size from the OS RNG.
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        Self::generate_with_rng(bits, &mut OsRng)
    }

    /// Generate a key pair of `bits` modulus size from `rng`.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(
        bits: usize,
        rng: &mut R,
    ) -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::new(rng, bits)
            .map_err(|e| CryptoError::KeyGeneration { reason: e.to_string() })?;
        let public = PublicKey(RsaPublicKey::from(&private));
        Ok(Self { private, public })
    }

    /// Public half, safe to hand to any sender.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// Decrypt an OAEP ciphertext.
    ///
    /// # Errors
    ///
    /// - `Decryption`: wrong key, bad padding, or wrong ciphertext length
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.private
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|e| CryptoError::Decryption { reason: e.to_string() })
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("modulus_bits", &(self.public.modulus_len() * 8))
            .field("private", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    fn test_pair(seed: u64) -> KeyPair {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        KeyPair::generate_with_rng(DEFAULT_MODULUS_BITS, &mut rng).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let pair = test_pair(1);
        let message = b"Hello Bob, I am using RSA, Alice.";

        let ciphertext = pair.public().encrypt(message).unwrap();

        assert_eq!(ciphertext.len(), pair.public().modulus_len());
        assert_eq!(pair.decrypt(&ciphertext).unwrap(), message);
    }

    #[test]
    fn max_plaintext_len_for_2048_bits() {
        let pair = test_pair(2);

        assert_eq!(pair.public().modulus_len(), 256);
        assert_eq!(pair.public().max_plaintext_len(), 190);
    }

    #[test]
    fn plaintext_at_bound_roundtrips() {
        let pair = test_pair(3);
        let message = vec![0xA5u8; pair.public().max_plaintext_len()];

        let ciphertext = pair.public().encrypt(&message).unwrap();
        assert_eq!(pair.decrypt(&ciphertext).unwrap(), message);
    }

    #[test]
    fn plaintext_beyond_bound_is_rejected() {
        let pair = test_pair(4);
        let max = pair.public().max_plaintext_len();
        let message = vec![0xA5u8; max + 1];

        assert_eq!(
            pair.public().encrypt(&message),
            Err(CryptoError::MessageTooLong { len: max + 1, max })
        );
    }

    #[test]
    fn wrong_private_key_fails_closed() {
        let bob = test_pair(5);
        let eve = test_pair(6);

        let ciphertext = bob.public().encrypt(b"for bob only").unwrap();

        assert!(matches!(eve.decrypt(&ciphertext), Err(CryptoError::Decryption { .. })));
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let pair = test_pair(7);
        let mut ciphertext = pair.public().encrypt(b"intact").unwrap();
        ciphertext[10] ^= 0x01;

        assert!(matches!(pair.decrypt(&ciphertext), Err(CryptoError::Decryption { .. })));
    }

    #[test]
    fn wrong_length_ciphertext_fails_closed() {
        let pair = test_pair(8);

        assert!(matches!(pair.decrypt(&[0u8; 17]), Err(CryptoError::Decryption { .. })));
    }
}
