//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors from sealing, opening, hashing and asymmetric operations.
///
/// Every variant is terminal for the operation that produced it: no partial
/// plaintext is ever returned alongside an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// AEAD tag verification failed (wrong key, nonce, ciphertext or tag)
    #[error("authentication failed")]
    Authentication,

    /// Received nonce does not have the algorithm's fixed length
    #[error("invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonceLength {
        /// Length required by the algorithm
        expected: usize,
        /// Length that was provided
        actual: usize,
    },

    /// Received digest does not have the fixed SHA-256 length
    #[error("invalid digest length: expected {expected} bytes, got {actual}")]
    InvalidDigestLength {
        /// Length required (32)
        expected: usize,
        /// Length that was provided
        actual: usize,
    },

    /// Plaintext exceeds what the key and padding scheme can carry
    #[error("message too long: {len} bytes exceeds maximum of {max}")]
    MessageTooLong {
        /// Plaintext length
        len: usize,
        /// Maximum accepted plaintext length
        max: usize,
    },

    /// Encryption was rejected by the underlying primitive
    #[error("encryption failed: {reason}")]
    Encryption {
        /// Description from the primitive
        reason: String,
    },

    /// Asymmetric decryption or padding check failed
    #[error("decryption failed: {reason}")]
    Decryption {
        /// Description from the primitive
        reason: String,
    },

    /// Key pair generation failed
    #[error("key generation failed: {reason}")]
    KeyGeneration {
        /// Description from the primitive
        reason: String,
    },
}
