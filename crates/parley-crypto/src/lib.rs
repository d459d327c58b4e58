//! Parley Cryptographic Capabilities
//!
//! Thin, typed wrappers over RustCrypto primitives. Protocol code never touches
//! a cipher instance directly; it holds key material and calls `seal`/`open`,
//! `encrypt`/`decrypt` or [`sha256`].
//!
//! # Capabilities
//!
//! ```text
//! SymmetricKey ──seal──▶ Sealed { ciphertext || tag, nonce }
//!      │                          │
//!      └────────────open◀─────────┘   (fails closed on tag mismatch)
//!
//! PublicKey ──encrypt (RSA-OAEP/SHA-256)──▶ ciphertext
//! KeyPair  ──decrypt──▶ plaintext            (fails closed on bad padding)
//!
//! sha256(bytes) ──▶ Digest (32 bytes)
//! ```
//!
//! # Security
//!
//! Nonce freshness:
//! - Sealing draws a new random 96-bit nonce on every call
//! - There is no sealing entry point that accepts a caller-chosen nonce, so a
//!   key holder cannot reuse one by accident
//!
//! Fail closed:
//! - AEAD tag mismatch -> [`CryptoError::Authentication`], no plaintext
//! - RSA padding failure -> [`CryptoError::Decryption`], no plaintext
//! - Oversized RSA plaintext -> [`CryptoError::MessageTooLong`], never
//!   truncated
//!
//! Key hygiene:
//! - Symmetric key bytes are zeroized on drop
//! - Keys are immutable after creation and safe to share between tasks

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod asymmetric;
pub mod digest;
mod error;

pub use aead::{AeadAlgorithm, KEY_SIZE, NONCE_SIZE, Sealed, SymmetricKey, TAG_SIZE};
pub use asymmetric::{DEFAULT_MODULUS_BITS, KeyPair, PublicKey};
pub use digest::{DIGEST_SIZE, Digest, sha256};
pub use error::CryptoError;
