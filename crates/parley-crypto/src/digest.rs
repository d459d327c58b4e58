//! SHA-256 message digests.

use std::fmt;

use sha2::{Digest as _, Sha256};

use crate::error::CryptoError;

/// SHA-256 output size (32 bytes)
pub const DIGEST_SIZE: usize = 32;

/// A fixed-length SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    /// Parse a digest received as opaque bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; DIGEST_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidDigestLength { expected: DIGEST_SIZE, actual: bytes.len() }
        })?;
        Ok(Self(array))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> Digest {
    Digest(Sha256::digest(data).into())
}
