//! Sealed-message framing shared by the AEAD protocols.
//!
//! A sealed value travels as two messages on the same leg: the ciphertext
//! (tag appended) first, then the nonce.

use parley_core::{AgentError, Mailbox};
use parley_crypto::{NONCE_SIZE, SymmetricKey};

/// Seal `plaintext` under a fresh nonce and send `(ciphertext, nonce)`.
///
/// Returns the nonce that was used.
pub(crate) fn send_sealed(
    mailbox: &Mailbox,
    peer: &str,
    key: &SymmetricKey,
    plaintext: &[u8],
) -> Result<[u8; NONCE_SIZE], AgentError> {
    let sealed = key.seal(plaintext)?;
    let nonce = sealed.nonce;

    mailbox.send(peer, sealed.ciphertext)?;
    mailbox.send(peer, nonce.to_vec())?;

    tracing::debug!(to = peer, algorithm = %key.algorithm(), "sealed message sent");
    Ok(nonce)
}

/// Receive `(ciphertext, nonce)` from `peer` and open it.
///
/// Fails closed: a tag mismatch yields `Crypto(Authentication)` and no
/// plaintext.
pub(crate) async fn receive_sealed(
    mailbox: &mut Mailbox,
    peer: &str,
    key: &SymmetricKey,
) -> Result<Vec<u8>, AgentError> {
    let ciphertext = mailbox.receive(peer).await?;
    let nonce = mailbox.receive(peer).await?;

    Ok(key.open(&ciphertext, &nonce)?)
}
