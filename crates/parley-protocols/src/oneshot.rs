//! One-shot asymmetric encryption.
//!
//! alice encrypts a single bounded message under bob's RSA public key
//! (OAEP, SHA-256) and sends the ciphertext as one message. bob decrypts
//! with his private key. Oversized plaintext never reaches the wire: alice
//! fails with `MessageTooLong` and bob sees the link close.

use parley_core::{Agent, Environment, EnvironmentError};
use parley_crypto::KeyPair;

use crate::error::ProtocolError;

/// Sender
pub const ALICE: &str = "alice";

/// Key holder
pub const BOB: &str = "bob";

/// One-shot scenario parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneShotConfig {
    /// Plaintext alice encrypts
    pub message: Vec<u8>,
}

impl Default for OneShotConfig {
    fn default() -> Self {
        Self { message: b"Hello Bob, I am using RSA, Alice.".to_vec() }
    }
}

/// Per-agent result of the one-shot scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneShotOutcome {
    /// alice sent a ciphertext of this many bytes
    Sent {
        /// Ciphertext length, equal to the modulus length
        ciphertext_len: usize,
    },
    /// bob recovered this plaintext
    Received(Vec<u8>),
}

/// Build the two-party environment without starting it.
///
/// alice only gets bob's public half.
pub fn environment(
    config: &OneShotConfig,
    recipient: &KeyPair,
) -> Result<Environment<OneShotOutcome>, EnvironmentError> {
    let mut env = Environment::new();

    let message = config.message.clone();
    let public = recipient.public().clone();
    env.add(Agent::new(ALICE, move |mailbox| async move {
        let ciphertext = public.encrypt(&message)?;
        let ciphertext_len = ciphertext.len();

        mailbox.send(BOB, ciphertext)?;
        tracing::info!(plaintext_len = message.len(), ciphertext_len, "ciphertext sent");
        Ok(OneShotOutcome::Sent { ciphertext_len })
    }))?;

    let private = recipient.clone();
    env.add(Agent::new(BOB, move |mut mailbox| async move {
        let ciphertext = mailbox.receive(ALICE).await?;
        let plaintext = private.decrypt(&ciphertext)?;

        tracing::info!(len = plaintext.len(), "message decrypted");
        Ok(OneShotOutcome::Received(plaintext))
    }))?;

    env.connect(ALICE, BOB)?;
    Ok(env)
}

/// Run the scenario and return bob's recovered plaintext.
pub async fn run(config: &OneShotConfig, recipient: &KeyPair) -> Result<Vec<u8>, ProtocolError> {
    collect(environment(config, recipient)?).await
}

/// Start a prepared one-shot environment and return bob's plaintext.
pub async fn collect(env: Environment<OneShotOutcome>) -> Result<Vec<u8>, ProtocolError> {
    let mut outcomes = env.start().await?;

    match outcomes.take(BOB) {
        Some(OneShotOutcome::Received(plaintext)) => Ok(plaintext),
        _ => Err(ProtocolError::MissingOutcome(BOB)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_fits_default_key() {
        let message = OneShotConfig::default().message;

        // 2048-bit modulus with OAEP-SHA-256
        assert!(message.len() <= 190);
    }
}
