//! Round-trip exchange scenarios, honest and under attack.

use std::collections::HashSet;

use bytes::Bytes;
use parley_core::{AgentError, EnvironmentError};
use parley_crypto::{AeadAlgorithm, CryptoError, SymmetricKey};
use parley_protocols::{
    ProtocolError,
    exchange::{self, ALICE, BOB, ExchangeConfig},
};

fn flip_first_byte(message: Bytes) -> Bytes {
    let mut bytes = message.to_vec();
    if let Some(first) = bytes.first_mut() {
        *first ^= 0x01;
    }
    Bytes::from(bytes)
}

#[tokio::test]
async fn ten_rounds_deliver_both_messages() {
    let config = ExchangeConfig::default();
    let key = SymmetricKey::generate(AeadAlgorithm::Aes256Gcm);

    let report = exchange::run(&config, &key).await.unwrap();

    assert_eq!(report.bob.received.len(), 10);
    assert_eq!(report.alice.received.len(), 10);
    assert!(report.bob.received.iter().all(|m| *m == config.initiator_message));
    assert!(report.alice.received.iter().all(|m| *m == config.responder_message));
}

#[tokio::test]
async fn nonces_never_repeat_across_parties() {
    let key = SymmetricKey::generate(AeadAlgorithm::ChaCha20Poly1305);

    let report = exchange::run(&ExchangeConfig::default(), &key).await.unwrap();

    let nonces: HashSet<_> = report.all_nonces().collect();
    assert_eq!(nonces.len(), 20);
}

#[tokio::test]
async fn zero_rounds_exchange_nothing() {
    let config = ExchangeConfig { rounds: 0, ..ExchangeConfig::default() };
    let key = SymmetricKey::generate(AeadAlgorithm::Aes256Gcm);

    let report = exchange::run(&config, &key).await.unwrap();

    assert!(report.alice.received.is_empty());
    assert!(report.bob.received.is_empty());
}

#[tokio::test]
async fn tampered_request_fails_closed_at_bob() {
    let key = SymmetricKey::generate(AeadAlgorithm::Aes256Gcm);
    let mut env = exchange::environment(&ExchangeConfig::default(), &key).unwrap();
    env.intercept(ALICE, BOB, flip_first_byte).unwrap();

    let err = exchange::collect(env).await.unwrap_err();

    // bob's authentication failure outranks alice's consequent disconnect
    assert_eq!(
        err,
        ProtocolError::Environment(EnvironmentError::AgentFailed {
            agent: BOB.to_string(),
            source: AgentError::Crypto(CryptoError::Authentication),
        })
    );
}

#[tokio::test]
async fn tampered_reply_fails_closed_at_alice() {
    let key = SymmetricKey::generate(AeadAlgorithm::ChaCha20Poly1305);
    let mut env = exchange::environment(&ExchangeConfig::default(), &key).unwrap();
    env.intercept(BOB, ALICE, flip_first_byte).unwrap();

    let err = exchange::collect(env).await.unwrap_err();

    assert_eq!(
        err,
        ProtocolError::Environment(EnvironmentError::AgentFailed {
            agent: ALICE.to_string(),
            source: AgentError::Crypto(CryptoError::Authentication),
        })
    );
}

#[tokio::test]
async fn foreign_ciphertext_fails_closed() {
    let config = ExchangeConfig::default();
    let key = SymmetricKey::generate(AeadAlgorithm::Aes256Gcm);
    let mut env = exchange::environment(&config, &key).unwrap();
    // Replace bob's view of the first request with one sealed under another key
    let other = SymmetricKey::generate(AeadAlgorithm::Aes256Gcm);
    let forged = other.seal(&config.initiator_message).unwrap();
    let ciphertext = Bytes::from(forged.ciphertext);
    env.intercept(ALICE, BOB, move |message| {
        if message.len() == ciphertext.len() { ciphertext.clone() } else { message }
    })
    .unwrap();

    let err = exchange::collect(env).await.unwrap_err();

    assert!(matches!(
        err,
        ProtocolError::Environment(EnvironmentError::AgentFailed {
            source: AgentError::Crypto(CryptoError::Authentication),
            ..
        })
    ));
}
