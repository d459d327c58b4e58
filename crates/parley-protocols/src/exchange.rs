//! Symmetric AEAD round-trip between two parties.
//!
//! `alice` and `bob` share one [`SymmetricKey`]. Each round alice seals her
//! message and sends `(ciphertext, nonce)`; bob opens it, then answers with
//! his own sealed message, which alice opens. Every seal draws its own nonce,
//! so across all rounds and both key holders no nonce is reused.
//!
//! ```text
//! alice                         bob
//!   │── ciphertext ─────────────▶│
//!   │── nonce ──────────────────▶│  open (fail closed)
//!   │◀──────────────── ciphertext│
//!   │◀───────────────────── nonce│
//!   open (fail closed)           │
//! ```

use parley_core::{Agent, Environment, EnvironmentError};
use parley_crypto::{NONCE_SIZE, SymmetricKey};

use crate::{
    error::ProtocolError,
    wire::{receive_sealed, send_sealed},
};

/// Initiating party
pub const ALICE: &str = "alice";

/// Responding party
pub const BOB: &str = "bob";

/// Round-trip exchange parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Number of request/reply rounds
    pub rounds: usize,
    /// Plaintext alice sends every round
    pub initiator_message: Vec<u8>,
    /// Plaintext bob answers with every round
    pub responder_message: Vec<u8>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            initiator_message: b"I hope you get this message intact and in secret. Kisses, Alice."
                .to_vec(),
            responder_message: b"I love you too".to_vec(),
        }
    }
}

/// What one party saw during the exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    /// Plaintexts opened from the peer, in round order
    pub received: Vec<Vec<u8>>,
    /// Nonces this party generated, in round order
    pub sent_nonces: Vec<[u8; NONCE_SIZE]>,
}

/// Both parties' transcripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeReport {
    /// alice's view
    pub alice: Transcript,
    /// bob's view
    pub bob: Transcript,
}

impl ExchangeReport {
    /// Every nonce generated under the shared key, alice's first.
    pub fn all_nonces(&self) -> impl Iterator<Item = &[u8; NONCE_SIZE]> {
        self.alice.sent_nonces.iter().chain(&self.bob.sent_nonces)
    }
}

/// Build the two-party environment without starting it.
///
/// Callers may add interceptors before starting it.
pub fn environment(
    config: &ExchangeConfig,
    key: &SymmetricKey,
) -> Result<Environment<Transcript>, EnvironmentError> {
    let mut env = Environment::new();

    let rounds = config.rounds;
    let message = config.initiator_message.clone();
    let alice_key = key.clone();
    env.add(Agent::new(ALICE, move |mut mailbox| async move {
        let mut transcript = Transcript::default();

        for round in 0..rounds {
            let nonce = send_sealed(&mailbox, BOB, &alice_key, &message)?;
            transcript.sent_nonces.push(nonce);

            let reply = receive_sealed(&mut mailbox, BOB, &alice_key).await?;
            tracing::info!(round, len = reply.len(), "reply opened");
            transcript.received.push(reply);
        }

        Ok(transcript)
    }))?;

    let reply = config.responder_message.clone();
    let bob_key = key.clone();
    env.add(Agent::new(BOB, move |mut mailbox| async move {
        let mut transcript = Transcript::default();

        for round in 0..rounds {
            let request = receive_sealed(&mut mailbox, ALICE, &bob_key).await?;
            tracing::info!(round, len = request.len(), "request opened");
            transcript.received.push(request);

            let nonce = send_sealed(&mailbox, ALICE, &bob_key, &reply)?;
            transcript.sent_nonces.push(nonce);
        }

        Ok(transcript)
    }))?;

    env.connect(ALICE, BOB)?;
    Ok(env)
}

/// Run the exchange to completion.
pub async fn run(config: &ExchangeConfig, key: &SymmetricKey) -> Result<ExchangeReport, ProtocolError> {
    collect(environment(config, key)?).await
}

/// Start a prepared exchange environment and gather both transcripts.
pub async fn collect(env: Environment<Transcript>) -> Result<ExchangeReport, ProtocolError> {
    let mut outcomes = env.start().await?;

    let alice = outcomes.take(ALICE).ok_or(ProtocolError::MissingOutcome(ALICE))?;
    let bob = outcomes.take(BOB).ok_or(ProtocolError::MissingOutcome(BOB))?;

    Ok(ExchangeReport { alice, bob })
}
