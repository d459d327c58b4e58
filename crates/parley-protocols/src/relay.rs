//! Three-party hash relay.
//!
//! The source ships a bulk payload to the sink over a fast link that offers
//! no integrity. Integrity comes from a second path: the payload's SHA-256
//! digest travels source → relay → sink over size-limited links, sealed
//! hop by hop. Source and sink share no key; the relay re-seals.
//!
//! ```text
//!            bulk payload (unauthenticated)
//!   alice ────────────────────────────────────────▶ bob
//!     │                                              ▲
//!     │ seal(digest, key A)                          │ seal(digest, key B)
//!     ▼                                              │
//!   public-space ── open with A, reseal with B ──────┘
//! ```
//!
//! The sink never crashes on a bad digest path. A forged or truncated hop,
//! or a relay that refused to forward, ends in [`Verdict::Invalid`].

use bytes::Bytes;
use parley_core::{Agent, AgentError, Environment, EnvironmentError, LinkSettings};
use parley_crypto::{AeadAlgorithm, Digest, SymmetricKey, sha256};
use rand::{RngCore, SeedableRng, rngs::StdRng};

use crate::{
    error::ProtocolError,
    wire::{receive_sealed, send_sealed},
};

/// Payload source
pub const SOURCE: &str = "alice";

/// Digest relay
pub const RELAY: &str = "public-space";

/// Payload sink
pub const SINK: &str = "bob";

/// Default bulk payload length (200 MiB).
pub const DEFAULT_PAYLOAD_LEN: usize = 200 * 1024 * 1024;

/// Default per-message limit on the digest links.
pub const DEFAULT_SECURE_LINK_LIMIT: usize = 1024;

/// Hop keys. The source and the sink never share one.
#[derive(Debug, Clone)]
pub struct RelayKeys {
    /// Key A, shared by source and relay
    pub source_relay: SymmetricKey,
    /// Key B, shared by relay and sink
    pub relay_sink: SymmetricKey,
}

impl RelayKeys {
    /// Fresh keys: ChaCha20-Poly1305 for hop A, AES-256-GCM for hop B.
    pub fn generate() -> Self {
        Self {
            source_relay: SymmetricKey::generate(AeadAlgorithm::ChaCha20Poly1305),
            relay_sink: SymmetricKey::generate(AeadAlgorithm::Aes256Gcm),
        }
    }
}

/// Bulk payload the source ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Random bytes of the given length, generated inside the source task
    Random(usize),
    /// Fixed bytes
    Bytes(Bytes),
}

impl Payload {
    fn materialize(self) -> Bytes {
        match self {
            Self::Random(len) => {
                let mut buf = vec![0u8; len];
                StdRng::from_entropy().fill_bytes(&mut buf);
                Bytes::from(buf)
            },
            Self::Bytes(bytes) => bytes,
        }
    }
}

/// Relay scenario parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// What the source ships over the bulk link
    pub payload: Payload,
    /// Limits on the source↔relay and relay↔sink links
    pub secure_link: LinkSettings,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            payload: Payload::Random(DEFAULT_PAYLOAD_LEN),
            secure_link: LinkSettings::limited(DEFAULT_SECURE_LINK_LIMIT),
        }
    }
}

/// Sink's judgement of the bulk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Relayed digest matches the received payload
    Valid,
    /// Mismatch, forged hop, or no digest arrived
    Invalid,
}

/// Per-agent result of the relay scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Source shipped a payload with this digest
    Sent {
        /// Digest of the payload as sent
        digest: Digest,
        /// Payload length
        len: usize,
    },
    /// Relay opened and re-sealed the digest
    Forwarded,
    /// Relay could not authenticate the digest and forwarded nothing
    Rejected,
    /// Sink's verdict
    Verdict(Verdict),
}

/// Collected results of one relay run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReport {
    /// Digest the source computed
    pub sent_digest: Digest,
    /// Bytes shipped over the bulk link
    pub payload_len: usize,
    /// Whether the relay forwarded the digest
    pub relay: RelayOutcome,
    /// Sink's verdict
    pub verdict: Verdict,
}

/// Build the three-party environment without starting it.
///
/// The bulk link `alice <-> bob` is unlimited; both digest links carry
/// `config.secure_link`. Tampering simulations install interceptors on the
/// returned environment.
pub fn environment(
    config: &RelayConfig,
    keys: &RelayKeys,
) -> Result<Environment<RelayOutcome>, EnvironmentError> {
    let mut env = Environment::new();

    let payload = config.payload.clone();
    let key_a = keys.source_relay.clone();
    env.add(Agent::new(SOURCE, move |mailbox| async move {
        let payload = payload.materialize();
        let len = payload.len();
        let digest = sha256(&payload);

        mailbox.send(SINK, payload)?;
        tracing::info!(len, %digest, "payload shipped");

        send_sealed(&mailbox, RELAY, &key_a, digest.as_bytes())?;
        Ok(RelayOutcome::Sent { digest, len })
    }))?;

    let key_a = keys.source_relay.clone();
    let key_b = keys.relay_sink.clone();
    env.add(Agent::new(RELAY, move |mut mailbox| async move {
        let digest = match receive_sealed(&mut mailbox, SOURCE, &key_a).await {
            Ok(digest) => digest,
            Err(AgentError::Crypto(error)) => {
                tracing::warn!(%error, "digest from source rejected, not forwarding");
                return Ok(RelayOutcome::Rejected);
            },
            Err(error) => return Err(error),
        };

        send_sealed(&mailbox, SINK, &key_b, &digest)?;
        tracing::info!("digest forwarded");
        Ok(RelayOutcome::Forwarded)
    }))?;

    let key_b = keys.relay_sink.clone();
    env.add(Agent::new(SINK, move |mut mailbox| async move {
        let payload = mailbox.receive(SOURCE).await?;
        let local = sha256(&payload);

        let verdict = match receive_sealed(&mut mailbox, RELAY, &key_b).await {
            Ok(relayed) if relayed.as_slice() == local.as_bytes() => Verdict::Valid,
            Ok(_) => {
                tracing::warn!(%local, "relayed digest does not match payload");
                Verdict::Invalid
            },
            Err(AgentError::Crypto(error)) => {
                tracing::warn!(%error, "relayed digest failed authentication");
                Verdict::Invalid
            },
            Err(error) if error.is_disconnect() => {
                tracing::warn!(%error, "relay ended without forwarding a digest");
                Verdict::Invalid
            },
            Err(error) => return Err(error),
        };

        tracing::info!(len = payload.len(), ?verdict, "payload judged");
        Ok(RelayOutcome::Verdict(verdict))
    }))?;

    env.connect(SOURCE, SINK)?;
    env.connect_with(SOURCE, RELAY, config.secure_link)?;
    env.connect_with(RELAY, SINK, config.secure_link)?;
    Ok(env)
}

/// Run the relay scenario to completion.
pub async fn run(config: &RelayConfig, keys: &RelayKeys) -> Result<RelayReport, ProtocolError> {
    collect(environment(config, keys)?).await
}

/// Start a prepared relay environment and gather the report.
pub async fn collect(env: Environment<RelayOutcome>) -> Result<RelayReport, ProtocolError> {
    let mut outcomes = env.start().await?;

    let Some(RelayOutcome::Sent { digest, len }) = outcomes.take(SOURCE) else {
        return Err(ProtocolError::MissingOutcome(SOURCE));
    };
    let relay = outcomes.take(RELAY).ok_or(ProtocolError::MissingOutcome(RELAY))?;
    let Some(RelayOutcome::Verdict(verdict)) = outcomes.take(SINK) else {
        return Err(ProtocolError::MissingOutcome(SINK));
    };

    Ok(RelayReport { sent_digest: digest, payload_len: len, relay, verdict })
}
