//! Parley scenario runner.
//!
//! # Usage
//!
//! ```bash
//! # Ten AEAD round trips over AES-256-GCM
//! parley exchange
//!
//! # Hash relay with a 16 MiB payload and a forged bulk link
//! parley relay --payload-mib 16 --tamper bulk
//!
//! # One RSA-OAEP message under a 3072-bit key
//! parley oneshot --modulus-bits 3072 --message "hi bob"
//! ```

use bytes::Bytes;
use clap::{Parser, Subcommand, ValueEnum};
use parley_core::LinkSettings;
use parley_crypto::{AeadAlgorithm, DEFAULT_MODULUS_BITS, KeyPair, SymmetricKey};
use parley_protocols::{
    exchange::{self, ExchangeConfig},
    oneshot::{self, OneShotConfig},
    relay::{self, DEFAULT_SECURE_LINK_LIMIT, Payload, RELAY, RelayConfig, RelayKeys, SINK, SOURCE},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Parley protocol scenarios
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Run cryptographic protocol scenarios between in-process agents")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    scenario: Scenario,
}

#[derive(Subcommand, Debug)]
enum Scenario {
    /// Repeated AEAD request/reply between alice and bob
    Exchange {
        /// Number of round trips
        #[arg(long, default_value_t = 10)]
        rounds: usize,

        /// Cipher for the shared key
        #[arg(long, value_enum, default_value_t = Cipher::AesGcm)]
        algorithm: Cipher,
    },

    /// Bulk payload verified by a digest relayed through public-space
    Relay {
        /// Payload size in MiB
        #[arg(long, default_value_t = 200)]
        payload_mib: usize,

        /// Per-message limit on the digest links, in bytes
        #[arg(long, default_value_t = DEFAULT_SECURE_LINK_LIMIT)]
        secure_link_limit: usize,

        /// Flip a bit on one link to simulate an attacker
        #[arg(long, value_enum)]
        tamper: Option<TamperPoint>,
    },

    /// One RSA-OAEP message from alice to bob
    Oneshot {
        /// Message to encrypt
        #[arg(long)]
        message: Option<String>,

        /// RSA modulus size in bits
        #[arg(long, default_value_t = DEFAULT_MODULUS_BITS)]
        modulus_bits: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Cipher {
    AesGcm,
    Chacha20Poly1305,
}

impl From<Cipher> for AeadAlgorithm {
    fn from(cipher: Cipher) -> Self {
        match cipher {
            Cipher::AesGcm => Self::Aes256Gcm,
            Cipher::Chacha20Poly1305 => Self::ChaCha20Poly1305,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TamperPoint {
    /// alice -> bob payload
    Bulk,
    /// alice -> public-space digest
    FirstHop,
    /// public-space -> bob digest
    SecondHop,
}

impl TamperPoint {
    fn link(self) -> (&'static str, &'static str) {
        match self {
            Self::Bulk => (SOURCE, SINK),
            Self::FirstHop => (SOURCE, RELAY),
            Self::SecondHop => (RELAY, SINK),
        }
    }
}

fn flip_first_bit(message: Bytes) -> Bytes {
    let mut bytes = message.to_vec();
    if let Some(first) = bytes.first_mut() {
        *first ^= 0x01;
    }
    Bytes::from(bytes)
}

fn mib_to_bytes(mib: usize) -> Result<usize, String> {
    mib.checked_mul(1024 * 1024).ok_or_else(|| format!("payload of {mib} MiB does not fit in memory"))
}

async fn run_exchange(rounds: usize, cipher: Cipher) -> Result<(), Box<dyn std::error::Error>> {
    let config = ExchangeConfig { rounds, ..Default::default() };
    let key = SymmetricKey::generate(cipher.into());

    tracing::info!(rounds, algorithm = %key.algorithm(), "starting exchange");
    let report = exchange::run(&config, &key).await?;

    tracing::info!(
        alice_received = report.alice.received.len(),
        bob_received = report.bob.received.len(),
        nonces = report.all_nonces().count(),
        "exchange complete"
    );
    Ok(())
}

async fn run_relay(
    payload_mib: usize,
    secure_link_limit: usize,
    tamper: Option<TamperPoint>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = RelayConfig {
        payload: Payload::Random(mib_to_bytes(payload_mib)?),
        secure_link: LinkSettings::limited(secure_link_limit),
    };
    let keys = RelayKeys::generate();

    let mut env = relay::environment(&config, &keys)?;
    if let Some(point) = tamper {
        let (from, to) = point.link();
        tracing::warn!(from, to, "tampering enabled");
        env.intercept(from, to, flip_first_bit)?;
    }

    tracing::info!(payload_mib, secure_link_limit, "starting relay");
    let report = relay::collect(env).await?;

    tracing::info!(
        digest = %report.sent_digest,
        len = report.payload_len,
        relay = ?report.relay,
        verdict = ?report.verdict,
        "relay complete"
    );
    Ok(())
}

async fn run_oneshot(
    message: Option<String>,
    modulus_bits: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match message {
        Some(message) => OneShotConfig { message: message.into_bytes() },
        None => OneShotConfig::default(),
    };

    tracing::info!(modulus_bits, "generating recipient key pair");
    let recipient = tokio::task::spawn_blocking(move || KeyPair::generate(modulus_bits)).await??;

    let plaintext = oneshot::run(&config, &recipient).await?;

    tracing::info!(message = %String::from_utf8_lossy(&plaintext), "bob decrypted");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    match args.scenario {
        Scenario::Exchange { rounds, algorithm } => run_exchange(rounds, algorithm).await,
        Scenario::Relay { payload_mib, secure_link_limit, tamper } => {
            run_relay(payload_mib, secure_link_limit, tamper).await
        },
        Scenario::Oneshot { message, modulus_bits } => run_oneshot(message, modulus_bits).await,
    }
}
