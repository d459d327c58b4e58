//! Error type for protocol entry points.

use parley_core::EnvironmentError;
use parley_crypto::CryptoError;
use thiserror::Error;

/// Failure of a protocol run as seen by its driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Building or running the environment failed
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// Key setup failed before any agent started
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// An agent finished without reporting the value the protocol needs
    #[error("agent {0} reported no outcome")]
    MissingOutcome(&'static str),
}
