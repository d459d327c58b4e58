//! Error types for the agent runtime.
//!
//! Three layers: channel errors (what `send`/`receive` return), agent errors
//! (what a task body returns) and environment errors (what `start` surfaces).

use parley_crypto::CryptoError;
use thiserror::Error;

/// Errors from a single `send` or `receive`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// No channel was declared for this pair of agents
    #[error("not connected: no channel between {from} and {to}")]
    NotConnected {
        /// Agent issuing the operation
        from: String,
        /// Peer named in the operation
        to: String,
    },

    /// Peer task has terminated and no message from it is pending
    #[error("{peer} disconnected from {agent}")]
    Disconnected {
        /// Agent issuing the operation
        agent: String,
        /// Peer that terminated
        peer: String,
    },

    /// Message exceeds the link's configured limit
    #[error("message of {len} bytes exceeds the {limit}-byte limit of link {from} -> {to}")]
    MessageTooLarge {
        /// Sending agent
        from: String,
        /// Receiving agent
        to: String,
        /// Message length
        len: usize,
        /// Link limit
        limit: usize,
    },
}

/// Errors that end an agent's task.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// Runtime failure on a channel
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Cryptographic step failed closed
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Peer sent something the protocol does not allow
    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl AgentError {
    /// Returns true if this failure is only a consequence of a peer ending.
    ///
    /// Such failures are secondary: the environment prefers to report the
    /// failure that made the peer end.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Channel(ChannelError::Disconnected { .. }))
    }
}

/// Errors from building or running an [`Environment`](crate::Environment).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// Two agents were added under the same name
    #[error("duplicate agent: {0}")]
    DuplicateAgent(String),

    /// A link names an agent that was never added
    #[error("unknown agent {agent} in link {a} <-> {b}")]
    UnknownAgent {
        /// The missing agent
        agent: String,
        /// First endpoint of the link
        a: String,
        /// Second endpoint of the link
        b: String,
    },

    /// An agent was connected to itself
    #[error("cannot connect {0} to itself")]
    SelfLink(String),

    /// Configuration referenced a pair with no declared link
    #[error("not connected: no channel between {from} and {to}")]
    NotConnected {
        /// First agent
        from: String,
        /// Second agent
        to: String,
    },

    /// An agent's task returned an error
    #[error("agent {agent} failed: {source}")]
    AgentFailed {
        /// Agent name
        agent: String,
        /// Why it failed
        #[source]
        source: AgentError,
    },

    /// An agent's task panicked
    #[error("agent {agent} panicked")]
    AgentPanicked {
        /// Agent name
        agent: String,
    },
}

impl EnvironmentError {
    /// Returns true if this is a root-cause failure rather than a consequence
    /// of another agent terminating.
    pub fn is_root_cause(&self) -> bool {
        match self {
            Self::AgentFailed { source, .. } => !source.is_disconnect(),
            _ => true,
        }
    }
}
