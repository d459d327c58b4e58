//! Parley agent runtime.
//!
//! Agents are named task bodies that talk to each other only through
//! point-to-point channels declared up front. The runtime owns the channels,
//! starts every agent as an independent tokio task and joins them all.
//!
//! # Components
//!
//! - [`Channel`]: two directed FIFO legs between a pair of agents
//! - [`ConnectivityGraph`]: which unordered pairs may exchange messages
//! - [`Agent`]: a name plus a task body receiving a [`Mailbox`]
//! - [`Mailbox`]: `send(peer, bytes)` and blocking `receive(peer)`
//! - [`Environment`]: registry, `connect`/`add`/`start` surface
//!
//! # Guarantees
//!
//! - Per-leg FIFO: the Nth message sent from A to B is the Nth received by B
//!   from A, exactly once
//! - Messages are immutable [`bytes::Bytes`] once enqueued
//! - `send` never waits; `receive` is the only suspension point
//! - Legs are isolated: a blocked receiver never stalls other links
//!
//! # Example
//!
//! ```ignore
//! let mut env = Environment::new();
//! env.add(Agent::new("alice", |mailbox| async move {
//!     mailbox.send("bob", "ping")?;
//!     Ok(())
//! }))?;
//! env.add(Agent::new("bob", |mut mailbox| async move {
//!     let ping = mailbox.receive("alice").await?;
//!     tracing::info!(len = ping.len(), "got ping");
//!     Ok(())
//! }))?;
//! env.connect("alice", "bob")?;
//! let outcomes = env.start().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod agent;
mod channel;
mod environment;
mod error;
mod graph;
mod mailbox;

pub use agent::Agent;
pub use channel::{Channel, Endpoint, Interceptor, LinkSettings};
pub use environment::{Environment, Outcomes};
pub use error::{AgentError, ChannelError, EnvironmentError};
pub use graph::{ConnectivityGraph, LinkKey};
pub use mailbox::Mailbox;
