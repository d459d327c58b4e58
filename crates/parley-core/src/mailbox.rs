//! An agent's view of the world: its channel endpoints, keyed by peer name.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::{channel::Endpoint, error::ChannelError};

/// The `send`/`receive` interface handed to an agent's task.
///
/// Holds one [`Endpoint`] per peer the agent is connected to. Dropping the
/// mailbox (which happens when the task returns, fails or panics) closes all
/// of the agent's legs.
#[derive(Debug)]
pub struct Mailbox {
    name: String,
    endpoints: BTreeMap<String, Endpoint>,
}

impl Mailbox {
    pub(crate) fn new(name: String) -> Self {
        Self { name, endpoints: BTreeMap::new() }
    }

    pub(crate) fn attach(&mut self, endpoint: Endpoint) {
        self.endpoints.insert(endpoint.peer().to_owned(), endpoint);
    }

    /// Name of the owning agent.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of every connected peer, in lexicographic order.
    pub fn peers(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// Enqueue `message` for `peer` and continue without waiting.
    ///
    /// # Errors
    ///
    /// - `NotConnected`: no link to `peer` was declared
    /// - `MessageTooLarge`: message exceeds the link limit
    pub fn send(&self, peer: &str, message: impl Into<Bytes>) -> Result<(), ChannelError> {
        self.endpoint(peer)?.send(message.into())
    }

    /// Wait until `peer` has sent a message to this agent and consume it.
    ///
    /// Messages from one peer arrive in the order they were sent. There is no
    /// timeout: a live peer that never sends blocks this call forever.
    ///
    /// # Errors
    ///
    /// - `NotConnected`: no link to `peer` was declared
    /// - `Disconnected`: `peer` terminated and nothing from it is pending
    pub async fn receive(&mut self, peer: &str) -> Result<Bytes, ChannelError> {
        let name = &self.name;
        let endpoint = self.endpoints.get_mut(peer).ok_or_else(|| {
            ChannelError::NotConnected { from: name.clone(), to: peer.to_owned() }
        })?;
        endpoint.receive().await
    }

    fn endpoint(&self, peer: &str) -> Result<&Endpoint, ChannelError> {
        self.endpoints.get(peer).ok_or_else(|| ChannelError::NotConnected {
            from: self.name.clone(),
            to: peer.to_owned(),
        })
    }
}
