//! Point-to-point channels between two agents.
//!
//! A [`Channel`] is a pair of directed legs. Each leg is an unbounded FIFO
//! with exactly one producer and one consumer, so messages on a leg are
//! delivered in send order, exactly once. Legs are independent: a stalled
//! receiver on one never affects another.
//!
//! # Lifecycle
//!
//! Opening a channel yields one [`Endpoint`] per agent. An endpoint owns the
//! sending half of its outgoing leg and the receiving half of its incoming
//! leg. When an agent's task ends its endpoints drop, which closes both legs:
//! the peer can still drain messages already enqueued, after which `receive`
//! reports [`ChannelError::Disconnected`] instead of blocking forever.

use std::{fmt, sync::Arc};

use bytes::Bytes;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::ChannelError;

/// Transforms a message in transit on one directed leg.
///
/// Models an active attacker on an unauthenticated link. Runs before the
/// message is enqueued; the enqueued result is immutable.
pub type Interceptor = Arc<dyn Fn(Bytes) -> Bytes + Send + Sync>;

/// Per-link settings, shared by both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkSettings {
    /// Largest message accepted on the link, `None` for unlimited
    pub max_message_len: Option<usize>,
}

impl LinkSettings {
    /// Link with no message size limit.
    pub fn unlimited() -> Self {
        Self { max_message_len: None }
    }

    /// Low-bandwidth link that only carries messages up to `max` bytes.
    pub fn limited(max: usize) -> Self {
        Self { max_message_len: Some(max) }
    }
}

/// Factory for the two endpoints of a bidirectional channel.
pub struct Channel;

impl Channel {
    /// Open a channel between `a` and `b`.
    ///
    /// `a_to_b` and `b_to_a` are optional interceptors for each direction.
    pub fn open(
        a: &str,
        b: &str,
        settings: LinkSettings,
        a_to_b: Option<Interceptor>,
        b_to_a: Option<Interceptor>,
    ) -> (Endpoint, Endpoint) {
        let (tx_ab, rx_ab) = mpsc::unbounded_channel();
        let (tx_ba, rx_ba) = mpsc::unbounded_channel();

        let at_a = Endpoint {
            local: a.to_owned(),
            peer: b.to_owned(),
            settings,
            interceptor: a_to_b,
            outgoing: tx_ab,
            incoming: rx_ba,
        };
        let at_b = Endpoint {
            local: b.to_owned(),
            peer: a.to_owned(),
            settings,
            interceptor: b_to_a,
            outgoing: tx_ba,
            incoming: rx_ab,
        };

        (at_a, at_b)
    }
}

/// One agent's end of a channel.
pub struct Endpoint {
    local: String,
    peer: String,
    settings: LinkSettings,
    interceptor: Option<Interceptor>,
    outgoing: UnboundedSender<Bytes>,
    incoming: UnboundedReceiver<Bytes>,
}

impl Endpoint {
    /// Name of the agent on the other side.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Enqueue a message for the peer. Never waits.
    ///
    /// A peer whose task has already ended never consumes the message, but
    /// the send still succeeds.
    ///
    /// # Errors
    ///
    /// - `MessageTooLarge`: message exceeds the link limit
    pub fn send(&self, message: Bytes) -> Result<(), ChannelError> {
        if let Some(limit) = self.settings.max_message_len.filter(|&limit| message.len() > limit) {
            return Err(ChannelError::MessageTooLarge {
                from: self.local.clone(),
                to: self.peer.clone(),
                len: message.len(),
                limit,
            });
        }

        let message = match &self.interceptor {
            Some(intercept) => {
                let original_len = message.len();
                let delivered = intercept(message);
                tracing::debug!(
                    from = %self.local,
                    to = %self.peer,
                    original_len,
                    delivered_len = delivered.len(),
                    "message intercepted"
                );
                delivered
            },
            None => message,
        };

        let len = message.len();
        if self.outgoing.send(message).is_err() {
            tracing::debug!(from = %self.local, to = %self.peer, len, "peer finished, message unread");
            return Ok(());
        }

        tracing::debug!(from = %self.local, to = %self.peer, len, "message enqueued");
        Ok(())
    }

    /// Wait for the next message from the peer and consume it.
    ///
    /// # Errors
    ///
    /// - `Disconnected`: peer terminated and every message it sent has been
    ///   consumed
    pub async fn receive(&mut self) -> Result<Bytes, ChannelError> {
        let message = self.incoming.recv().await.ok_or_else(|| ChannelError::Disconnected {
            agent: self.local.clone(),
            peer: self.peer.clone(),
        })?;

        tracing::debug!(from = %self.peer, to = %self.local, len = message.len(), "message received");
        Ok(message)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("local", &self.local)
            .field("peer", &self.peer)
            .field("settings", &self.settings)
            .field("intercepted", &self.interceptor.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().build().unwrap()
    }

    #[test]
    fn legs_are_fifo_and_independent() {
        runtime().block_on(async {
            let (a, mut b) = Channel::open("a", "b", LinkSettings::unlimited(), None, None);
            let (_c, mut d) = Channel::open("c", "d", LinkSettings::unlimited(), None, None);

            a.send(Bytes::from_static(b"one")).unwrap();
            a.send(Bytes::from_static(b"two")).unwrap();

            assert_eq!(b.receive().await.unwrap(), "one");
            assert_eq!(b.receive().await.unwrap(), "two");

            // Nothing was sent on c -> d; the leg stays empty
            assert!(d.incoming.try_recv().is_err());
        });
    }

    #[test]
    fn pending_messages_survive_sender_drop() {
        runtime().block_on(async {
            let (a, mut b) = Channel::open("a", "b", LinkSettings::unlimited(), None, None);

            a.send(Bytes::from_static(b"last words")).unwrap();
            drop(a);

            assert_eq!(b.receive().await.unwrap(), "last words");
            assert_eq!(
                b.receive().await,
                Err(ChannelError::Disconnected { agent: "b".into(), peer: "a".into() })
            );
        });
    }

    #[test]
    fn send_to_terminated_peer_succeeds() {
        let (a, b) = Channel::open("a", "b", LinkSettings::unlimited(), None, None);
        drop(b);

        assert_eq!(a.send(Bytes::from_static(b"anyone?")), Ok(()));
    }

    #[test]
    fn limit_applies_in_both_directions() {
        let (a, b) = Channel::open("a", "b", LinkSettings::limited(4), None, None);

        assert!(a.send(Bytes::from_static(b"1234")).is_ok());
        assert_eq!(
            b.send(Bytes::from_static(b"12345")),
            Err(ChannelError::MessageTooLarge {
                from: "b".into(),
                to: "a".into(),
                len: 5,
                limit: 4,
            })
        );
    }

    #[test]
    fn interceptor_only_touches_its_direction() {
        runtime().block_on(async {
            let flip: Interceptor = Arc::new(|message: Bytes| {
                let mut bytes = message.to_vec();
                bytes[0] ^= 0xFF;
                Bytes::from(bytes)
            });
            let (mut a, mut b) =
                Channel::open("a", "b", LinkSettings::unlimited(), Some(flip), None);

            a.send(Bytes::from_static(&[0x00])).unwrap();
            b.send(Bytes::from_static(&[0x00])).unwrap();

            assert_eq!(b.receive().await.unwrap().as_ref(), &[0xFF]);
            assert_eq!(a.receive().await.unwrap().as_ref(), &[0x00]);
        });
    }
}
