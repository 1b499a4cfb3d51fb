//! In-process duplex channel.
//!
//! [`DuplexChannel::pair`] returns two connected [`ChannelEnd`]s, one for the
//! provider and one for the consumer. Each direction is an unbounded tokio
//! mpsc queue carrying [`Message`] values, so sending never blocks and never
//! serializes.
//!
//! Both ends share one close state. Closing either end closes the pair:
//! [`ChannelSender::send`] then fails with
//! [`TransportClosed`](FederationError::TransportClosed) and
//! [`ChannelReceiver::recv`] returns `None`, so nothing waiting on the
//! channel can hang.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::error::{FederationError, Result};
use super::protocol::Message;

/// Close state shared by both ends of a pair
#[derive(Debug, Default)]
struct CloseState {
    closed: AtomicBool,
    token: CancellationToken,
}

impl CloseState {
    /// Returns `true` only for the call that actually closed the pair
    fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.token.cancel();
        true
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Factory for connected channel pairs
pub struct DuplexChannel;

impl DuplexChannel {
    /// Create a connected `(provider_end, consumer_end)` pair
    pub fn pair() -> (ChannelEnd, ChannelEnd) {
        let state = Arc::new(CloseState::default());
        let (to_consumer, from_provider) = mpsc::unbounded_channel();
        let (to_provider, from_consumer) = mpsc::unbounded_channel();

        let provider = ChannelEnd {
            sender: ChannelSender {
                tx: to_consumer,
                state: Arc::clone(&state),
            },
            receiver: ChannelReceiver {
                rx: from_consumer,
                state: Arc::clone(&state),
            },
        };
        let consumer = ChannelEnd {
            sender: ChannelSender {
                tx: to_provider,
                state: Arc::clone(&state),
            },
            receiver: ChannelReceiver {
                rx: from_provider,
                state,
            },
        };
        (provider, consumer)
    }
}

/// One side of a duplex channel
#[derive(Debug)]
pub struct ChannelEnd {
    sender: ChannelSender,
    receiver: ChannelReceiver,
}

impl ChannelEnd {
    /// Split into an independently owned sender and receiver
    pub fn split(self) -> (ChannelSender, ChannelReceiver) {
        (self.sender, self.receiver)
    }

    pub fn send(&self, message: Message) -> Result<()> {
        self.sender.send(message)
    }

    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    pub fn close(&self) -> bool {
        self.sender.close()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Sending half; cheap to clone
#[derive(Debug, Clone)]
pub struct ChannelSender {
    tx: mpsc::UnboundedSender<Message>,
    state: Arc<CloseState>,
}

impl ChannelSender {
    /// Deliver a message to the peer.
    ///
    /// Fails with `TransportClosed` once the pair is closed or the peer's
    /// receiver is gone.
    pub fn send(&self, message: Message) -> Result<()> {
        if self.state.is_closed() {
            return Err(FederationError::TransportClosed);
        }
        trace!(?message, "Channel send");
        self.tx
            .send(message)
            .map_err(|_| FederationError::TransportClosed)
    }

    /// Close both ends; returns `true` if this call closed the pair
    pub fn close(&self) -> bool {
        self.state.close()
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Resolves once the pair is closed
    pub async fn closed(&self) {
        self.state.token.cancelled().await
    }
}

/// Receiving half
#[derive(Debug)]
pub struct ChannelReceiver {
    rx: mpsc::UnboundedReceiver<Message>,
    state: Arc<CloseState>,
}

impl ChannelReceiver {
    /// Next message from the peer, or `None` once the pair is closed or the
    /// peer dropped every sender
    pub async fn recv(&mut self) -> Option<Message> {
        if self.state.is_closed() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.state.token.cancelled() => None,
            message = self.rx.recv() => message,
        }
    }

    pub fn close(&self) -> bool {
        self.state.close()
    }
}
