use tokio::sync::broadcast;

use crate::dto::sse::OutboundMessage;

/// Broadcast hub carrying every chat line the games emit.
///
/// The SSE route subscribes to it; chat sinks publish into it.
pub struct MessageHub {
    sender: broadcast::Sender<OutboundMessage>,
}

impl MessageHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent messages.
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.sender.subscribe()
    }

    /// Clone of the sending half, for sinks that outlive a borrow of the hub.
    pub fn sender(&self) -> broadcast::Sender<OutboundMessage> {
        self.sender.clone()
    }
}
