//! Outbound chat capability used for every user-visible line.

use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::{dao::models::PlayerScope, dto::sse::OutboundMessage};

/// Deliver `text` to `target`, which is either the channel or a player nick.
pub trait ChatSink: Send + Sync {
    fn send(&self, target: &str, text: &str);
}

/// Sink publishing onto the shared message hub, tagged with the game's scope.
pub struct HubSink {
    scope: PlayerScope,
    sender: broadcast::Sender<OutboundMessage>,
}

impl HubSink {
    pub fn new(scope: PlayerScope, sender: broadcast::Sender<OutboundMessage>) -> Self {
        Self { scope, sender }
    }
}

impl ChatSink for HubSink {
    fn send(&self, target: &str, text: &str) {
        // no subscribers is fine; lines are fire-and-forget
        let _ = self.sender.send(OutboundMessage {
            network: self.scope.network.clone(),
            channel: self.scope.channel.clone(),
            target: target.to_owned(),
            text: text.to_owned(),
        });
    }
}

/// Sink that keeps every line in memory, for tests and dry runs.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(target, text)` pair sent so far.
    pub fn messages(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Texts only, in send order.
    pub fn texts(&self) -> Vec<String> {
        self.messages().into_iter().map(|(_, text)| text).collect()
    }

    /// Drain the recorded lines.
    pub fn take(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}

impl ChatSink for RecordingSink {
    fn send(&self, target: &str, text: &str) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((target.to_owned(), text.to_owned()));
    }
}
