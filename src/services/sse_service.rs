use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc, watch,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::{
    dto::sse::{Handshake, OutboundMessage, ServerEvent, StorageStatus},
    state::SharedState,
};

/// Everything one SSE client listens to.
pub struct MessageSubscription {
    /// Outbound chat lines.
    pub messages: broadcast::Receiver<OutboundMessage>,
    /// Degraded flag; each change becomes a `storage` event.
    pub degraded: watch::Receiver<bool>,
    /// First event sent to the client.
    pub handshake: Handshake,
}

/// Subscribe to the outbound chat stream and build the handshake for the new client.
pub fn subscribe_messages(state: &SharedState) -> MessageSubscription {
    let messages = state.messages().subscribe();
    let mut degraded = state.degraded_watcher();
    let handshake = Handshake {
        message: "message stream connected".to_string(),
        degraded: *degraded.borrow_and_update(),
    };
    MessageSubscription {
        messages,
        degraded,
        handshake,
    }
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a subscription into an SSE response. The handshake is sent first.
pub fn to_sse_stream(
    subscription: MessageSubscription,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let MessageSubscription {
        messages: mut receiver,
        mut degraded,
        handshake,
    } = subscription;
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        match ServerEvent::json(Some("handshake".to_string()), &handshake) {
            Ok(payload) => {
                if tx.send(Ok(to_event(payload))).await.is_err() {
                    return;
                }
            }
            Err(err) => warn!(error = %err, "failed to encode SSE handshake"),
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                changed = degraded.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let status = StorageStatus { degraded: *degraded.borrow_and_update() };
                    match ServerEvent::json(Some("storage".to_string()), &status) {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => warn!(error = %err, "failed to encode storage status"),
                    }
                }
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(message) => {
                            let payload = match message.to_event() {
                                Ok(payload) => payload,
                                Err(err) => {
                                    warn!(error = %err, "failed to encode outbound message");
                                    continue;
                                }
                            };
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "SSE subscriber lagged; dropping messages");
                            continue;
                        }
                    }
                }
            }
        }

        info!("message SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
