//! Out-of-band control messages.
//!
//! Pages post JSON such as `{"type": "SKIP_WAITING"}` to the scope. Messages
//! are fire-and-forget: [`ControlHandle::post`] queues them on an unbounded
//! channel and a background task applies them in order. Anything that does
//! not parse as a known message is logged at debug level and dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use crate::lifecycle::Scope;

/// A recognized control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Activate the waiting version without waiting for old clients.
    SkipWaiting,
    /// Delete every cache store.
    ClearCache,
}

impl ControlMessage {
    /// Parses a raw message, `None` for malformed or unknown ones.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(message) => Some(message),
            Err(error) => {
                debug!(%error, "Ignoring unrecognized control message");
                None
            }
        }
    }
}

/// Sending side of a scope's control channel.
///
/// Dropping every handle (or calling [`close`](Self::close)) ends the
/// consumer task once the queue is drained.
#[derive(Debug)]
pub struct ControlHandle {
    sender: mpsc::UnboundedSender<ControlMessage>,
    consumer: JoinHandle<()>,
}

impl ControlHandle {
    pub(crate) fn spawn(scope: Scope) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<ControlMessage>();
        let consumer = tokio::spawn(
            async move {
                while let Some(message) = receiver.recv().await {
                    if let Err(error) = scope.handle_message(message).await {
                        warn!(?message, %error, "Control message failed");
                    }
                }
            }
            .instrument(info_span!("offbox.control")),
        );
        Self { sender, consumer }
    }

    /// Queues a raw JSON message. Returns whether it was recognized.
    pub fn post(&self, raw: &str) -> bool {
        ControlMessage::parse(raw).is_some_and(|message| self.send(message))
    }

    /// Queues a message. Returns `false` if the consumer is gone.
    pub fn send(&self, message: ControlMessage) -> bool {
        self.sender.send(message).is_ok()
    }

    /// Closes the channel and waits until every queued message is applied.
    pub async fn close(self) {
        drop(self.sender);
        if let Err(error) = self.consumer.await {
            warn!(%error, "Control channel consumer panicked");
        }
    }
}
