//! In-process transport: two connected ends backed by unbounded `tokio`
//! channels, standing in for the window boundary.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::prelude::*;
use super::{Envelope, Message, Transport};


/// Sending half. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Outbox(mpsc::UnboundedSender<Envelope>);

/// Receiving half. Envelopes arrive in the order they were posted.
#[derive(Debug)]
pub struct Inbox(mpsc::UnboundedReceiver<Envelope>);

#[derive(Debug)]
pub struct ChannelEnd {
    pub outbox: Outbox,
    pub inbox: Inbox,
}

/// Creates two connected ends: whatever is posted to one end's outbox shows up
/// in the other end's inbox.
pub fn pair() -> (ChannelEnd, ChannelEnd) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();

    let a = ChannelEnd { outbox: Outbox(b_tx), inbox: Inbox(a_rx) };
    let b = ChannelEnd { outbox: Outbox(a_tx), inbox: Inbox(b_rx) };
    (a, b)
}

impl Transport for Outbox {
    fn post(&mut self, envelope: Envelope) {
        let kind = envelope.kind;
        if self.0.send(envelope).is_err() {
            trace!("Other side of preview channel is gone, dropped {kind:?}");
        }
    }
}

impl Inbox {
    /// Waits for the next envelope. Returns `None` once the other side is
    /// dropped and everything was received.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.0.recv().await
    }

    /// Returns the next envelope if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.0.try_recv().ok()
    }
}

/// Posts `PREVIEW_READY` after `delay`. If the receiving side is gone by
/// then, nothing happens.
pub fn spawn_ready_ping(mut outbox: Outbox, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        outbox.post(Message::PreviewReady.into_envelope());
    })
}
