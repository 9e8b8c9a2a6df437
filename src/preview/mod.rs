//! Live preview synchronization between the theme editor (the host) and an
//! embedded rendering of the menu.
//!
//! Both sides only exchange [`Envelope`]s by value. Every `THEME_UPDATE`
//! carries the complete blueprint, so applying one is a full replace and
//! applying the same one twice is harmless. Delivery is at most once: there
//! are no acknowledgements and nothing is queued while the preview is not
//! connected.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{prelude::*, theme::ThemeBlueprint};


mod channel;
mod embed;
mod session;
mod unsaved;

pub use self::{
    channel::{pair, spawn_ready_ping, ChannelEnd, Inbox, Outbox},
    embed::PreviewEmbed,
    session::EditSession,
    unsaved::preview_unsaved,
};


#[derive(Debug, Clone, confique::Config)]
pub struct PreviewConfig {
    /// How long the embedded preview waits after loading before it sends its
    /// `PREVIEW_READY` liveness ping to the editor.
    #[config(default = "300ms", deserialize_with = crate::config::deserialize_duration)]
    pub ready_delay: Duration,
}


// ===== Wire format ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    Dashboard,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    PreviewReady,
    PreviewLoaded,
    PreviewError,
    ThemeUpdate,
}

/// What actually crosses the window boundary:
/// `{ "source": ..., "type": ..., "payload": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub source: Source,
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(s).map_err(ProtocolError::Malformed)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("bug: envelope not serializable")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed preview message: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("{kind:?} must not be sent by {sender:?}")]
    WrongSource { kind: MessageType, sender: Source },

    #[error("invalid payload for {kind:?}: {err}")]
    InvalidPayload {
        kind: MessageType,
        #[source]
        err: serde_json::Error,
    },
}


/// The closed set of messages, each tied to the side that may send it.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Embedded → host. Informational liveness ping.
    PreviewReady,

    /// Embedded → host. The embedded renderer finished loading its data and
    /// wants the current blueprint.
    PreviewLoaded,

    /// Embedded → host.
    PreviewError { error: String },

    /// Host → embedded. The complete current blueprint.
    ThemeUpdate(ThemeBlueprint),
}

#[derive(Serialize, Deserialize)]
struct ErrorPayload {
    error: String,
}

impl Message {
    pub fn kind(&self) -> MessageType {
        match self {
            Self::PreviewReady => MessageType::PreviewReady,
            Self::PreviewLoaded => MessageType::PreviewLoaded,
            Self::PreviewError { .. } => MessageType::PreviewError,
            Self::ThemeUpdate(_) => MessageType::ThemeUpdate,
        }
    }

    /// The only side allowed to send this message.
    pub fn source(&self) -> Source {
        source_of(self.kind())
    }

    pub fn into_envelope(self) -> Envelope {
        let source = self.source();
        let kind = self.kind();
        let payload = match self {
            Self::PreviewReady | Self::PreviewLoaded => Value::Null,
            Self::PreviewError { error } => serde_json::to_value(ErrorPayload { error })
                .expect("bug: error payload not serializable"),
            Self::ThemeUpdate(blueprint) => blueprint.to_json(),
        };

        Envelope { source, kind, payload }
    }
}

fn source_of(kind: MessageType) -> Source {
    match kind {
        MessageType::PreviewReady
        | MessageType::PreviewLoaded
        | MessageType::PreviewError => Source::Preview,
        MessageType::ThemeUpdate => Source::Dashboard,
    }
}

impl TryFrom<Envelope> for Message {
    type Error = ProtocolError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let Envelope { source, kind, payload } = envelope;
        if source != source_of(kind) {
            return Err(ProtocolError::WrongSource { kind, sender: source });
        }

        let invalid = |err| ProtocolError::InvalidPayload { kind, err };
        let msg = match kind {
            MessageType::PreviewReady => Self::PreviewReady,
            MessageType::PreviewLoaded => Self::PreviewLoaded,
            MessageType::PreviewError => {
                let ErrorPayload { error } = serde_json::from_value(payload).map_err(invalid)?;
                Self::PreviewError { error }
            }
            MessageType::ThemeUpdate => {
                Self::ThemeUpdate(serde_json::from_value(payload).map_err(invalid)?)
            }
        };

        Ok(msg)
    }
}


// ===== Transport ================================================================================

/// Fire-and-forget delivery of envelopes to the other side. Implementations
/// must not block and silently drop envelopes they cannot deliver.
pub trait Transport {
    fn post(&mut self, envelope: Envelope);
}


// ===== Host side ================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// The editor side of the preview link.
///
/// `PREVIEW_LOADED` connects and triggers a full push. While connected, every
/// blueprint change is pushed. `PREVIEW_ERROR` disconnects until the preview
/// reloads and announces `PREVIEW_LOADED` again. There are no timeouts: a
/// preview that never loads keeps the host in `Connecting`.
#[derive(Debug)]
pub struct PreviewHost<T> {
    transport: T,
    state: ConnectionState,
}

impl<T: Transport> PreviewHost<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, state: ConnectionState::Disconnected }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The embedded view was (re)mounted; we now wait for it to load.
    pub fn attach(&mut self) {
        if !self.is_connected() {
            self.state = ConnectionState::Connecting;
        }
    }

    /// The embedded view was torn down.
    pub fn detach(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    /// Handles an incoming envelope. `current` is the blueprint at this
    /// instant, pushed if the preview just connected. Envelopes that are not
    /// from the preview or are malformed are ignored.
    pub fn handle(&mut self, envelope: Envelope, current: &ThemeBlueprint) {
        if envelope.source != Source::Preview {
            trace!("Ignoring {:?} message from {:?}", envelope.kind, envelope.source);
            return;
        }

        let msg = match Message::try_from(envelope) {
            Ok(msg) => msg,
            Err(e) => {
                debug!("Ignoring invalid preview message: {e}");
                return;
            }
        };

        match msg {
            Message::PreviewLoaded => {
                info!("Preview loaded, sending current theme");
                self.state = ConnectionState::Connected;
                self.push(current);
            }
            Message::PreviewError { error } => {
                warn!("Preview reported an error: {error}");
                self.state = ConnectionState::Error(error);
            }
            Message::PreviewReady => debug!("Preview is ready (state: {})", self.state),
            Message::ThemeUpdate(_) => debug!("Ignoring theme update sent to the dashboard"),
        }
    }

    /// Pushes `blueprint` if connected, otherwise drops it. Returns whether
    /// it was sent.
    pub fn blueprint_changed(&mut self, blueprint: &ThemeBlueprint) -> bool {
        if !self.is_connected() {
            trace!("Preview not connected ({}), dropping theme update", self.state);
            return false;
        }

        self.push(blueprint);
        true
    }

    fn push(&mut self, blueprint: &ThemeBlueprint) {
        self.transport.post(Message::ThemeUpdate(blueprint.clone()).into_envelope());
    }
}


#[cfg(test)]
mod tests;
