use crate::{
    prelude::*,
    theme::{resolve_settings, AdvancedSettings},
};
use super::{Envelope, Message, ProtocolError, Source, Transport};


/// The embedded side of the preview link: renders the menu with whatever
/// theme the host pushed last and never writes anything back.
#[derive(Debug)]
pub struct PreviewEmbed<T> {
    transport: T,
    settings: AdvancedSettings,
    updates: u64,
}

impl<T: Transport> PreviewEmbed<T> {
    /// Starts with the persisted theme (resolved against the default) so
    /// that something sensible is shown before the first push arrives.
    pub fn new(transport: T, stored: Option<&serde_json::Value>) -> Self {
        Self {
            transport,
            settings: resolve_settings(stored),
            updates: 0,
        }
    }

    pub fn settings(&self) -> &AdvancedSettings {
        &self.settings
    }

    /// Number of theme updates applied so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Our data finished loading: ask the host for the current theme.
    pub fn loaded(&mut self) {
        self.post(Message::PreviewLoaded);
    }

    /// Loading our data failed.
    pub fn failed(&mut self, error: impl Into<String>) {
        self.post(Message::PreviewError { error: error.into() });
    }

    /// Liveness ping, usually sent through [`super::spawn_ready_ping`] instead.
    pub fn ready(&mut self) {
        self.post(Message::PreviewReady);
    }

    /// Handles an envelope from the host. Returns whether the theme changed
    /// hands, i.e. whether a re-render is due. Applying the same update twice
    /// leaves the same state.
    pub fn handle(&mut self, envelope: Envelope) -> bool {
        if envelope.source != Source::Dashboard {
            trace!("Ignoring {:?} message from {:?}", envelope.kind, envelope.source);
            return false;
        }

        match Message::try_from(envelope) {
            Ok(Message::ThemeUpdate(blueprint)) => {
                self.settings = blueprint.advanced_settings;
                self.updates += 1;
                true
            }
            Ok(other) => {
                debug!("Ignoring unexpected {:?} message in preview", other.kind());
                false
            }
            Err(e @ ProtocolError::InvalidPayload { .. }) => {
                warn!("Received broken theme update: {e}");
                self.failed(e.to_string());
                false
            }
            Err(e) => {
                debug!("Ignoring invalid message in preview: {e}");
                false
            }
        }
    }

    fn post(&mut self, msg: Message) {
        self.transport.post(msg.into_envelope());
    }
}
