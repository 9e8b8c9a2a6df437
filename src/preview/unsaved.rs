//! Rendering a menu with a blueprint that was not saved yet. Both ends of the
//! preview link run in this process, so the result is exactly what an embedded
//! preview shows after the editor's first push.

use std::{sync::Arc, time::Duration};

use crate::{
    prelude::*,
    render::{load_menu, MenuData, MenuError},
    store::Store,
    theme::{AdvancedSettings, ThemeBlueprint},
};
use super::{pair, spawn_ready_ping, ChannelEnd, ConnectionState, EditSession, PreviewEmbed};


/// Loads the menu of `slug` on a separate task acting as the embedded preview
/// and lets an [`EditSession`] holding `blueprint` connect to it. Returns the
/// menu data together with the settings the preview ended up with.
pub async fn preview_unsaved(
    store: Arc<dyn Store>,
    slug: &str,
    blueprint: ThemeBlueprint,
    ready_delay: Duration,
) -> Result<(MenuData, AdvancedSettings), MenuError> {
    let (editor_end, preview_end) = pair();
    let embedded = tokio::spawn(run_embedded(store, slug.to_owned(), preview_end, ready_delay));

    let ChannelEnd { outbox, mut inbox } = editor_end;
    let mut session = EditSession::new(blueprint, outbox);
    session.attach_preview();
    while let Some(envelope) = inbox.recv().await {
        session.handle(envelope);
        if matches!(session.preview_state(), ConnectionState::Connected | ConnectionState::Error(_)) {
            break;
        }
    }

    // Closes the preview's inbox once it has seen the push.
    drop(session);

    embedded.await.map_err(|e| anyhow!("preview task failed: {e}"))?
}

async fn run_embedded(
    store: Arc<dyn Store>,
    slug: String,
    end: ChannelEnd,
    ready_delay: Duration,
) -> Result<(MenuData, AdvancedSettings), MenuError> {
    let ChannelEnd { outbox, mut inbox } = end;

    let data = match load_menu(&*store, &slug).await {
        Ok(data) => data,
        Err(e) => {
            PreviewEmbed::new(outbox, None).failed(e.to_string());
            return Err(e);
        }
    };

    let mut embed = PreviewEmbed::new(outbox.clone(), data.restaurant.theme_config.as_ref());
    embed.loaded();
    spawn_ready_ping(outbox, ready_delay);

    while let Some(envelope) = inbox.recv().await {
        if embed.handle(envelope) {
            break;
        }
    }

    // Without a push (host gone), the stored theme is what the preview shows.
    let settings = embed.settings().clone();
    Ok((data, settings))
}
