use std::time::Duration;

use serde_json::json;

use super::*;


impl Transport for Vec<Envelope> {
    fn post(&mut self, envelope: Envelope) {
        self.push(envelope);
    }
}

fn from_preview(msg: Message) -> Envelope {
    msg.into_envelope()
}

fn theme_updates(sent: &[Envelope]) -> Vec<&Envelope> {
    sent.iter().filter(|e| e.kind == MessageType::ThemeUpdate).collect()
}


#[test]
fn envelope_json_shape() {
    let env = Message::PreviewError { error: "boom".into() }.into_envelope();
    let json: Value = serde_json::from_str(&env.to_json()).unwrap();
    assert_eq!(json, json!({
        "source": "PREVIEW",
        "type": "PREVIEW_ERROR",
        "payload": { "error": "boom" },
    }));

    let env = Envelope::from_json(r#"{ "source": "PREVIEW", "type": "PREVIEW_LOADED" }"#).unwrap();
    assert_eq!(env.payload, Value::Null);
    assert_eq!(Message::try_from(env).unwrap(), Message::PreviewLoaded);

    let update = Message::ThemeUpdate(ThemeBlueprint::default_blueprint()).into_envelope();
    assert_eq!(update.source, Source::Dashboard);
    assert_eq!(update.payload, ThemeBlueprint::default_blueprint().to_json());
}

#[test]
fn protocol_errors() {
    assert!(matches!(
        Envelope::from_json(r#"{ "source": "IFRAME", "type": "PREVIEW_READY" }"#),
        Err(ProtocolError::Malformed(_)),
    ));
    assert!(matches!(
        Envelope::from_json(r#"{ "source": "PREVIEW", "type": "HELLO" }"#),
        Err(ProtocolError::Malformed(_)),
    ));

    let spoofed = Envelope {
        source: Source::Preview,
        kind: MessageType::ThemeUpdate,
        payload: ThemeBlueprint::default_blueprint().to_json(),
    };
    assert!(matches!(Message::try_from(spoofed), Err(ProtocolError::WrongSource { .. })));

    let broken = Envelope {
        source: Source::Preview,
        kind: MessageType::PreviewError,
        payload: json!({ "message": "no 'error' field" }),
    };
    assert!(matches!(Message::try_from(broken), Err(ProtocolError::InvalidPayload { .. })));
}

#[test]
fn full_push_on_loaded() {
    let mut host = PreviewHost::new(Vec::new());
    let mut current = ThemeBlueprint::default_blueprint();
    current.advanced_settings.colors.cards = "#fafafa".into();

    host.attach();
    assert_eq!(host.state(), &ConnectionState::Connecting);
    host.handle(from_preview(Message::PreviewLoaded), &current);

    assert!(host.is_connected());
    let sent = host.transport();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, MessageType::ThemeUpdate);
    assert_eq!(sent[0].source, Source::Dashboard);
    assert_eq!(sent[0].payload, current.to_json());
}

#[test]
fn updates_before_connect_are_dropped() {
    let mut host = PreviewHost::new(Vec::new());
    let mut bp = ThemeBlueprint::default_blueprint();

    bp.advanced_settings.colors.body = "#000000".into();
    assert!(!host.blueprint_changed(&bp));
    host.attach();
    assert!(!host.blueprint_changed(&bp));
    assert!(host.transport().is_empty());

    // Connecting later only pushes the state at that instant, nothing queued.
    bp.advanced_settings.colors.body = "#111111".into();
    host.handle(from_preview(Message::PreviewLoaded), &bp);
    assert_eq!(host.transport().len(), 1);
    assert_eq!(host.transport()[0].payload["advancedSettings"]["colors"]["body"], "#111111");

    assert!(host.blueprint_changed(&bp));
    assert_eq!(host.transport().len(), 2);
}

#[test]
fn error_disconnects_until_reloaded() {
    let mut host = PreviewHost::new(Vec::new());
    let bp = ThemeBlueprint::default_blueprint();
    host.handle(from_preview(Message::PreviewLoaded), &bp);

    host.handle(from_preview(Message::PreviewError { error: "fetch failed".into() }), &bp);
    assert_eq!(host.state(), &ConnectionState::Error("fetch failed".into()));
    assert!(!host.blueprint_changed(&bp));
    assert_eq!(host.transport().len(), 1);

    host.handle(from_preview(Message::PreviewLoaded), &bp);
    assert!(host.is_connected());
    assert_eq!(host.transport().len(), 2);
}

#[test]
fn host_ignores_foreign_and_informational_messages() {
    let mut host = PreviewHost::new(Vec::new());
    let bp = ThemeBlueprint::default_blueprint();

    host.handle(Message::ThemeUpdate(bp.clone()).into_envelope(), &bp);
    host.handle(from_preview(Message::PreviewReady), &bp);
    host.handle(Envelope {
        source: Source::Preview,
        kind: MessageType::PreviewError,
        payload: json!(42),
    }, &bp);

    assert_eq!(host.state(), &ConnectionState::Disconnected);
    assert!(host.transport().is_empty());

    host.handle(from_preview(Message::PreviewLoaded), &bp);
    host.detach();
    assert_eq!(host.state(), &ConnectionState::Disconnected);
    assert!(!host.blueprint_changed(&bp));
}

#[test]
fn host_survives_theme_update_claiming_preview_source() {
    let mut host = PreviewHost::new(Vec::new());
    let bp = ThemeBlueprint::default_blueprint();
    host.attach();
    host.handle(from_preview(Message::PreviewLoaded), &bp);
    assert_eq!(host.transport().len(), 1);

    host.handle(Envelope {
        source: Source::Preview,
        kind: MessageType::ThemeUpdate,
        payload: bp.to_json(),
    }, &bp);

    assert_eq!(host.state(), &ConnectionState::Connected);
    assert_eq!(host.transport().len(), 1);

    host.detach();
    assert_eq!(host.state(), &ConnectionState::Disconnected);
    assert!(!host.blueprint_changed(&bp));
}

#[test]
fn embed_applies_updates_idempotently() {
    let mut embed = PreviewEmbed::new(Vec::new(), None);
    assert_eq!(embed.settings(), &ThemeBlueprint::default_blueprint().advanced_settings);

    let mut bp = ThemeBlueprint::default_blueprint();
    bp.advanced_settings.layout.blocks.retain(|b| b != "footer");
    let update = Message::ThemeUpdate(bp.clone()).into_envelope();

    assert!(embed.handle(update.clone()));
    let after_first = embed.settings().clone();
    assert!(embed.handle(update));
    assert_eq!(embed.settings(), &after_first);
    assert_eq!(embed.settings(), &bp.advanced_settings);
    assert_eq!(embed.updates(), 2);
    assert!(embed.transport().is_empty());
}

#[test]
fn embed_reports_broken_updates() {
    let mut embed = PreviewEmbed::new(Vec::new(), None);
    let before = embed.settings().clone();

    let broken = Envelope {
        source: Source::Dashboard,
        kind: MessageType::ThemeUpdate,
        payload: json!({ "presetId": "bufibu-klasik-v1" }),
    };
    assert!(!embed.handle(broken));
    assert_eq!(embed.settings(), &before);

    let sent = embed.transport();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, MessageType::PreviewError);

    // Messages from other previews are never applied.
    let foreign = Envelope {
        source: Source::Preview,
        kind: MessageType::ThemeUpdate,
        payload: ThemeBlueprint::default_blueprint().to_json(),
    };
    assert!(!embed.handle(foreign));
    assert_eq!(embed.transport().len(), 1);
}

#[test]
fn session_pushes_effective_mutations_only() {
    let mut session = EditSession::new(ThemeBlueprint::default_blueprint(), Vec::new());
    session.update_setting("colors.body", json!("#101010")).unwrap();
    assert!(session.transport().is_empty());

    session.attach_preview();
    session.handle(from_preview(Message::PreviewLoaded));
    assert_eq!(session.transport().len(), 1);

    assert!(!session.apply_preset("unknown"));
    assert!(!session.apply_color_scheme("unknown"));
    assert!(!session.reorder_layout_blocks("unknown", 0));
    assert!(session.update_setting("colors.nope", json!("#000")).is_err());
    assert_eq!(session.transport().len(), 1);

    assert!(session.apply_color_scheme("ocean-blue"));
    assert!(session.reorder_layout_blocks("footer", 0));
    session.reset_to_default();

    let updates = theme_updates(session.transport());
    assert_eq!(updates.len(), 4);
    assert_eq!(updates[3].payload, ThemeBlueprint::default_blueprint().to_json());
    assert_eq!(session.finish(), ThemeBlueprint::default_blueprint());
}

#[tokio::test]
async fn channel_round_trip() {
    let (dashboard, preview) = pair();
    let ChannelEnd { outbox: to_preview, inbox: mut dashboard_inbox } = dashboard;
    let ChannelEnd { outbox: to_dashboard, inbox: mut preview_inbox } = preview;

    let mut session = EditSession::new(ThemeBlueprint::default_blueprint(), to_preview);
    let mut embed = PreviewEmbed::new(to_dashboard.clone(), None);
    session.attach_preview();

    let ping = spawn_ready_ping(to_dashboard, Duration::from_millis(5));
    embed.loaded();

    let loaded = dashboard_inbox.recv().await.unwrap();
    session.handle(loaded);
    assert!(matches!(session.preview_state(), ConnectionState::Connected));

    session.apply_color_scheme("midnight");
    assert!(embed.handle(preview_inbox.recv().await.unwrap()));
    assert!(embed.handle(preview_inbox.recv().await.unwrap()));
    assert_eq!(embed.settings(), &session.blueprint().advanced_settings);

    ping.await.unwrap();
    let ready = dashboard_inbox.recv().await.unwrap();
    assert_eq!(ready.kind, MessageType::PreviewReady);
    session.handle(ready);
    assert!(preview_inbox.try_recv().is_none());
}

#[tokio::test]
async fn posting_to_dropped_side_is_silent() {
    let (a, b) = pair();
    drop(b);
    let mut outbox = a.outbox;
    outbox.post(Message::PreviewReady.into_envelope());

    spawn_ready_ping(outbox, Duration::ZERO).await.unwrap();
}

#[tokio::test]
async fn unsaved_blueprint_reaches_embedded_preview() {
    use std::sync::Arc;
    use crate::{render::MenuError, store::{MemoryStore, NewRestaurant, Store}};

    let store = Arc::new(MemoryStore::default());
    store.create_restaurant(NewRestaurant {
        slug: "kebapci".into(),
        name: "Kebapçı".into(),
        slogan: None,
    }).await.unwrap();

    let mut blueprint = ThemeBlueprint::default_blueprint();
    let mut editor = crate::editor::BlueprintEditor::new(blueprint.clone());
    assert!(editor.apply_color_scheme("midnight"));
    blueprint = editor.into_blueprint();

    let (data, settings) = preview_unsaved(
        store.clone(),
        "kebapci",
        blueprint.clone(),
        Duration::from_millis(1),
    ).await.unwrap();
    assert_eq!(data.restaurant.slug, "kebapci");
    assert_eq!(settings, blueprint.advanced_settings);

    // Nothing was saved.
    let stored = store.restaurant_by_slug("kebapci").await.unwrap().unwrap();
    assert_eq!(stored.theme_config, Some(ThemeBlueprint::default_blueprint().to_json()));

    let missing = preview_unsaved(store, "nope", blueprint, Duration::ZERO).await;
    assert!(matches!(missing, Err(MenuError::NotFound(slug)) if slug == "nope"));
}
