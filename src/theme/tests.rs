use serde_json::json;

use super::*;


#[test]
fn default_copies_are_independent() {
    let mut a = ThemeBlueprint::default_blueprint();
    let b = ThemeBlueprint::default_blueprint();
    assert_eq!(a, b);

    a.advanced_settings.colors.buttons = "#000000".into();
    a.advanced_settings.layout.blocks.clear();
    a.advanced_settings.typography.product_name.font_size = "9rem".into();

    assert_ne!(a, b);
    assert_eq!(ThemeBlueprint::default_blueprint(), b);
}

#[test]
fn default_block_order() {
    assert_eq!(
        ThemeBlueprint::default_blueprint().advanced_settings.layout.blocks,
        ["header", "advertisementHero", "featuredItems", "advertisementButton", "categories", "footer"],
    );
}

#[test]
fn json_shape() {
    let doc = ThemeBlueprint::default_blueprint().to_json();
    assert_eq!(doc["presetId"], PRESET_ID);
    assert_eq!(doc["schemaVersion"], SCHEMA_VERSION);

    let s = &doc["advancedSettings"];
    assert_eq!(s["layout"]["categoryLayout"], "accordion");
    assert_eq!(s["layout"]["productLayout"], "list");
    assert_eq!(s["backgrounds"]["global"]["url"], json!(null));
    assert_eq!(s["backgrounds"]["sections"]["categories"]["opacity"], 1.0);
    assert_eq!(s["colors"].as_object().unwrap().len(), 10);
    assert_eq!(s["colors"]["restaurantName"], "#ffffff");
    assert_eq!(s["components"]["header"]["logoSize"], "medium");
    assert_eq!(s["components"]["header"]["socialIcons"]["iconPack"], "classic");
    assert_eq!(s["components"]["featuredSection"]["enabled"], true);
    assert_eq!(s["components"]["categoryAnimation"]["type"], "bufibu-klasik");
    assert_eq!(s["typography"].as_object().unwrap().len(), 6);
    assert_eq!(s["typography"]["productPrice"]["fontWeight"], "700");
    assert_eq!(s["typography"]["restaurantName"]["alignment"], "center");
}

#[test]
fn block_tags() {
    for kind in BlockKind::ALL {
        assert_eq!(BlockKind::from_tag(kind.tag()), Some(kind));
    }
    assert_eq!(BlockKind::from_tag("newsletter"), None);
    assert_eq!(BlockKind::from_tag("Header"), None);
}

#[test]
fn color_roles() {
    let mut colors = ThemeBlueprint::default_blueprint().advanced_settings.colors;
    for (i, role) in ColorRole::ALL.into_iter().enumerate() {
        colors.set(role, format!("#00000{i}"));
    }
    for (i, role) in ColorRole::ALL.into_iter().enumerate() {
        assert_eq!(colors.get(role), format!("#00000{i}"));
    }
    assert_eq!(ColorRole::ProductDescription.to_string(), "productDescription");
}

#[test]
fn legacy_documents_without_version() {
    let mut doc = ThemeBlueprint::default_blueprint().to_json();
    doc.as_object_mut().unwrap().remove("schemaVersion");

    let migrated = migrate(doc.clone()).unwrap();
    assert_eq!(migrated["schemaVersion"], SCHEMA_VERSION);

    let bp = ThemeBlueprint::from_json(doc).unwrap();
    assert_eq!(bp, ThemeBlueprint::default_blueprint());
}

#[test]
fn newer_or_broken_versions_are_rejected() {
    let mut doc = ThemeBlueprint::default_blueprint().to_json();
    doc["schemaVersion"] = json!(SCHEMA_VERSION + 1);
    assert!(migrate(doc.clone()).is_err());

    doc["schemaVersion"] = json!("one");
    assert!(migrate(doc.clone()).is_err());

    doc["schemaVersion"] = json!(0);
    assert!(migrate(doc).is_err());

    assert!(migrate(json!([])).is_err());
}

#[test]
fn from_json_checks_types() {
    let mut doc = ThemeBlueprint::default_blueprint().to_json();
    doc["advancedSettings"]["components"]["header"]["logoSize"] = json!("huge");
    assert!(ThemeBlueprint::from_json(doc).is_err());
}
