use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::prelude::*;
use super::{AdvancedSettings, ThemeBlueprint};


/// Computes the settings the renderer actually uses from a stored blueprint
/// document, which may be missing, partial or contain garbage.
///
/// Every leaf that is missing, has a different JSON type than the default or
/// holds a value the settings do not accept (e.g. an unknown enum variant)
/// falls back to the default value. All other stored leaves are kept. This
/// never fails.
pub fn resolve_settings(stored: Option<&Value>) -> AdvancedSettings {
    let default = ThemeBlueprint::default_blueprint().advanced_settings;
    let Some(stored) = stored.and_then(|doc| doc.get("advancedSettings")).and_then(Value::as_object)
    else {
        if stored.is_some() {
            debug!("Stored theme has no usable 'advancedSettings', using default theme");
        }
        return default;
    };

    AdvancedSettings {
        layout: section("layout", default.layout, stored),
        backgrounds: section("backgrounds", default.backgrounds, stored),
        colors: section("colors", default.colors, stored),
        components: section("components", default.components, stored),
        typography: section("typography", default.typography, stored),
    }
}

fn section<T: Serialize + DeserializeOwned>(name: &str, default: T, stored: &Map<String, Value>) -> T {
    let Some(patch) = stored.get(name) else {
        return default;
    };

    let mut tree = serde_json::to_value(&default).expect("bug: theme section not serializable");
    let mut leaves = Vec::new();
    collect_leaves(&tree, patch, String::new(), &mut leaves);

    // Leaves are applied one by one on top of the default. A leaf that makes
    // the section undeserializable is reverted, the others stay.
    for (pointer, value) in leaves {
        let Some(slot) = tree.pointer_mut(&pointer) else { continue };
        let old = std::mem::replace(slot, value);
        if let Err(e) = T::deserialize(&tree) {
            warn!("Ignoring unusable stored theme value '{name}{pointer}': {e}");
            if let Some(slot) = tree.pointer_mut(&pointer) {
                *slot = old;
            }
        }
    }

    match T::deserialize(&tree) {
        Ok(v) => v,
        Err(e) => {
            warn!("Stored theme section '{name}' is unusable, falling back to default: {e}");
            default
        }
    }
}

/// Collects JSON pointers (relative to `base`) and values of all leaves in
/// `patch` whose JSON type agrees with the one in `base` and that differ
/// from it. Keys that `base` does not have are ignored.
fn collect_leaves(base: &Value, patch: &Value, pointer: String, out: &mut Vec<(String, Value)>) {
    if let (Value::Object(base), Value::Object(patch)) = (base, patch) {
        for (key, base_value) in base {
            if let Some(patch_value) = patch.get(key) {
                let escaped = key.replace('~', "~0").replace('/', "~1");
                collect_leaves(base_value, patch_value, format!("{pointer}/{escaped}"), out);
            }
        }
        return;
    }

    let compatible = match (base, patch) {
        (Value::Null, Value::Null | Value::String(_)) => true,
        (Value::String(_), Value::String(_))
        | (Value::Number(_), Value::Number(_))
        | (Value::Bool(_), Value::Bool(_))
        | (Value::Array(_), Value::Array(_)) => true,
        _ => false,
    };
    if compatible && base != patch {
        out.push((pointer, patch.clone()));
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::theme::{AnimationType, LogoSize};
    use super::*;


    fn default() -> AdvancedSettings {
        ThemeBlueprint::default_blueprint().advanced_settings
    }

    #[test]
    fn nothing_stored() {
        assert_eq!(resolve_settings(None), default());
        assert_eq!(resolve_settings(Some(&json!(null))), default());
        assert_eq!(resolve_settings(Some(&json!({ "presetId": "x" }))), default());
        assert_eq!(resolve_settings(Some(&json!({ "advancedSettings": 5 }))), default());
    }

    #[test]
    fn full_blueprint_roundtrips() {
        let mut bp = ThemeBlueprint::default_blueprint();
        bp.advanced_settings.colors.body = "#123456".into();
        bp.advanced_settings.components.header.logo_size = LogoSize::Large;
        assert_eq!(resolve_settings(Some(&bp.to_json())), bp.advanced_settings);
    }

    #[test]
    fn missing_sections_and_leaves() {
        let stored = json!({
            "advancedSettings": {
                "colors": { "buttons": "#000000" },
                "components": { "featuredSection": { "enabled": false } },
            }
        });
        let resolved = resolve_settings(Some(&stored));

        let mut expected = default();
        expected.colors.buttons = "#000000".into();
        expected.components.featured_section.enabled = false;
        assert_eq!(resolved, expected);
    }

    #[test]
    fn wrong_leaf_types_fall_back() {
        let stored = json!({
            "advancedSettings": {
                "backgrounds": {
                    "global": { "url": "https://img.example/a.jpg", "opacity": "very" },
                },
                "colors": { "body": 12, "cards": "#eeeeee", "extra": "#fff" },
            }
        });
        let resolved = resolve_settings(Some(&stored));

        let d = default();
        assert_eq!(resolved.backgrounds.global.url.as_deref(), Some("https://img.example/a.jpg"));
        assert_eq!(resolved.backgrounds.global.opacity, d.backgrounds.global.opacity);
        assert_eq!(resolved.colors.body, d.colors.body);
        assert_eq!(resolved.colors.cards, "#eeeeee");
    }

    #[test]
    fn bad_enum_resets_only_that_leaf() {
        let stored = json!({
            "advancedSettings": {
                "components": {
                    "featuredSection": { "enabled": false },
                    "header": { "logoSize": "enormous" },
                    "categoryAnimation": { "type": "none" },
                },
                "colors": { "header": "#101010" },
            }
        });
        let resolved = resolve_settings(Some(&stored));

        let d = default();
        assert!(!resolved.components.featured_section.enabled);
        assert_eq!(resolved.components.header.logo_size, d.components.header.logo_size);
        assert_eq!(resolved.components.category_animation.kind, AnimationType::None);
        assert_eq!(resolved.colors.header, "#101010");

        let mut expected = d;
        expected.components.featured_section.enabled = false;
        expected.components.category_animation.kind = AnimationType::None;
        expected.colors.header = "#101010".into();
        assert_eq!(resolved, expected);
    }
}
