//! The dashboard side theme editor: one in-memory blueprint owned by the
//! editing session plus the preset/scheme selection shown in the UI.
//!
//! Nothing here persists anything. Saving is an explicit, separate step
//! through the store.

use serde_json::Value;

use crate::{
    prelude::*,
    theme::{presets, SettingError, SettingPath, ThemeBlueprint},
};


#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintEditor {
    blueprint: ThemeBlueprint,

    /// Only used for highlighting in the UI, never persisted.
    selected_preset: String,
    selected_color_scheme: String,
}

impl BlueprintEditor {
    /// Starts editing the given blueprint, e.g. the one loaded from the store.
    pub fn new(blueprint: ThemeBlueprint) -> Self {
        Self {
            blueprint,
            selected_preset: presets::DEFAULT_PRESET.into(),
            selected_color_scheme: presets::DEFAULT_COLOR_SCHEME.into(),
        }
    }

    pub fn blueprint(&self) -> &ThemeBlueprint {
        &self.blueprint
    }

    pub fn into_blueprint(self) -> ThemeBlueprint {
        self.blueprint
    }

    pub fn selected_preset(&self) -> &str {
        &self.selected_preset
    }

    pub fn selected_color_scheme(&self) -> &str {
        &self.selected_color_scheme
    }

    /// Replaces the whole blueprint with a copy of the preset. Unknown keys
    /// are ignored. Returns whether anything was applied.
    pub fn apply_preset(&mut self, key: &str) -> bool {
        let Some(preset) = presets::theme_preset(key) else {
            debug!("Ignoring unknown theme preset '{key}'");
            return false;
        };

        self.blueprint = preset.blueprint.clone();
        self.selected_preset = key.into();
        true
    }

    /// Overwrites the colors the scheme specifies, leaving everything else as
    /// is. Unknown keys are ignored. Returns whether anything was applied.
    pub fn apply_color_scheme(&mut self, key: &str) -> bool {
        let Some(scheme) = presets::color_scheme(key) else {
            debug!("Ignoring unknown color scheme '{key}'");
            return false;
        };

        scheme.apply_to(&mut self.blueprint.advanced_settings.colors);
        self.selected_color_scheme = key.into();
        true
    }

    /// Sets a single value inside `advancedSettings`, addressed by a dot
    /// separated path like `typography.productName.fontSize`. Values are not
    /// range checked.
    pub fn update_setting(&mut self, path: &str, value: Value) -> Result<(), SettingError> {
        let path: SettingPath = path.parse()?;
        path.apply(&mut self.blueprint.advanced_settings, value)?;
        trace!("Updated theme setting '{path}'");
        Ok(())
    }

    /// Goes back to the canonical default blueprint and default selection.
    pub fn reset_to_default(&mut self) {
        *self = Self::new(ThemeBlueprint::default_blueprint());
    }

    /// Moves the first occurrence of `block` to `new_index` (clamped to the
    /// last position), shifting the blocks in between. Returns `false` and
    /// does nothing if the block is not in the layout.
    pub fn reorder_layout_blocks(&mut self, block: &str, new_index: usize) -> bool {
        let blocks = &mut self.blueprint.advanced_settings.layout.blocks;
        let Some(old_index) = blocks.iter().position(|b| b == block) else {
            debug!("Ignoring reorder of block '{block}' which is not in the layout");
            return false;
        };

        let tag = blocks.remove(old_index);
        let new_index = new_index.min(blocks.len());
        blocks.insert(new_index, tag);
        true
    }
}

impl Default for BlueprintEditor {
    fn default() -> Self {
        Self::new(ThemeBlueprint::default_blueprint())
    }
}
