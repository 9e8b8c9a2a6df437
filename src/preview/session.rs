use serde_json::Value;

use crate::{
    editor::BlueprintEditor,
    theme::{SettingError, ThemeBlueprint},
};
use super::{ConnectionState, Envelope, PreviewHost, Transport};


/// One dashboard editing session: the editor state plus the preview link.
/// Every mutation that actually changes something is pushed to the preview
/// (if connected). Mutations that turn out to be no-ops push nothing.
#[derive(Debug)]
pub struct EditSession<T> {
    editor: BlueprintEditor,
    host: PreviewHost<T>,
}

impl<T: Transport> EditSession<T> {
    pub fn new(blueprint: ThemeBlueprint, transport: T) -> Self {
        Self {
            editor: BlueprintEditor::new(blueprint),
            host: PreviewHost::new(transport),
        }
    }

    pub fn editor(&self) -> &BlueprintEditor {
        &self.editor
    }

    pub fn blueprint(&self) -> &ThemeBlueprint {
        self.editor.blueprint()
    }

    pub fn preview_state(&self) -> &ConnectionState {
        self.host.state()
    }

    pub fn transport(&self) -> &T {
        self.host.transport()
    }

    pub fn attach_preview(&mut self) {
        self.host.attach();
    }

    pub fn detach_preview(&mut self) {
        self.host.detach();
    }

    /// Feeds a message from the embedded preview into the host.
    pub fn handle(&mut self, envelope: Envelope) {
        self.host.handle(envelope, self.editor.blueprint());
    }

    pub fn apply_preset(&mut self, key: &str) -> bool {
        let changed = self.editor.apply_preset(key);
        self.sync_if(changed);
        changed
    }

    pub fn apply_color_scheme(&mut self, key: &str) -> bool {
        let changed = self.editor.apply_color_scheme(key);
        self.sync_if(changed);
        changed
    }

    pub fn update_setting(&mut self, path: &str, value: Value) -> Result<(), SettingError> {
        self.editor.update_setting(path, value)?;
        self.sync_if(true);
        Ok(())
    }

    pub fn reset_to_default(&mut self) {
        self.editor.reset_to_default();
        self.sync_if(true);
    }

    pub fn reorder_layout_blocks(&mut self, block: &str, new_index: usize) -> bool {
        let changed = self.editor.reorder_layout_blocks(block, new_index);
        self.sync_if(changed);
        changed
    }

    /// Ends the session, returning the blueprint to save.
    pub fn finish(self) -> ThemeBlueprint {
        self.editor.into_blueprint()
    }

    fn sync_if(&mut self, changed: bool) {
        if changed {
            self.host.blueprint_changed(self.editor.blueprint());
        }
    }
}
