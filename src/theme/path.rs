//! Dot-separated paths into `advancedSettings`, e.g.
//! `typography.productName.fontSize`.
//!
//! Paths are checked against the shape of the settings: only keys that exist
//! can be written, and the resulting settings must still deserialize. Values
//! are not range-checked, so an opacity of `1.5` is stored as given.

use std::{fmt, str::FromStr};

use serde_json::Value;

use super::AdvancedSettings;


#[derive(Debug, thiserror::Error)]
pub enum SettingError {
    #[error("empty setting path")]
    EmptyPath,

    #[error("setting path '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("unknown setting '{path}'")]
    UnknownPath { path: String },

    #[error("'{path}' is a group of settings and cannot be assigned a single value")]
    NotALeaf { path: String },

    #[error("invalid value for '{path}': {source}")]
    InvalidValue {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A parsed, non-empty setting path. Whether it exists is only known once it
/// is applied to settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingPath {
    segments: Vec<String>,
}

impl SettingPath {
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Writes `value` at this path. On error, `settings` is left unchanged.
    pub fn apply(&self, settings: &mut AdvancedSettings, value: Value) -> Result<(), SettingError> {
        let mut tree = serde_json::to_value(&*settings)
            .expect("bug: advanced settings not serializable");

        let (last, parents) = self.segments.split_last().expect("setting path is never empty");
        let mut node = &mut tree;
        for segment in parents {
            node = match node.get_mut(segment.as_str()) {
                Some(child) if child.is_object() => child,
                _ => return Err(self.unknown()),
            };
        }

        let slot = node.as_object_mut()
            .and_then(|obj| obj.get_mut(last.as_str()))
            .ok_or_else(|| self.unknown())?;

        // Whole sections or arrays may be swapped out, but not replaced by a
        // scalar.
        if slot.is_object() && !value.is_object() {
            return Err(SettingError::NotALeaf { path: self.to_string() });
        }
        *slot = value;

        *settings = serde_json::from_value(tree).map_err(|source| SettingError::InvalidValue {
            path: self.to_string(),
            source,
        })?;

        Ok(())
    }

    fn unknown(&self) -> SettingError {
        SettingError::UnknownPath { path: self.to_string() }
    }
}

impl FromStr for SettingPath {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SettingError::EmptyPath);
        }

        let segments = s.split('.').map(str::to_owned).collect::<Vec<_>>();
        if segments.iter().any(String::is_empty) {
            return Err(SettingError::EmptySegment(s.into()));
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for SettingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
