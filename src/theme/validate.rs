//! Shallow structural validation of candidate blueprint documents.
//!
//! Only the preset family and the presence of the five `advancedSettings`
//! sections are checked. Field types, enum values, hex formats and numeric
//! ranges are deliberately not looked at: the renderer falls back to defaults
//! for anything it cannot use (see [`super::resolve_settings`]).

use serde::Serialize;
use serde_json::Value;

use super::PRESET_ID;


/// The sections that `advancedSettings` has to contain.
pub const REQUIRED_SECTIONS: [&str; 5] = ["layout", "backgrounds", "colors", "components", "typography"];

/// Outcome of [`validate`]. Errors are human readable and in no particular
/// order; callers decide whether to block a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }
}

/// Checks `candidate` against the blueprint structure. Never modifies the
/// candidate and never fails: every problem ends up in `errors`.
pub fn validate(candidate: &Value) -> Validation {
    let Some(obj) = candidate.as_object() else {
        return Validation::from_errors(vec!["theme blueprint must be a JSON object".into()]);
    };

    let mut errors = Vec::new();
    match obj.get("presetId") {
        Some(Value::String(id)) if id == PRESET_ID => {}
        Some(Value::String(id)) => errors.push(format!(
            "unsupported presetId '{id}', expected '{PRESET_ID}'",
        )),
        Some(_) => errors.push(format!("presetId must be the string '{PRESET_ID}'")),
        None => errors.push("missing presetId".into()),
    }

    match obj.get("advancedSettings").and_then(Value::as_object) {
        None => errors.push("missing advancedSettings object".into()),
        Some(settings) => {
            for section in REQUIRED_SECTIONS {
                if !settings.contains_key(section) {
                    errors.push(format!("missing advancedSettings section '{section}'"));
                }
            }
        }
    }

    Validation::from_errors(errors)
}
