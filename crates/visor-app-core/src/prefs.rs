// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! User preference mapping for the Visor client (pointer emulation, input
//! method, display language, timezone).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Symbolic names for where keyboard events originate.
///
/// Published as plain string constants, not an enum: a persisted value
/// outside this set is stored and round-tripped as-is, and interpreting it
/// is the consumer's problem, not the store's.
pub mod input_methods {
    /// No input method. Keyboard events come from a physical keyboard.
    pub const NONE: &str = "none";
    /// Keyboard events generated by the built-in on-screen keyboard.
    pub const OSK: &str = "osk";
    /// Keys inferred from typed text by an IME, such as the native
    /// on-screen keyboard of a mobile device.
    pub const TEXT: &str = "text";
}

/// All currently-set preferences, serialized as one JSON object.
///
/// The four standard fields use fixed camelCase wire names. Anything else
/// found in a persisted snapshot lands in [`extra`](Self::extra) and is
/// written back out unchanged, so snapshots written by a newer client
/// survive a round trip through this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Whether translation of touch to mouse events should emulate an
    /// absolute pointer device, or a relative pointer device.
    pub emulate_absolute_mouse: bool,
    /// Where keyboard events originate. One of the [`input_methods`]
    /// constants by convention; out-of-set values are accepted as-is.
    pub input_method: String,
    /// Key of the desired display language (underscore form, e.g. `en_US`).
    pub language: String,
    /// IANA name of the timezone set by the user.
    pub timezone: String,
    /// Preference keys this build does not recognize, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Preferences {
    /// Seed the default mapping from resolved environment values.
    ///
    /// Pointer emulation defaults to absolute; the input method defaults
    /// to [`input_methods::NONE`].
    pub fn seeded(language: String, timezone: String) -> Self {
        Self {
            emulate_absolute_mouse: true,
            input_method: input_methods::NONE.to_string(),
            language,
            timezone,
            extra: Map::new(),
        }
    }

    /// Shallow overlay of a persisted snapshot onto this mapping.
    ///
    /// Every key present in `snapshot` replaces the corresponding key
    /// wholesale (nested objects are not deep-merged); keys absent from
    /// the snapshot keep their current value; unrecognized keys are added
    /// to [`extra`](Self::extra).
    pub fn overlaid(&self, snapshot: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            // Preferences always serializes to an object.
            _ => Map::new(),
        };
        for (key, value) in snapshot {
            merged.insert(key, value);
        }
        serde_json::from_value(Value::Object(merged))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> Preferences {
        Preferences::seeded("en_US".into(), "America/New_York".into())
    }

    #[test]
    fn serializes_with_wire_key_names() {
        let value = serde_json::to_value(seeded()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("emulateAbsoluteMouse"));
        assert!(obj.contains_key("inputMethod"));
        assert!(obj.contains_key("language"));
        assert!(obj.contains_key("timezone"));
        assert_eq!(obj.len(), 4);
    }

    #[test]
    fn overlay_replaces_present_keys_and_keeps_the_rest() {
        let snapshot = json!({ "inputMethod": "osk" });
        let merged = seeded()
            .overlaid(snapshot.as_object().unwrap().clone())
            .unwrap();
        assert_eq!(merged.input_method, input_methods::OSK);
        assert!(merged.emulate_absolute_mouse);
        assert_eq!(merged.language, "en_US");
        assert_eq!(merged.timezone, "America/New_York");
    }

    #[test]
    fn overlay_carries_unrecognized_keys() {
        let snapshot = json!({ "customFlag": 42 });
        let merged = seeded()
            .overlaid(snapshot.as_object().unwrap().clone())
            .unwrap();
        assert_eq!(merged.extra.get("customFlag"), Some(&json!(42)));
        // And they survive re-serialization at the top level.
        let value = serde_json::to_value(&merged).unwrap();
        assert_eq!(value.get("customFlag"), Some(&json!(42)));
    }

    #[test]
    fn overlay_replaces_nested_objects_wholesale() {
        let first = json!({ "layout": { "rows": 2, "cols": 3 } });
        let second = json!({ "layout": { "rows": 5 } });
        let merged = seeded()
            .overlaid(first.as_object().unwrap().clone())
            .unwrap()
            .overlaid(second.as_object().unwrap().clone())
            .unwrap();
        // No deep merge: "cols" is gone.
        assert_eq!(merged.extra.get("layout"), Some(&json!({ "rows": 5 })));
    }

    #[test]
    fn out_of_set_input_method_is_accepted() {
        let snapshot = json!({ "inputMethod": "telepathy" });
        let merged = seeded()
            .overlaid(snapshot.as_object().unwrap().clone())
            .unwrap();
        assert_eq!(merged.input_method, "telepathy");
    }
}
