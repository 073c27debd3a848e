//! Profile documents as JSON values.
//!
//! The typed [`StereoConfig`] is the canonical form; these helpers cover the
//! cases where the on-disk document has to be edited as a tree, such as
//! back-filling `default_config.json`, patching a few keys of it, or
//! layering an application profile over the running config.

use openstereo_input::{BindType, BoundKey};
use serde::Serialize;
use serde::de::Error as _;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{StereoConfig, UserPreset};

/// Keys an application profile carries. Window, layout, timing and port
/// settings come from `default_config.json` only.
pub const PROFILE_KEYS: [&str; 13] = [
    "hmd_height",
    "fov",
    "depth",
    "convergence",
    "pitch_enable",
    "yaw_enable",
    "pose_reset_key",
    "ctrl_toggle_key",
    "ctrl_toggle_type",
    "pitch_radius",
    "ctrl_deadzone",
    "ctrl_sensitivity",
    "user_settings",
];

/// The profile keys of a config, in [`PROFILE_KEYS`] order.
#[derive(Serialize)]
struct ProfileKeys<'a> {
    hmd_height: f32,
    fov: f32,
    depth: f32,
    convergence: f32,
    pitch_enable: bool,
    yaw_enable: bool,
    pose_reset_key: &'a BoundKey,
    ctrl_toggle_key: &'a BoundKey,
    ctrl_toggle_type: BindType,
    pitch_radius: f32,
    ctrl_deadzone: f32,
    ctrl_sensitivity: f32,
    user_settings: &'a [UserPreset],
}

impl<'a> From<&'a StereoConfig> for ProfileKeys<'a> {
    fn from(config: &'a StereoConfig) -> Self {
        Self {
            hmd_height: config.hmd_height,
            fov: config.fov,
            depth: config.depth,
            convergence: config.convergence,
            pitch_enable: config.pitch_enable,
            yaw_enable: config.yaw_enable,
            pose_reset_key: &config.pose_reset_key,
            ctrl_toggle_key: &config.ctrl_toggle_key,
            ctrl_toggle_type: config.ctrl_toggle_type,
            pitch_radius: config.pitch_radius,
            ctrl_deadzone: config.ctrl_deadzone,
            ctrl_sensitivity: config.ctrl_sensitivity,
            user_settings: &config.user_settings,
        }
    }
}

/// Serialize a config in canonical key order.
///
/// # Errors
///
/// Returns the serializer error; with the types involved that only happens
/// for non-finite floats, which serialize as `null` and never fail.
pub fn to_document(config: &StereoConfig) -> serde_json::Result<String> {
    serde_json::to_string_pretty(config)
}

/// Serialize only the profile keys of a config.
///
/// # Errors
///
/// Same as [`to_document`].
pub fn to_profile_document(config: &StereoConfig) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ProfileKeys::from(config))
}

/// Copy the profile keys present in `document` onto `base`.
///
/// Keys missing from the document keep the base value; keys outside
/// [`PROFILE_KEYS`] are ignored.
///
/// # Errors
///
/// Fails if the document is not an object or a profile key has the wrong
/// type.
pub fn overlay_profile_keys(
    base: &StereoConfig,
    document: &Value,
) -> serde_json::Result<StereoConfig> {
    let Some(source) = document.as_object() else {
        return Err(serde_json::Error::custom("profile document is not an object"));
    };
    let mut merged = match serde_json::to_value(base)? {
        Value::Object(map) => map,
        _ => return Err(serde_json::Error::custom("config did not serialize to an object")),
    };
    for key in PROFILE_KEYS {
        if let Some(value) = source.get(key) {
            merged.insert(key.to_owned(), value.clone());
        }
    }
    let ignored = source.keys().filter(|k| !PROFILE_KEYS.contains(&k.as_str())).count();
    if ignored > 0 {
        debug!(ignored, "Profile keys outside the per-application set left alone");
    }

    let mut config: StereoConfig = serde_json::from_value(Value::Object(merged))?;
    config.update_render_size();
    Ok(config)
}

/// Merge `existing` over the defaults.
///
/// Keys are visited in canonical order. An existing value is kept only if the
/// config still deserializes with it in place, so a value of the wrong type
/// reverts to its default instead of poisoning the whole document. Keys the
/// schema does not know are dropped. A non-object document yields the
/// defaults.
pub fn reorder_fill(existing: &Value) -> StereoConfig {
    let defaults = StereoConfig::default();
    let Ok(Value::Object(mut merged)) = serde_json::to_value(&defaults) else {
        return defaults;
    };
    let Some(existing) = existing.as_object() else {
        warn!("Profile document is not an object, using defaults");
        return defaults;
    };

    let keys: Vec<String> = merged.keys().cloned().collect();
    for key in keys {
        let Some(value) = existing.get(&key) else {
            debug!(key = %key, "Back-filling missing profile key");
            continue;
        };
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value.clone());
        if serde_json::from_value::<StereoConfig>(Value::Object(candidate.clone())).is_ok() {
            merged = candidate;
        } else {
            warn!(key = %key, "Profile value has the wrong type, reverting to default");
        }
    }

    from_object(merged).unwrap_or(defaults)
}

/// Overwrite selected top-level keys of a document, keeping everything else.
///
/// A document that is not an object is replaced by an object holding only
/// the patch.
pub fn patch_keys(document: &mut Value, patch: impl IntoIterator<Item = (&'static str, Value)>) {
    if !document.is_object() {
        *document = Value::Object(Map::new());
    }
    if let Value::Object(map) = document {
        for (key, value) in patch {
            map.insert(key.to_owned(), value);
        }
    }
}

fn from_object(map: Map<String, Value>) -> Option<StereoConfig> {
    let mut config: StereoConfig = serde_json::from_value(Value::Object(map)).ok()?;
    config.update_render_size();
    Some(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fill_keeps_valid_values_and_drops_unknown_keys() {
        let existing = json!({
            "fov": 100.0,
            "tab_enable": true,
            "no_such_key": 1,
        });
        let merged = reorder_fill(&existing);
        assert_eq!(merged.fov.to_bits(), 100.0_f32.to_bits());
        assert!(merged.tab_enable);
        assert_eq!(merged.render_height, 540);
        assert_eq!(merged.window_width, StereoConfig::default().window_width);
    }

    #[test]
    fn fill_reverts_wrong_types() {
        let existing = json!({
            "depth": "deep",
            "window_width": -5,
            "convergence": 2.5,
        });
        let merged = reorder_fill(&existing);
        assert_eq!(merged.depth.to_bits(), StereoConfig::default().depth.to_bits());
        assert_eq!(merged.window_width, 1920);
        assert_eq!(merged.convergence.to_bits(), 2.5_f32.to_bits());
    }

    #[test]
    fn fill_of_non_object_is_default() {
        assert_eq!(reorder_fill(&json!([1, 2, 3])), StereoConfig::default());
    }

    #[test]
    fn document_is_in_canonical_order() -> Result<(), Box<dyn std::error::Error>> {
        let text = to_document(&StereoConfig::default())?;
        let window = text.find("\"window_x\"").ok_or("window_x missing")?;
        let presets = text.find("\"user_settings\"").ok_or("user_settings missing")?;
        assert!(window < presets);
        assert!(!text.contains("render_width"));
        Ok(())
    }

    #[test]
    fn profile_document_holds_only_profile_keys_in_order()
    -> Result<(), Box<dyn std::error::Error>> {
        let text = to_profile_document(&StereoConfig::default())?;
        let value: Value = serde_json::from_str(&text)?;
        let mut keys: Vec<&str> = value
            .as_object()
            .ok_or("not an object")?
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        let mut expected = PROFILE_KEYS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys, expected);

        let positions: Vec<Option<usize>> =
            PROFILE_KEYS.iter().map(|k| text.find(&format!("\"{k}\""))).collect();
        assert!(positions.iter().all(Option::is_some));
        assert!(positions.windows(2).all(|w| w.first() < w.get(1)));
        Ok(())
    }

    #[test]
    fn overlay_takes_profile_keys_and_ignores_the_rest() -> Result<(), Box<dyn std::error::Error>> {
        let base = StereoConfig {
            window_width: 3840,
            window_height: 2160,
            hmd_x: 0.5,
            ..StereoConfig::default()
        };
        let merged = overlay_profile_keys(
            &base,
            &json!({ "depth": 0.2, "fov": 70.0, "window_width": 640, "hmd_x": 9.0 }),
        )?;
        assert_eq!(merged.depth.to_bits(), 0.2_f32.to_bits());
        assert_eq!(merged.fov.to_bits(), 70.0_f32.to_bits());
        assert_eq!(merged.window_width, 3840);
        assert_eq!(merged.render_width, 1920);
        assert_eq!(merged.hmd_x.to_bits(), 0.5_f32.to_bits());
        assert_eq!(merged.convergence.to_bits(), base.convergence.to_bits());
        Ok(())
    }

    #[test]
    fn overlay_rejects_wrong_types_and_non_objects() {
        let base = StereoConfig::default();
        assert!(overlay_profile_keys(&base, &json!({ "depth": "deep" })).is_err());
        assert!(overlay_profile_keys(&base, &json!([0.2])).is_err());
    }

    #[test]
    fn patch_replaces_only_named_keys() {
        let mut doc = json!({ "hmd_x": 0.0, "fov": 70.0 });
        patch_keys(&mut doc, [("hmd_x", json!(1.5))]);
        assert_eq!(doc, json!({ "hmd_x": 1.5, "fov": 70.0 }));
    }
}
