use std::time::Duration;

use serde::{Deserialize, Serialize, de};

/// Edge auto-scroll tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoScrollConfig {
    /// Height of the band along the top and bottom edges that triggers scrolling, in pixels.
    pub edge_threshold: f64,
    /// Scroll speed at the very edge, in pixels per frame.
    pub max_speed: f64,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 48.0,
            max_speed: 18.0,
        }
    }
}

/// Timing and distance tuning for a drag session.
///
/// Every field has a default, so a settings file only needs to name what it overrides:
///
/// ```json
/// { "long_press_ms": 300, "auto_scroll": { "max_speed": 24.0 } }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// How long a pointer must be held before a touch drag starts.
    pub long_press_ms: u64,
    /// How far a pointer may wander before the long-press fires without being treated as a
    /// scroll gesture, in pixels.
    pub move_tolerance: f64,
    /// How often cached drop-zone bounds are re-captured during a pointer drag.
    pub zone_refresh_ms: u64,
    /// How long a drag must hover a collapsed container before it expands.
    pub hover_expand_ms: u64,
    /// Length of the reflow animation.
    pub flip_duration_ms: u64,
    pub auto_scroll: AutoScrollConfig,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 400,
            move_tolerance: 10.0,
            zone_refresh_ms: 250,
            hover_expand_ms: 700,
            flip_duration_ms: 200,
            auto_scroll: AutoScrollConfig::default(),
        }
    }
}

impl DragConfig {
    /// Parse a settings object. Keys that are left out keep their defaults; anything other than
    /// a JSON object is an error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(de::Error::custom("drag config must be a JSON object"));
        }
        if value.get("auto_scroll").is_some_and(|nested| !nested.is_object()) {
            return Err(de::Error::custom("auto_scroll must be a JSON object"));
        }
        serde_json::from_value(value)
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn zone_refresh(&self) -> Duration {
        Duration::from_millis(self.zone_refresh_ms)
    }

    pub fn hover_expand(&self) -> Duration {
        Duration::from_millis(self.hover_expand_ms)
    }

    pub fn flip_duration(&self) -> Duration {
        Duration::from_millis(self.flip_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "long_press_ms": 300, "auto_scroll": { "max_speed": 24.0 } }"#;
        let config = DragConfig::from_json(json).unwrap();
        assert_eq!(config.long_press(), Duration::from_millis(300));
        assert_eq!(config.move_tolerance, 10.0);
        assert_eq!(config.auto_scroll.max_speed, 24.0);
        assert_eq!(config.auto_scroll.edge_threshold, 48.0);
    }

    #[test]
    fn empty_object_is_the_default() {
        assert_eq!(DragConfig::from_json("{}").unwrap(), DragConfig::default());
        assert!(DragConfig::from_json("[1, 2]").is_err());
    }

    #[test]
    fn positional_values_are_rejected() {
        let err = DragConfig::from_json("[400, 10]").unwrap_err();
        assert!(err.to_string().contains("JSON object"));
        assert!(DragConfig::from_json("400").is_err());
        assert!(DragConfig::from_json(r#"{ "auto_scroll": [48.0, 18.0] }"#).is_err());
    }
}
