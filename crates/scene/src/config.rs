use serde::{Deserialize, Serialize};

/// Tunables for scene building and region selection.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Half side length of the projected square (scene units).
    pub half_extent: f64,
    /// Maximum number of structures kept per build, tallest first.
    pub max_structures: usize,
    pub meters_per_level: f64,
    /// Height used when no height attribute parses (meters).
    pub default_height_m: f64,
    /// Extrusion depth is `height / depth_divisor`, clamped to `[min_depth, max_depth]`.
    pub depth_divisor: f64,
    pub min_depth: f64,
    pub max_depth: f64,
    pub camera_distance_factor: f64,
    pub fallback_camera_distance: f64,
    /// Longest allowed side of a selected region (meters).
    pub max_selection_side_m: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            half_extent: 50.0,
            max_structures: 3000,
            meters_per_level: 3.0,
            default_height_m: 10.0,
            depth_divisor: 12.0,
            min_depth: 2.0,
            max_depth: 30.0,
            camera_distance_factor: 1.8,
            fallback_camera_distance: 20.0,
            max_selection_side_m: 10_000.0,
        }
    }
}

/// A configuration value outside its allowed range.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl SceneConfig {
    /// Rejects values the builder and selector cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("half_extent", self.half_extent),
            ("meters_per_level", self.meters_per_level),
            ("depth_divisor", self.depth_divisor),
            ("camera_distance_factor", self.camera_distance_factor),
            ("fallback_camera_distance", self.fallback_camera_distance),
            ("max_selection_side_m", self.max_selection_side_m),
        ];
        for (field, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError {
                    field,
                    reason: "must be a positive finite number",
                });
            }
        }
        for (field, v) in [
            ("default_height_m", self.default_height_m),
            ("min_depth", self.min_depth),
            ("max_depth", self.max_depth),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ConfigError {
                    field,
                    reason: "must be a non-negative finite number",
                });
            }
        }
        if self.min_depth > self.max_depth {
            return Err(ConfigError {
                field: "min_depth",
                reason: "must not exceed max_depth",
            });
        }
        Ok(())
    }
}
