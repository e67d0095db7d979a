use formats::VectorFeature;
use scene::SceneConfig;

/// Height of a structure in meters.
///
/// Resolution order: `height`, `building:height`, then `levels` or
/// `building:levels` times meters-per-level, then the configured default.
/// A value that does not parse falls through to the next source.
pub fn estimate_height(feature: &VectorFeature, config: &SceneConfig) -> f64 {
    ["height", "building:height"]
        .iter()
        .find_map(|k| feature.attr(k).and_then(parse_measure))
        .or_else(|| {
            ["levels", "building:levels"]
                .iter()
                .find_map(|k| feature.attr(k).and_then(parse_measure))
                .map(|levels| levels * config.meters_per_level)
        })
        .unwrap_or(config.default_height_m)
}

/// Extrusion depth in scene units for a height in meters.
///
/// The upper bound wins when `min_depth > max_depth`.
pub fn extrusion_depth(height_m: f64, config: &SceneConfig) -> f64 {
    (height_m / config.depth_divisor)
        .max(config.min_depth)
        .min(config.max_depth)
}

/// Float value of `raw`. Unit-suffixed values fall back to their leading
/// decimal number, so `"12.5 m"` reads as 12.5.
fn parse_measure(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    let end = s
        .char_indices()
        .find(|&(i, c)| {
            !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0))
        })
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
