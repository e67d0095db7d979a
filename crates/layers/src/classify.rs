use formats::VectorFeature;
use scene::LayerKind;

/// Semantic layer assigned to a feature; `None` features are not rendered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerTag {
    Structure,
    Transport,
    Green,
    Water,
    None,
}

impl LayerTag {
    pub fn layer(self) -> Option<LayerKind> {
        match self {
            LayerTag::Structure => Some(LayerKind::Structures),
            LayerTag::Transport => Some(LayerKind::Transport),
            LayerTag::Green => Some(LayerKind::Green),
            LayerTag::Water => Some(LayerKind::Water),
            LayerTag::None => None,
        }
    }
}

const BUILDING_KEYS: [&str; 3] = ["building", "building:part", "building:use"];

/// Assigns a feature to a layer. Rules are checked in priority order and the
/// first match wins.
pub fn classify(feature: &VectorFeature) -> LayerTag {
    let line = feature.geometry.is_line_shaped();
    let area = feature.geometry.is_polygon_shaped();
    let has = |key: &str| feature.attr(key).is_some();
    let is = |key: &str, value: &str| feature.attr(key) == Some(value);

    if has("highway") && line {
        LayerTag::Transport
    } else if BUILDING_KEYS.iter().any(|k| has(k)) && area {
        LayerTag::Structure
    } else if (is("leisure", "park") || is("landuse", "grass")) && area {
        LayerTag::Green
    } else if (is("natural", "water") || is("waterway", "riverbank")) && area {
        LayerTag::Water
    } else {
        LayerTag::None
    }
}
