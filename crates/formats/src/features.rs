use std::collections::BTreeMap;

use foundation::math::GeoPoint;
use serde_json::{Map, Value};

/// String attributes of a feature (`building`, `highway`, `height`, ...).
pub type Attributes = BTreeMap<String, String>;

/// A ring or line as an ordered list of `(lon, lat)` positions.
pub type GeoPath = Vec<GeoPoint>;

/// Closed set of geometry kinds the pipeline understands.
///
/// Polygons hold their rings outer-first; consumers only ever read the outer
/// ring.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(GeoPoint),
    LineString(GeoPath),
    MultiLineString(Vec<GeoPath>),
    Polygon(Vec<GeoPath>),
    MultiPolygon(Vec<Vec<GeoPath>>),
}

impl FeatureGeometry {
    pub fn is_line_shaped(&self) -> bool {
        match self {
            FeatureGeometry::LineString(_) | FeatureGeometry::MultiLineString(_) => true,
            FeatureGeometry::Point(_)
            | FeatureGeometry::Polygon(_)
            | FeatureGeometry::MultiPolygon(_) => false,
        }
    }

    pub fn is_polygon_shaped(&self) -> bool {
        match self {
            FeatureGeometry::Polygon(_) | FeatureGeometry::MultiPolygon(_) => true,
            FeatureGeometry::Point(_)
            | FeatureGeometry::LineString(_)
            | FeatureGeometry::MultiLineString(_) => false,
        }
    }

    /// Outer ring of every polygon member. Holes are not returned.
    pub fn outer_rings(&self) -> Vec<&[GeoPoint]> {
        match self {
            FeatureGeometry::Polygon(rings) => rings.first().map(Vec::as_slice).into_iter().collect(),
            FeatureGeometry::MultiPolygon(polys) => polys
                .iter()
                .filter_map(|rings| rings.first().map(Vec::as_slice))
                .collect(),
            FeatureGeometry::Point(_)
            | FeatureGeometry::LineString(_)
            | FeatureGeometry::MultiLineString(_) => Vec::new(),
        }
    }

    /// Every line string, in input order.
    pub fn lines(&self) -> Vec<&[GeoPoint]> {
        match self {
            FeatureGeometry::LineString(line) => vec![line.as_slice()],
            FeatureGeometry::MultiLineString(lines) => lines.iter().map(Vec::as_slice).collect(),
            FeatureGeometry::Point(_)
            | FeatureGeometry::Polygon(_)
            | FeatureGeometry::MultiPolygon(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorFeature {
    pub id: Option<String>,
    pub attributes: Attributes,
    pub geometry: FeatureGeometry,
}

impl VectorFeature {
    pub fn new(geometry: FeatureGeometry) -> Self {
        Self {
            id: None,
            attributes: Attributes::new(),
            geometry,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Ordered, decoded feature collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<VectorFeature>,
}

#[derive(Debug)]
pub enum FeatureDecodeError {
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for FeatureDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureDecodeError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            FeatureDecodeError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for FeatureDecodeError {}

impl FeatureCollection {
    pub fn new(features: Vec<VectorFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, FeatureDecodeError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| FeatureDecodeError::InvalidFeature {
                index: 0,
                reason: format!("JSON parse error: {e}"),
            })?;
        Self::from_geojson_value(value)
    }

    /// Decodes a GeoJSON FeatureCollection.
    ///
    /// Features with a `null` geometry or a geometry kind outside
    /// `FeatureGeometry` are skipped; structurally broken features are errors.
    pub fn from_geojson_value(value: Value) -> Result<Self, FeatureDecodeError> {
        let obj = value
            .as_object()
            .ok_or(FeatureDecodeError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(FeatureDecodeError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(FeatureDecodeError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(FeatureDecodeError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        let mut skipped = 0usize;
        for (index, feat_val) in features_val.iter().enumerate() {
            let feat_obj = feat_val
                .as_object()
                .ok_or(FeatureDecodeError::InvalidFeature {
                    index,
                    reason: "feature must be an object".to_string(),
                })?;

            let id = match feat_obj.get("id") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };

            let attributes = feat_obj
                .get("properties")
                .and_then(|v| v.as_object())
                .map(stringify_properties)
                .unwrap_or_default();

            let geometry = match feat_obj.get("geometry") {
                None | Some(Value::Null) => {
                    skipped += 1;
                    continue;
                }
                Some(g) => parse_geometry(g)
                    .map_err(|reason| FeatureDecodeError::InvalidFeature { index, reason })?,
            };
            let Some(geometry) = geometry else {
                skipped += 1;
                continue;
            };

            features.push(VectorFeature {
                id,
                attributes,
                geometry,
            });
        }

        if skipped > 0 {
            tracing::debug!(skipped, kept = features.len(), "skipped unsupported features");
        }

        Ok(Self { features })
    }
}

fn stringify_properties(props: &Map<String, Value>) -> Attributes {
    let mut out = Attributes::new();
    for (key, value) in props {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => other.to_string(),
        };
        out.insert(key.clone(), text);
    }
    out
}

/// `Ok(None)` for geometry kinds the pipeline does not model.
fn parse_geometry(value: &Value) -> Result<Option<FeatureGeometry>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    if !matches!(
        ty,
        "Point" | "LineString" | "MultiLineString" | "Polygon" | "MultiPolygon"
    ) {
        return Ok(None);
    }

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    let geometry = match ty {
        "Point" => FeatureGeometry::Point(parse_point(coords)?),
        "LineString" => FeatureGeometry::LineString(parse_points(coords)?),
        "MultiLineString" => FeatureGeometry::MultiLineString(parse_lines(coords)?),
        "Polygon" => FeatureGeometry::Polygon(parse_lines(coords)?),
        _ => FeatureGeometry::MultiPolygon(parse_multi_polygon(coords)?),
    };
    Ok(Some(geometry))
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

fn parse_points(coords: &Value) -> Result<GeoPath, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    arr.iter().map(parse_point).collect()
}

fn parse_lines(coords: &Value) -> Result<Vec<GeoPath>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array of paths".to_string())?;
    arr.iter().map(parse_points).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<GeoPath>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_lines).collect()
}
