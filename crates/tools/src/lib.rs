//! Command implementations behind the `geomesh` binary.

use std::fs;
use std::path::Path;

use formats::FeatureCollection;
use foundation::math::{GeoPoint, geodesic_distance};
use foundation::region::GeoRegion;
use layers::{BuildOutcome, SceneBuilder, SceneSession};
use scene::selection::RegionSelector;
use scene::SceneConfig;
use serde::Serialize;
use viewer::{ViewPreset, ViewerStateMachine};

/// Parses `N` comma separated numbers, e.g. `"1.5,2,3"`.
pub fn parse_floats<const N: usize>(raw: &str, what: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("{what}: expected {N} comma separated numbers, got {raw:?}"));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("{what}: {part:?} is not a number"))?;
    }
    Ok(out)
}

pub fn parse_bbox(raw: &str) -> Result<GeoRegion, String> {
    let [w, s, e, n] = parse_floats::<4>(raw, "bbox")?;
    GeoRegion::new(w, s, e, n).map_err(|e| format!("bbox: {e}"))
}

pub fn parse_lonlat(raw: &str, what: &str) -> Result<GeoPoint, String> {
    let [lon, lat] = parse_floats::<2>(raw, what)?;
    Ok(GeoPoint::new(lon, lat))
}

/// Defaults, overridden by the JSON file at `path` when given.
pub fn load_config(path: Option<&Path>) -> Result<SceneConfig, String> {
    let Some(path) = path else {
        return Ok(SceneConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let config: SceneConfig =
        serde_json::from_str(&text).map_err(|e| format!("parse {path:?}: {e}"))?;
    config
        .validate()
        .map_err(|e| format!("config {path:?}: {e}"))?;
    Ok(config)
}

#[derive(Debug, Serialize)]
pub struct SceneSummary {
    pub installed: bool,
    pub generation: Option<u64>,
    pub features: usize,
    pub structures: usize,
    pub structures_kept: usize,
    pub volumes: usize,
    pub polylines: usize,
    pub green_shapes: usize,
    pub water_shapes: usize,
    pub dropped: usize,
    pub camera_distance: Option<f64>,
    pub size: Option<[f64; 3]>,
}

/// Builds a scene from GeoJSON text. With `out`, the structure volumes are
/// written there as mesh text.
pub fn run_scene(
    region: &GeoRegion,
    geojson: &str,
    config: SceneConfig,
    out: Option<&Path>,
) -> Result<SceneSummary, String> {
    let features =
        FeatureCollection::from_geojson_str(geojson).map_err(|e| format!("geojson: {e}"))?;
    let mut session = SceneSession::new(SceneBuilder::new(config));
    let request = session.request();
    let outcome = session
        .complete(request, region, &features)
        .ok_or("scene request was superseded")?;
    let world = session.world();
    let stats = outcome.stats();
    let generation = match outcome {
        BuildOutcome::Installed { generation, .. } => Some(generation.0),
        BuildOutcome::NoStructures { .. } => None,
    };

    if let Some(out) = out {
        match world.export_mesh_text() {
            Some(text) => {
                fs::write(out, text).map_err(|e| format!("write {out:?}: {e}"))?;
                tracing::info!(path = %out.display(), "scene mesh written");
            }
            None => tracing::warn!("nothing to export; no structures in region"),
        }
    }

    let framing = world.framing();
    Ok(SceneSummary {
        installed: generation.is_some(),
        generation,
        features: stats.features,
        structures: stats.structures,
        structures_kept: stats.structures_kept,
        volumes: stats.volumes,
        polylines: stats.polylines,
        green_shapes: stats.green_shapes,
        water_shapes: stats.water_shapes,
        dropped: stats.dropped,
        camera_distance: framing.map(|f| f.camera_distance),
        size: framing.map(|f| [f.bounds.size.x, f.bounds.size.y, f.bounds.size.z]),
    })
}

#[derive(Debug, Serialize)]
pub struct MeshSummary {
    pub vertices: usize,
    pub triangles: usize,
    pub rotation_deg: [f64; 3],
    pub bounds_min: [f64; 3],
    pub bounds_max: [f64; 3],
    pub view_center: [f64; 3],
    pub view_distance: f64,
    pub camera_position: [f64; 3],
    pub near: f64,
    pub far: f64,
}

pub fn run_mesh(
    text: &str,
    rotate: Option<[f64; 3]>,
    ground: bool,
    preset: ViewPreset,
    config: SceneConfig,
) -> Result<MeshSummary, String> {
    let mut viewer = ViewerStateMachine::new(config);
    viewer.load_mesh(text).map_err(|e| e.to_string())?;
    if let Some([x, y, z]) = rotate {
        viewer.set_rotation(x, y, z).map_err(|e| e.to_string())?;
    }
    if ground {
        viewer.center_and_ground().map_err(|e| e.to_string())?;
    }
    viewer.apply_view_preset(preset).map_err(|e| e.to_string())?;

    let bounds = viewer.world_bounds().ok_or("no mesh loaded")?;
    let mesh = viewer.mesh().ok_or("no mesh loaded")?;
    let arr = |v: foundation::math::Vec3| [v.x, v.y, v.z];
    let summary = MeshSummary {
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
        rotation_deg: arr(viewer.rotation_deg()),
        bounds_min: arr(bounds.min),
        bounds_max: arr(bounds.max),
        view_center: arr(viewer.view_center()),
        view_distance: viewer.view_distance(),
        camera_position: arr(viewer.camera().position),
        near: viewer.camera().near,
        far: viewer.camera().far,
    };
    viewer.dispose();
    Ok(summary)
}

#[derive(Debug, Serialize)]
pub struct ClampSummary {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    /// Geodesic lengths of the south and west edges.
    pub width_m: f64,
    pub height_m: f64,
}

/// Replays a drag from `anchor` to `live` through the selector.
pub fn run_clamp(anchor: GeoPoint, live: GeoPoint, config: &SceneConfig) -> Result<ClampSummary, String> {
    let mut selector = RegionSelector::new(config.max_selection_side_m);
    selector.on_pointer_down(anchor);
    selector.on_pointer_move(live);
    let region = selector
        .on_pointer_up()
        .ok_or("selection produced no region")?;
    let sw = region.south_west();
    Ok(ClampSummary {
        west: region.west(),
        south: region.south(),
        east: region.east(),
        north: region.north(),
        width_m: geodesic_distance(sw, GeoPoint::new(region.east(), region.south())),
        height_m: geodesic_distance(sw, GeoPoint::new(region.west(), region.north())),
    })
}

#[cfg(test)]
mod tests {
    use super::{load_config, parse_bbox, parse_floats, parse_lonlat, run_clamp, run_mesh, run_scene};
    use foundation::math::GeoPoint;
    use scene::SceneConfig;
    use viewer::ViewPreset;

    const GEOJSON: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {"type": "Feature",
         "properties": {"building": "yes", "building:levels": 5},
         "geometry": {"type": "Polygon", "coordinates": [[[0.001,0.001],[0.003,0.001],[0.003,0.003],[0.001,0.003],[0.001,0.001]]]}},
        {"type": "Feature",
         "properties": {"highway": "service"},
         "geometry": {"type": "LineString", "coordinates": [[0.0,0.0],[0.01,0.01]]}}
      ]
    }"#;

    #[test]
    fn argument_parsing() {
        assert_eq!(parse_floats::<3>("1, 2,3.5", "rotate"), Ok([1.0, 2.0, 3.5]));
        assert!(parse_floats::<3>("1,2", "rotate").is_err());
        assert!(parse_floats::<2>("1,x", "anchor").is_err());
        let region = parse_bbox("2,1,0,0").unwrap();
        assert_eq!((region.west(), region.north()), (0.0, 1.0));
        assert!(parse_bbox("1,1,1,2").is_err());
        assert_eq!(parse_lonlat("3,4", "live"), Ok(GeoPoint::new(3.0, 4.0)));
    }

    #[test]
    fn config_file_is_validated() {
        let path = std::env::temp_dir().join(format!("geomesh-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"min_depth": 40.0}"#).unwrap();
        let bad = load_config(Some(&path));
        std::fs::write(&path, r#"{"max_structures": 10}"#).unwrap();
        let good = load_config(Some(&path));
        let _ = std::fs::remove_file(&path);

        let err = bad.unwrap_err();
        assert!(err.contains("min_depth: must not exceed max_depth"), "{err}");
        assert_eq!(good.unwrap().max_structures, 10);
        assert_eq!(load_config(None), Ok(SceneConfig::default()));
    }

    #[test]
    fn scene_command_builds_and_exports() {
        let region = parse_bbox("0,0,0.01,0.01").unwrap();
        let out = std::env::temp_dir().join(format!("geomesh-scene-{}.obj", std::process::id()));
        let summary = run_scene(&region, GEOJSON, SceneConfig::default(), Some(&out)).unwrap();
        assert!(summary.installed);
        assert_eq!(summary.volumes, 1);
        assert_eq!(summary.polylines, 1);
        let text = std::fs::read_to_string(&out).unwrap();
        let _ = std::fs::remove_file(&out);
        let mesh = formats::mesh_text::parse(&text).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn scene_without_buildings_is_not_an_error() {
        let region = parse_bbox("0,0,0.01,0.01").unwrap();
        let geojson = r#"{"type":"FeatureCollection","features":[]}"#;
        let summary = run_scene(&region, geojson, SceneConfig::default(), None).unwrap();
        assert!(!summary.installed);
        assert_eq!(summary.camera_distance, None);
    }

    #[test]
    fn mesh_command_grounds_and_frames() {
        let text = "v 0 -1 0\nv 2 -1 0\nv 0 3 2\nf 1 2 3\n";
        let s = run_mesh(text, None, true, ViewPreset::Top, SceneConfig::default()).unwrap();
        assert_eq!(s.triangles, 1);
        assert_eq!(s.bounds_min[1], 0.0);
        assert_eq!(s.camera_position[1], s.view_center[1] + s.view_distance);
        assert!(run_mesh("", None, false, ViewPreset::Default, SceneConfig::default()).is_err());
    }

    #[test]
    fn clamp_command_limits_sides() {
        let s = run_clamp(
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.02),
            &SceneConfig::default(),
        )
        .unwrap();
        assert!((s.width_m - 10_000.0).abs() < 0.01, "{}", s.width_m);
        assert_eq!(s.north, 0.02);
    }
}
