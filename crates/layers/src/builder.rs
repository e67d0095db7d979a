use formats::{FeatureCollection, VectorFeature};
use foundation::ids::Id;
use foundation::math::{Projector, Vec3, stable_total_cmp_f64};
use foundation::region::GeoRegion;
use scene::components::{Primitive, SceneBounds};
use scene::{LayerKind, SceneBuild, SceneConfig, World};

use crate::classify::{LayerTag, classify};
use crate::height::{estimate_height, extrusion_depth};
use crate::vector::{extrude, flat_shape, footprint, polyline};

/// Flat shapes sit slightly above the ground so coplanar layers do not fight.
pub const GREEN_ELEVATION: f64 = 0.02;
pub const WATER_ELEVATION: f64 = 0.01;

/// A feature with its layer tag and, for structures, its height in meters.
#[derive(Debug, Copy, Clone)]
pub struct ClassifiedFeature<'a> {
    pub feature: &'a VectorFeature,
    pub tag: LayerTag,
    pub height_m: Option<f64>,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub features: usize,
    pub structures: usize,
    pub structures_kept: usize,
    pub volumes: usize,
    pub polylines: usize,
    pub green_shapes: usize,
    pub water_shapes: usize,
    pub dropped: usize,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BuildOutcome {
    Installed { generation: Id, stats: BuildStats },
    /// No structure geometry; the world was left untouched.
    NoStructures { stats: BuildStats },
}

impl BuildOutcome {
    pub fn stats(&self) -> BuildStats {
        match self {
            BuildOutcome::Installed { stats, .. } | BuildOutcome::NoStructures { stats } => *stats,
        }
    }
}

pub fn classify_all<'a>(
    features: &'a FeatureCollection,
    config: &SceneConfig,
) -> Vec<ClassifiedFeature<'a>> {
    features
        .features
        .iter()
        .map(|feature| {
            let tag = classify(feature);
            let height_m = (tag == LayerTag::Structure).then(|| estimate_height(feature, config));
            ClassifiedFeature {
                feature,
                tag,
                height_m,
            }
        })
        .collect()
}

/// Structures sorted tallest first, keeping at most `cap`. Equal heights keep
/// their input order.
pub fn rank_structures<'a>(
    classified: &[ClassifiedFeature<'a>],
    cap: usize,
) -> Vec<ClassifiedFeature<'a>> {
    let mut structures: Vec<ClassifiedFeature<'a>> = classified
        .iter()
        .filter(|c| c.tag == LayerTag::Structure)
        .copied()
        .collect();
    structures.sort_by(|a, b| {
        stable_total_cmp_f64(b.height_m.unwrap_or(0.0), a.height_m.unwrap_or(0.0))
    });
    structures.truncate(cap);
    structures
}

/// Turns a feature collection for one region into a scene generation.
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    config: SceneConfig,
}

impl SceneBuilder {
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Builds the primitives for every layer. Returns `None` with the stats
    /// when no structure geometry came out.
    pub fn prepare(
        &self,
        region: &GeoRegion,
        features: &FeatureCollection,
    ) -> (Option<SceneBuild>, BuildStats) {
        let cfg = &self.config;
        let projector = Projector::new(region, cfg.half_extent);
        let classified = classify_all(features, cfg);
        let mut stats = BuildStats {
            features: classified.len(),
            ..BuildStats::default()
        };

        let ranked = rank_structures(&classified, cfg.max_structures);
        stats.structures = classified
            .iter()
            .filter(|c| c.tag == LayerTag::Structure)
            .count();
        stats.structures_kept = ranked.len();

        let mut layers: Vec<(LayerKind, Primitive)> = Vec::new();
        let mut corners: Vec<Vec3> = Vec::new();
        for structure in &ranked {
            let depth = extrusion_depth(structure.height_m.unwrap_or(cfg.default_height_m), cfg);
            for ring in structure.feature.geometry.outer_rings() {
                let Some(mesh) = footprint(ring, &projector).and_then(|fp| extrude(&fp, depth))
                else {
                    continue;
                };
                corners.extend(mesh.bounds.corners());
                layers.push((LayerKind::Structures, Primitive::Volume { mesh, depth }));
                stats.volumes += 1;
            }
        }

        for c in &classified {
            match c.tag {
                LayerTag::Transport => {
                    for line in c.feature.geometry.lines() {
                        if let Some(points) = polyline(line, &projector) {
                            layers.push((LayerKind::Transport, Primitive::Polyline { points }));
                            stats.polylines += 1;
                        }
                    }
                }
                LayerTag::Green | LayerTag::Water => {
                    let (layer, elevation) = if c.tag == LayerTag::Green {
                        (LayerKind::Green, GREEN_ELEVATION)
                    } else {
                        (LayerKind::Water, WATER_ELEVATION)
                    };
                    for ring in c.feature.geometry.outer_rings() {
                        if let Some(mesh) =
                            footprint(ring, &projector).and_then(|fp| flat_shape(&fp, elevation))
                        {
                            layers.push((layer, Primitive::FlatShape { mesh }));
                            if layer == LayerKind::Green {
                                stats.green_shapes += 1;
                            } else {
                                stats.water_shapes += 1;
                            }
                        }
                    }
                }
                LayerTag::None => stats.dropped += 1,
                LayerTag::Structure => {}
            }
        }

        let Some(bounds) = SceneBounds::from_points(corners) else {
            return (None, stats);
        };
        let distance = bounds.camera_distance(cfg.camera_distance_factor, cfg.fallback_camera_distance);
        let mut build = SceneBuild::new(bounds, distance);
        for (layer, primitive) in layers {
            build.push(layer, primitive);
        }
        (Some(build), stats)
    }

    /// Builds and installs a new generation into `world`, replacing the
    /// previous one. Without structure geometry the world is not touched.
    pub fn build_into(
        &self,
        region: &GeoRegion,
        features: &FeatureCollection,
        world: &mut World,
    ) -> BuildOutcome {
        tracing::debug!(features = features.len(), "scene build started");
        let (build, stats) = self.prepare(region, features);
        let Some(build) = build else {
            tracing::info!(
                features = stats.features,
                structures = stats.structures,
                "no structure geometry; scene left unchanged"
            );
            return BuildOutcome::NoStructures { stats };
        };
        let generation = world.install(build);
        tracing::info!(
            generation = generation.0,
            structures = stats.structures,
            kept = stats.structures_kept,
            polylines = stats.polylines,
            green = stats.green_shapes,
            water = stats.water_shapes,
            dropped = stats.dropped,
            "scene built"
        );
        BuildOutcome::Installed { generation, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildOutcome, SceneBuilder, classify_all, rank_structures};
    use formats::{FeatureCollection, FeatureGeometry, VectorFeature};
    use pretty_assertions::assert_eq;
    use foundation::math::{GeoPoint, Vec3};
    use foundation::region::GeoRegion;
    use scene::components::Primitive;
    use scene::{LayerKind, SceneConfig, World};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    fn region() -> GeoRegion {
        GeoRegion::new(0.0, 0.0, 0.01, 0.01).unwrap()
    }

    fn square_at(lon: f64, lat: f64, side: f64) -> FeatureGeometry {
        FeatureGeometry::Polygon(vec![vec![
            GeoPoint::new(lon, lat),
            GeoPoint::new(lon + side, lat),
            GeoPoint::new(lon + side, lat + side),
            GeoPoint::new(lon, lat + side),
            GeoPoint::new(lon, lat),
        ]])
    }

    fn building(lon: f64, lat: f64, height: &str) -> VectorFeature {
        VectorFeature::new(square_at(lon, lat, 0.001))
            .with_attr("building", "yes")
            .with_attr("height", height)
    }

    fn road() -> VectorFeature {
        VectorFeature::new(FeatureGeometry::MultiLineString(vec![
            vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.01, 0.0)],
            vec![GeoPoint::new(0.0, 0.01), GeoPoint::new(0.01, 0.01)],
        ]))
        .with_attr("highway", "primary")
    }

    fn park() -> VectorFeature {
        VectorFeature::new(square_at(0.002, 0.002, 0.002)).with_attr("leisure", "park")
    }

    #[test]
    fn cap_keeps_the_tallest() {
        let features: Vec<VectorFeature> = (0..5000u64)
            .map(|i| {
                let h = (i * 7919) % 5000;
                VectorFeature::new(square_at(0.0, 0.0, 0.001))
                    .with_attr("building", "yes")
                    .with_attr("height", h.to_string())
            })
            .collect();
        let fc = FeatureCollection::new(features);
        let cfg = SceneConfig::default();
        let classified = classify_all(&fc, &cfg);
        let kept = rank_structures(&classified, cfg.max_structures);
        assert_eq!(kept.len(), 3000);
        assert!(kept.iter().all(|c| c.height_m.unwrap() >= 2000.0));
        assert!(kept.windows(2).all(|w| w[0].height_m >= w[1].height_m));

        let mut world = World::new();
        let outcome = SceneBuilder::new(cfg).build_into(&region(), &fc, &mut world);
        assert_eq!(outcome.stats().structures, 5000);
        assert_eq!(outcome.stats().structures_kept, 3000);
        assert_eq!(world.group(LayerKind::Structures).unwrap().primitives().len(), 3000);
    }

    #[test]
    fn equal_heights_keep_input_order() {
        let fc = FeatureCollection::new(vec![
            building(0.0, 0.0, "10").with_attr("name", "a"),
            building(0.0, 0.0, "20").with_attr("name", "b"),
            building(0.0, 0.0, "10").with_attr("name", "c"),
            building(0.0, 0.0, "10").with_attr("name", "d"),
        ]);
        let classified = classify_all(&fc, &SceneConfig::default());
        let names: Vec<&str> = rank_structures(&classified, 3)
            .iter()
            .map(|c| c.feature.attr("name").unwrap())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn builds_all_layers_centered() {
        let fc = FeatureCollection::new(vec![
            building(0.001, 0.001, "24"),
            building(0.008, 0.008, "120"),
            road(),
            park(),
            VectorFeature::new(square_at(0.004, 0.004, 0.001)).with_attr("natural", "water"),
            VectorFeature::new(FeatureGeometry::Point(GeoPoint::new(0.005, 0.005)))
                .with_attr("amenity", "bench"),
        ]);
        let mut world = World::new();
        let outcome = SceneBuilder::default().build_into(&region(), &fc, &mut world);
        let stats = outcome.stats();
        assert!(matches!(outcome, BuildOutcome::Installed { .. }));
        assert_eq!(stats.volumes, 2);
        assert_eq!(stats.polylines, 2);
        assert_eq!(stats.green_shapes, 1);
        assert_eq!(stats.water_shapes, 1);
        assert_eq!(stats.dropped, 1);

        // Footprints span x in [-40, 40], z in [-40, 40]; depths 2 and 10.
        let framing = world.framing().unwrap();
        assert_eq!(framing.bounds.center, Vec3::ZERO);
        assert_close(framing.bounds.size.x, 80.0);
        assert_close(framing.bounds.size.y, 10.0);
        assert_close(framing.camera_distance, 80.0 * 1.8);

        let structures = world.group(LayerKind::Structures).unwrap();
        let offset = structures.transform().position;
        assert_close(offset.y, -5.0);
        let tallest = structures
            .primitives()
            .iter()
            .filter_map(|p| match p {
                Primitive::Volume { depth, .. } => Some(*depth),
                _ => None,
            })
            .fold(0.0, f64::max);
        assert_close(tallest, 10.0);
        assert_eq!(world.group(LayerKind::Transport).unwrap().primitives().len(), 2);
    }

    #[test]
    fn no_structures_leaves_world_unchanged() {
        let mut world = World::new();
        let builder = SceneBuilder::default();
        let first = builder.build_into(
            &region(),
            &FeatureCollection::new(vec![building(0.001, 0.001, "30"), road()]),
            &mut world,
        );
        let BuildOutcome::Installed { generation, .. } = first else {
            panic!("expected installed scene, got {first:?}");
        };
        let live = world.resources().live_count();

        let outcome = builder.build_into(
            &region(),
            &FeatureCollection::new(vec![road(), park()]),
            &mut world,
        );
        assert!(matches!(outcome, BuildOutcome::NoStructures { .. }));
        assert_eq!(world.generation(), Some(generation));
        assert_eq!(world.resources().live_count(), live);

        let outcome = builder.build_into(&region(), &FeatureCollection::default(), &mut world);
        assert!(matches!(outcome, BuildOutcome::NoStructures { .. }));
        assert_eq!(world.generation(), Some(generation));
    }

    #[test]
    fn zero_area_footprints_produce_nothing() {
        // A zero-area ring yields no geometry, so nothing is installed.
        let sliver = VectorFeature::new(FeatureGeometry::Polygon(vec![vec![
            GeoPoint::new(0.001, 0.001),
            GeoPoint::new(0.002, 0.001),
            GeoPoint::new(0.003, 0.001),
        ]]))
        .with_attr("building", "yes");
        let mut world = World::new();
        let outcome = SceneBuilder::default().build_into(
            &region(),
            &FeatureCollection::new(vec![sliver]),
            &mut world,
        );
        assert!(matches!(outcome, BuildOutcome::NoStructures { .. }));
        assert!(world.framing().is_none());
    }

    #[test]
    fn multipolygon_members_become_separate_volumes() {
        let FeatureGeometry::Polygon(a) = square_at(0.001, 0.001, 0.001) else {
            unreachable!()
        };
        let FeatureGeometry::Polygon(b) = square_at(0.005, 0.005, 0.001) else {
            unreachable!()
        };
        let feature = VectorFeature::new(FeatureGeometry::MultiPolygon(vec![a, b]))
            .with_attr("building", "yes")
            .with_attr("building:levels", "8");
        let mut world = World::new();
        let outcome = SceneBuilder::default().build_into(
            &region(),
            &FeatureCollection::new(vec![feature]),
            &mut world,
        );
        assert_eq!(outcome.stats().volumes, 2);
        let group = world.group(LayerKind::Structures).unwrap();
        assert!(group.primitives().iter().all(|p| matches!(
            p,
            Primitive::Volume { depth, .. } if (*depth - 2.0).abs() < 1e-12
        )));
    }
}
