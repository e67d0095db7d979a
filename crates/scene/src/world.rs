use std::collections::BTreeMap;

use foundation::ids::{Id, IdGen};
use foundation::math::Vec3;
use formats::mesh_text;

use crate::components::{Primitive, SceneBounds};
use crate::group::{GeometryGroup, LayerKind};
use crate::mesh::IndexedMesh;
use crate::resources::Resources;

/// Everything one scene build produced, before it is installed.
#[derive(Debug, Clone)]
pub struct SceneBuild {
    pub layers: BTreeMap<LayerKind, Vec<Primitive>>,
    pub bounds: SceneBounds,
    pub camera_distance: f64,
}

impl SceneBuild {
    pub fn new(bounds: SceneBounds, camera_distance: f64) -> Self {
        Self {
            layers: LayerKind::ALL.iter().map(|&l| (l, Vec::new())).collect(),
            bounds,
            camera_distance,
        }
    }

    pub fn push(&mut self, layer: LayerKind, primitive: Primitive) {
        self.layers.entry(layer).or_default().push(primitive);
    }

    pub fn primitive_count(&self, layer: LayerKind) -> usize {
        self.layers.get(&layer).map(Vec::len).unwrap_or(0)
    }
}

/// Framing of the installed generation. Bounds are in recentered scene space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneFraming {
    pub bounds: SceneBounds,
    pub camera_distance: f64,
}

/// Owner of the live scene generation.
///
/// At most one [`GeometryGroup`] per layer is live. Installing a build
/// releases every resource of the previous generation before the new groups
/// are allocated.
#[derive(Debug, Default)]
pub struct World {
    groups: BTreeMap<LayerKind, GeometryGroup>,
    resources: Resources,
    generations: IdGen,
    framing: Option<SceneFraming>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the live generation with `build` and returns its id.
    pub fn install(&mut self, build: SceneBuild) -> Id {
        let released = self.dispose_groups();
        let generation = self.generations.next_id();
        let offset = -build.bounds.center;

        for (layer, primitives) in build.layers {
            let group =
                GeometryGroup::allocate(layer, generation, primitives, offset, &mut self.resources);
            self.groups.insert(layer, group);
        }

        let bounds = SceneBounds {
            min: build.bounds.min + offset,
            max: build.bounds.max + offset,
            center: Vec3::ZERO,
            size: build.bounds.size,
        };
        self.framing = Some(SceneFraming {
            bounds,
            camera_distance: build.camera_distance,
        });

        tracing::info!(
            generation = generation.0,
            released,
            live_resources = self.resources.live_count(),
            camera_distance = build.camera_distance,
            "scene generation installed"
        );
        generation
    }

    /// Removes the live generation, if any.
    pub fn clear(&mut self) {
        let released = self.dispose_groups();
        self.framing = None;
        tracing::debug!(released, "scene cleared");
    }

    fn dispose_groups(&mut self) -> usize {
        std::mem::take(&mut self.groups)
            .into_values()
            .map(|g| g.dispose(&mut self.resources))
            .sum()
    }

    pub fn group(&self, layer: LayerKind) -> Option<&GeometryGroup> {
        self.groups.get(&layer)
    }

    pub fn groups(&self) -> impl Iterator<Item = &GeometryGroup> + '_ {
        self.groups.values()
    }

    /// Id of the live generation.
    pub fn generation(&self) -> Option<Id> {
        self.groups.values().next().map(GeometryGroup::generation)
    }

    pub fn framing(&self) -> Option<SceneFraming> {
        self.framing
    }

    pub fn camera_distance(&self) -> Option<f64> {
        self.framing.map(|f| f.camera_distance)
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Structure volumes of the live generation, merged in scene space and
    /// written as mesh text. `None` when nothing is installed.
    pub fn export_mesh_text(&self) -> Option<String> {
        let group = self
            .groups
            .get(&LayerKind::Structures)
            .filter(|g| !g.is_empty())?;
        let offset = group.transform().position;
        let mut merged = IndexedMesh::empty();
        for primitive in group.primitives() {
            if let Primitive::Volume { mesh, .. } = primitive {
                merged.append(mesh, offset);
            }
        }
        if merged.triangle_count() == 0 {
            return None;
        }
        Some(mesh_text::write(&merged.positions, &merged.indices))
    }
}

#[cfg(test)]
mod tests {
    use super::{SceneBuild, World};
    use crate::components::{Primitive, SceneBounds};
    use crate::group::LayerKind;
    use crate::mesh::IndexedMesh;
    use foundation::math::Vec3;
    use formats::mesh_text;
    use pretty_assertions::assert_eq;

    fn triangle_at(x: f32) -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![x, 0.0, 0.0, x + 1.0, 0.0, 0.0, x, 2.0, 0.0],
            vec![0, 1, 2],
        )
    }

    fn sample_build() -> SceneBuild {
        let bounds = SceneBounds::from_points([Vec3::ZERO, Vec3::new(4.0, 2.0, 0.0)]).unwrap();
        let mut build = SceneBuild::new(bounds, bounds.camera_distance(1.8, 20.0));
        build.push(
            LayerKind::Structures,
            Primitive::Volume {
                mesh: triangle_at(0.0),
                depth: 2.0,
            },
        );
        build.push(
            LayerKind::Structures,
            Primitive::Volume {
                mesh: triangle_at(3.0),
                depth: 2.0,
            },
        );
        build.push(
            LayerKind::Transport,
            Primitive::Polyline {
                points: vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)],
            },
        );
        build
    }

    #[test]
    fn install_recenters_groups() {
        let mut world = World::new();
        world.install(sample_build());
        let structures = world.group(LayerKind::Structures).unwrap();
        assert_eq!(structures.transform().position, Vec3::new(-2.0, -1.0, 0.0));
        let framing = world.framing().unwrap();
        assert_eq!(framing.bounds.center, Vec3::ZERO);
        assert_eq!(framing.bounds.min, Vec3::new(-2.0, -1.0, 0.0));
        assert!((framing.camera_distance - 7.2).abs() < 1e-12);
        assert_eq!(world.groups().count(), 4);

        let placed = structures.world_bounds();
        assert_eq!(placed.min, Vec3::new(-2.0, -1.0, 0.0));
        assert_eq!(placed.max, Vec3::new(2.0, 1.0, 0.0));
        assert!(world.group(LayerKind::Water).unwrap().is_empty());
    }

    #[test]
    fn reinstall_releases_previous_generation() {
        let mut world = World::new();
        let first = world.install(sample_build());
        let old_handles: Vec<_> = world.groups().flat_map(|g| g.resource_handles()).collect();
        let live_after_first = world.resources().live_count();
        // 3 geometries + 4 materials
        assert_eq!(live_after_first, 7);

        let second = world.install(sample_build());
        assert!(second > first);
        assert_eq!(world.generation(), Some(second));
        assert_eq!(world.resources().live_count(), live_after_first);
        assert!(old_handles.iter().all(|&h| !world.resources().is_live(h)));

        world.clear();
        assert_eq!(world.resources().live_count(), 0);
        assert!(world.framing().is_none());
        assert!(world.generation().is_none());
    }

    #[test]
    fn export_merges_structure_volumes() {
        let mut world = World::new();
        assert!(world.export_mesh_text().is_none());
        world.install(sample_build());
        let text = world.export_mesh_text().unwrap();
        let parsed = mesh_text::parse(&text).expect("exported text parses");
        assert_eq!(parsed.vertex_count(), 6);
        assert_eq!(parsed.faces, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(parsed.vertices[0], -2.0);
    }
}
