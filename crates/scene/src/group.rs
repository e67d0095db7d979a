use foundation::bounds::Aabb3;
use foundation::ids::Id;
use foundation::math::Vec3;

use crate::components::{Primitive, Transform};
use crate::resources::{ResourceHandle, ResourceKind, Resources};

/// The four output layers of a scene build.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    Structures,
    Transport,
    Green,
    Water,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Structures,
        LayerKind::Transport,
        LayerKind::Green,
        LayerKind::Water,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Structures => "structures",
            LayerKind::Transport => "transport",
            LayerKind::Green => "green",
            LayerKind::Water => "water",
        }
    }
}

/// All primitives of one layer for one scene generation, plus the render
/// resources they hold.
#[derive(Debug)]
pub struct GeometryGroup {
    layer: LayerKind,
    generation: Id,
    transform: Transform,
    primitives: Vec<Primitive>,
    geometry: Vec<ResourceHandle>,
    material: ResourceHandle,
}

impl GeometryGroup {
    pub(crate) fn allocate(
        layer: LayerKind,
        generation: Id,
        primitives: Vec<Primitive>,
        offset: Vec3,
        resources: &mut Resources,
    ) -> Self {
        let geometry = primitives
            .iter()
            .map(|p| {
                resources.allocate(ResourceKind::Geometry {
                    vertices: p.vertex_count(),
                    indices: p.mesh().map(|m| m.indices.len()).unwrap_or(0),
                })
            })
            .collect();
        let material = resources.allocate(ResourceKind::Material {
            label: layer.name(),
        });
        Self {
            layer,
            generation,
            transform: Transform::translate(offset),
            primitives,
            geometry,
            material,
        }
    }

    /// Releases every resource of the group. Returns how many were released.
    pub(crate) fn dispose(self, resources: &mut Resources) -> usize {
        let mut released = 0;
        for handle in self.geometry.into_iter().chain(std::iter::once(self.material)) {
            if resources.release(handle) {
                released += 1;
            }
        }
        released
    }

    pub fn layer(&self) -> LayerKind {
        self.layer
    }

    pub fn generation(&self) -> Id {
        self.generation
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn resource_handles(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.geometry
            .iter()
            .copied()
            .chain(std::iter::once(self.material))
    }

    /// Bounds of the group after its translation.
    pub fn world_bounds(&self) -> Aabb3 {
        let mut b = Aabb3::empty();
        for p in &self.primitives {
            let local = p.local_bounds();
            if !local.is_empty() {
                b = b.union(&local.translated(self.transform.position));
            }
        }
        b
    }
}
