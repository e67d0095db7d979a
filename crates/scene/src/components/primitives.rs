use foundation::bounds::Aabb3;
use foundation::math::Vec3;

use crate::mesh::IndexedMesh;

/// Renderable primitive owned by a `GeometryGroup`.
///
/// Scene axes: `x` east, `y` up, `z` south. Volumes are extruded along `+y`
/// from `y = 0`; flat shapes lie in a horizontal plane.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Volume { mesh: IndexedMesh, depth: f64 },
    Polyline { points: Vec<Vec3> },
    FlatShape { mesh: IndexedMesh },
}

impl Primitive {
    pub fn mesh(&self) -> Option<&IndexedMesh> {
        match self {
            Primitive::Volume { mesh, .. } | Primitive::FlatShape { mesh } => Some(mesh),
            Primitive::Polyline { .. } => None,
        }
    }

    pub fn local_bounds(&self) -> Aabb3 {
        match self {
            Primitive::Volume { mesh, .. } | Primitive::FlatShape { mesh } => mesh.bounds,
            Primitive::Polyline { points } => Aabb3::from_points(points.iter().copied()),
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Primitive::Volume { mesh, .. } | Primitive::FlatShape { mesh } => mesh.vertex_count(),
            Primitive::Polyline { points } => points.len(),
        }
    }
}
