use foundation::bounds::Aabb3;
use foundation::math::Vec3;
use formats::ParsedMesh;

/// Indexed triangle mesh with per-vertex normals and local bounds.
///
/// Positions and normals are flat `xyz` triples; `indices` holds three
/// entries per triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    pub bounds: Aabb3,
}

impl IndexedMesh {
    /// Builds a mesh from raw positions and triangle indices, deriving
    /// normals and bounds.
    pub fn from_parts(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        let normals = vertex_normals(&positions, &indices);
        let bounds = Aabb3::from_points(iter_positions(&positions));
        Self {
            positions,
            normals,
            indices,
            bounds,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex(&self, i: usize) -> Vec3 {
        let p = &self.positions[i * 3..i * 3 + 3];
        Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        iter_positions(&self.positions)
    }

    /// Appends `other` with its vertices moved by `offset`.
    pub fn append(&mut self, other: &IndexedMesh, offset: Vec3) {
        let base = self.vertex_count() as u32;
        for p in other.vertices() {
            let q = p + offset;
            self.positions.extend_from_slice(&q.to_f32());
            self.bounds.extend(q);
        }
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            bounds: Aabb3::empty(),
        }
    }
}

/// Turns parser output into a renderable mesh.
pub fn create_indexed_mesh(parsed: &ParsedMesh) -> IndexedMesh {
    IndexedMesh::from_parts(parsed.vertices.clone(), parsed.faces.clone())
}

fn iter_positions(positions: &[f32]) -> impl Iterator<Item = Vec3> + '_ {
    positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64))
}

/// Area-weighted vertex normals: each triangle adds its unnormalized face
/// normal to its three corners, then every sum is normalized.
fn vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut acc = vec![Vec3::ZERO; vertex_count];
    let at = |i: u32| {
        let i = i as usize * 3;
        Vec3::new(
            positions[i] as f64,
            positions[i + 1] as f64,
            positions[i + 2] as f64,
        )
    };

    for tri in indices.chunks_exact(3) {
        if tri.iter().any(|&i| i as usize >= vertex_count) {
            continue;
        }
        let (a, b, c) = (at(tri[0]), at(tri[1]), at(tri[2]));
        let n = (b - a).cross(c - a);
        for &i in tri {
            acc[i as usize] += n;
        }
    }

    let mut out = Vec::with_capacity(positions.len());
    for n in acc {
        out.extend_from_slice(&n.normalize().to_f32());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{IndexedMesh, create_indexed_mesh};
    use foundation::math::Vec3;
    use formats::mesh_text;

    #[test]
    fn cube_bounds_match_extents() {
        let text = "\
v -1 0 -2
v 3 0 -2
v 3 5 -2
v -1 5 -2
v -1 0 4
v 3 0 4
v 3 5 4
v -1 5 4
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
";
        let parsed = mesh_text::parse(text).expect("parse");
        let mesh = create_indexed_mesh(&parsed);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.bounds.min, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(mesh.bounds.max, Vec3::new(3.0, 5.0, 4.0));
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn flat_triangle_normal_points_up() {
        let mesh = IndexedMesh::from_parts(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, -1.0],
            vec![0, 1, 2],
        );
        for n in mesh.normals.chunks_exact(3) {
            assert_eq!(n, [0.0f32, 1.0, 0.0]);
        }
    }

    #[test]
    fn append_offsets_indices_and_positions() {
        let tri = IndexedMesh::from_parts(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0, 1, 2],
        );
        let mut merged = IndexedMesh::empty();
        merged.append(&tri, Vec3::ZERO);
        merged.append(&tri, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(merged.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(merged.vertex(3), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(merged.bounds.max, Vec3::new(11.0, 1.0, 0.0));
    }
}
