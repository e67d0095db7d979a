//! Planar geometry synthesis: footprints, extruded volumes, flat shapes and
//! polylines in scene space.
//!
//! Projected `(x, y)` maps to scene `(x, 0, -y)`, so north points to `-z`
//! and volumes grow along `+y`.

use earcutr::earcut;
use foundation::math::{GeoPoint, Projector, Vec2, Vec3};
use scene::IndexedMesh;

const DUPLICATE_EPS: f64 = 1e-9;

fn to_scene(p: Vec2, y: f64) -> Vec3 {
    Vec3::new(p.x, y, -p.y)
}

/// Projects an outer ring and normalizes it to counter-clockwise order
/// without a closing duplicate. Returns `None` for rings with fewer than
/// three distinct points.
pub fn footprint(ring: &[GeoPoint], projector: &Projector) -> Option<Vec<Vec2>> {
    let mut points: Vec<Vec2> = ring.iter().map(|&p| projector.project_point(p)).collect();
    drop_closing_duplicate(&mut points);
    if points.len() < 3 {
        return None;
    }
    if signed_area(&points) < 0.0 {
        points.reverse();
    }
    Some(points)
}

/// Projected line, vertex order preserved. Lines with fewer than two points
/// produce nothing.
pub fn polyline(line: &[GeoPoint], projector: &Projector) -> Option<Vec<Vec3>> {
    if line.len() < 2 {
        return None;
    }
    Some(
        line.iter()
            .map(|&p| to_scene(projector.project_point(p), 0.0))
            .collect(),
    )
}

/// Horizontal polygon at `elevation`, facing up.
pub fn flat_shape(ring: &[Vec2], elevation: f64) -> Option<IndexedMesh> {
    let triangles = triangulate(ring)?;
    let mut positions = Vec::with_capacity(ring.len() * 3);
    for &p in ring {
        positions.extend_from_slice(&to_scene(p, elevation).to_f32());
    }
    Some(IndexedMesh::from_parts(positions, triangles))
}

/// Prism over `ring` from `y = 0` to `y = depth`: top and bottom caps plus
/// one quad per edge. Walls get their own vertices so they shade flat.
pub fn extrude(ring: &[Vec2], depth: f64) -> Option<IndexedMesh> {
    let cap = triangulate(ring)?;
    let n = ring.len() as u32;
    let mut positions: Vec<f32> = Vec::with_capacity(ring.len() * 18);
    let mut indices: Vec<u32> = Vec::with_capacity(cap.len() * 2 + ring.len() * 6);

    for &p in ring {
        positions.extend_from_slice(&to_scene(p, depth).to_f32());
    }
    for &p in ring {
        positions.extend_from_slice(&to_scene(p, 0.0).to_f32());
    }
    indices.extend_from_slice(&cap);
    for tri in cap.chunks_exact(3) {
        indices.extend_from_slice(&[tri[0] + n, tri[2] + n, tri[1] + n]);
    }

    for (i, &a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        let base = (positions.len() / 3) as u32;
        for q in [
            to_scene(a, 0.0),
            to_scene(b, 0.0),
            to_scene(b, depth),
            to_scene(a, depth),
        ] {
            positions.extend_from_slice(&q.to_f32());
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Some(IndexedMesh::from_parts(positions, indices))
}

/// Ear-clipped triangles of a simple ring, all wound counter-clockwise in
/// the projected plane (upward facing in scene space).
fn triangulate(ring: &[Vec2]) -> Option<Vec<u32>> {
    let coords: Vec<f64> = ring.iter().flat_map(|p| [p.x, p.y]).collect();
    let raw = earcut(&coords, &[], 2).ok()?;
    let mut out = Vec::with_capacity(raw.len());
    for tri in raw.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let (ab, ac) = (ring[b] - ring[a], ring[c] - ring[a]);
        if ab.x * ac.y - ab.y * ac.x >= 0.0 {
            out.extend([a as u32, b as u32, c as u32]);
        } else {
            out.extend([a as u32, c as u32, b as u32]);
        }
    }
    (!out.is_empty()).then_some(out)
}

fn drop_closing_duplicate(points: &mut Vec<Vec2>) {
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if points.len() >= 2
            && (first.x - last.x).abs() < DUPLICATE_EPS
            && (first.y - last.y).abs() < DUPLICATE_EPS
        {
            points.pop();
        }
    }
}

fn signed_area(points: &[Vec2]) -> f64 {
    let mut sum = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

#[cfg(test)]
mod tests {
    use super::{extrude, flat_shape, footprint, polyline};
    use foundation::math::{GeoPoint, Projector, Vec2, Vec3};
    use foundation::region::GeoRegion;

    fn projector() -> Projector {
        let region = GeoRegion::new(0.0, 0.0, 1.0, 1.0).unwrap();
        Projector::new(&region, 50.0)
    }

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ]
    }

    #[test]
    fn closed_clockwise_ring_is_normalized() {
        let ring = [
            GeoPoint::new(0.25, 0.25),
            GeoPoint::new(0.25, 0.75),
            GeoPoint::new(0.75, 0.75),
            GeoPoint::new(0.75, 0.25),
            GeoPoint::new(0.25, 0.25),
        ];
        let fp = footprint(&ring, &projector()).unwrap();
        assert_eq!(fp.len(), 4);
        assert_eq!(fp[0], Vec2::new(25.0, -25.0));
        assert_eq!(fp[1], Vec2::new(25.0, 25.0));
        assert!(super::signed_area(&fp) > 0.0);
    }

    #[test]
    fn short_rings_and_lines_yield_nothing() {
        let p = projector();
        let ring = [
            GeoPoint::new(0.1, 0.1),
            GeoPoint::new(0.2, 0.1),
            GeoPoint::new(0.1, 0.1),
        ];
        assert!(footprint(&ring, &p).is_none());
        assert!(polyline(&[GeoPoint::new(0.5, 0.5)], &p).is_none());
        let line = polyline(&[GeoPoint::new(0.5, 0.5), GeoPoint::new(1.0, 1.0)], &p).unwrap();
        assert_eq!(line, vec![Vec3::ZERO, Vec3::new(50.0, 0.0, -50.0)]);
    }

    #[test]
    fn prism_has_caps_and_walls() {
        let mesh = extrude(&square(), 3.0).unwrap();
        // 2 + 2 cap triangles, 2 per wall.
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertex_count(), 4 + 4 + 16);
        assert_eq!(mesh.bounds.min, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(mesh.bounds.max, Vec3::new(2.0, 3.0, 0.0));
        // Top cap vertices point up.
        let up = &mesh.normals[0..3];
        assert!(up[1] > 0.99, "{up:?}");
        // Bottom cap vertices point down.
        let down = &mesh.normals[12..15];
        assert!(down[1] < -0.99, "{down:?}");
    }

    #[test]
    fn walls_face_outward() {
        let mesh = extrude(&square(), 1.0).unwrap();
        // First wall runs along the south edge (projected y = 0, scene z = 0).
        let n = &mesh.normals[8 * 3..8 * 3 + 3];
        assert!(n[2] > 0.99, "{n:?}");
    }

    #[test]
    fn flat_shape_sits_at_elevation() {
        let mesh = flat_shape(&square(), 0.02).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert!((mesh.bounds.min.y - 0.02).abs() < 1e-6);
        assert!(mesh.normals.chunks_exact(3).all(|n| n[1] > 0.99));
    }
}
