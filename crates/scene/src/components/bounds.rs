use foundation::bounds::Aabb3;
use foundation::math::Vec3;

/// Bounds of the structures in one scene build.
///
/// Computed once per build to recenter the groups and place the camera;
/// never carried over to the next build.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    pub size: Vec3,
}

impl SceneBounds {
    pub fn from_aabb(aabb: Aabb3) -> Option<Self> {
        if aabb.is_empty() {
            return None;
        }
        Some(Self {
            min: aabb.min,
            max: aabb.max,
            center: aabb.center(),
            size: aabb.size(),
        })
    }

    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        Self::from_aabb(Aabb3::from_points(points))
    }

    pub fn max_dim(&self) -> f64 {
        self.size.x.max(self.size.y).max(self.size.z)
    }

    /// `max(size) * factor`, or `fallback` when the bounds collapse to a
    /// point or are not finite.
    pub fn camera_distance(&self, factor: f64, fallback: f64) -> f64 {
        let max_dim = self.max_dim();
        if !max_dim.is_finite() || max_dim <= f64::EPSILON {
            return fallback;
        }
        max_dim * factor
    }

    pub fn contains(&self, point: Vec3) -> bool {
        Aabb3::new(self.min, self.max).contains(point)
    }
}
