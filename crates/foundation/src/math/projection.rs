//! Local equirectangular projection.
//!
//! Maps a `GeoRegion` onto a fixed square of side `2 * half_extent` scene
//! units centered on the origin, independent of the region's real-world size.
//! Not geodesically correct; only meant for small regions.

use super::{GeoPoint, Vec2};
use crate::region::GeoRegion;

/// Default half side length of the projected square (scene units).
pub const DEFAULT_HALF_EXTENT: f64 = 50.0;

/// Lower bound on the longitude/latitude span used as a divisor.
pub const MIN_SPAN_DEG: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projector {
    center: GeoPoint,
    span_lon: f64,
    span_lat: f64,
    half_extent: f64,
}

impl Projector {
    pub fn new(region: &GeoRegion, half_extent: f64) -> Self {
        Self {
            center: region.center(),
            span_lon: region.width_deg().max(MIN_SPAN_DEG),
            span_lat: region.height_deg().max(MIN_SPAN_DEG),
            half_extent,
        }
    }

    #[inline]
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Vec2 {
        let nx = (lon_deg - self.center.lon_deg) / self.span_lon;
        let ny = (lat_deg - self.center.lat_deg) / self.span_lat;
        Vec2::new(nx * 2.0 * self.half_extent, ny * 2.0 * self.half_extent)
    }

    pub fn project_point(&self, p: GeoPoint) -> Vec2 {
        self.project(p.lon_deg, p.lat_deg)
    }
}

/// One-shot projection of `(lon, lat)` within `region`.
pub fn project(lon_deg: f64, lat_deg: f64, region: &GeoRegion, half_extent: f64) -> Vec2 {
    Projector::new(region, half_extent).project(lon_deg, lat_deg)
}
