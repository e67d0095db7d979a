//! Drag-to-select of a geographic rectangle with a bounded side length.

use foundation::math::{GeoPoint, MIN_SPAN_DEG, Vec2, geodesic_distance};
use foundation::region::{GeoRegion, RegionError};

/// Side-length refinement stops once within this many meters.
const SIDE_TOLERANCE_M: f64 = 1e-3;
const MAX_REFINE_STEPS: usize = 4;

/// Maps a pointer position on the map surface to a geographic point.
pub trait PointerResolver {
    fn resolve(&self, pointer: Vec2) -> Option<GeoPoint>;
}

impl<F> PointerResolver for F
where
    F: Fn(Vec2) -> Option<GeoPoint>,
{
    fn resolve(&self, pointer: Vec2) -> Option<GeoPoint> {
        self(pointer)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SelectorState {
    Idle,
    Dragging { anchor: GeoPoint, live: GeoPoint },
}

#[derive(Debug, Clone)]
pub struct RegionSelector {
    state: SelectorState,
    max_side_m: f64,
    finalized: Option<GeoRegion>,
}

impl RegionSelector {
    pub fn new(max_side_m: f64) -> Self {
        Self {
            state: SelectorState::Idle,
            max_side_m,
            finalized: None,
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SelectorState::Dragging { .. })
    }

    /// Map panning is suspended while a drag is active.
    pub fn panning_enabled(&self) -> bool {
        !self.is_dragging()
    }

    /// Last region emitted by a completed drag.
    pub fn finalized(&self) -> Option<GeoRegion> {
        self.finalized
    }

    pub fn on_pointer_down(&mut self, anchor: GeoPoint) {
        self.state = SelectorState::Dragging {
            anchor,
            live: anchor,
        };
    }

    /// Updates the live corner and returns the clamped preview.
    pub fn on_pointer_move(&mut self, point: GeoPoint) -> Option<GeoRegion> {
        match &mut self.state {
            SelectorState::Dragging { live, .. } => *live = point,
            SelectorState::Idle => return None,
        }
        self.preview()
    }

    /// Ends the drag and emits the finalized region.
    pub fn on_pointer_up(&mut self) -> Option<GeoRegion> {
        let region = self.preview();
        self.state = SelectorState::Idle;
        if let Some(region) = region {
            tracing::debug!(
                west = region.west(),
                south = region.south(),
                east = region.east(),
                north = region.north(),
                "selection finalized"
            );
            self.finalized = Some(region);
        }
        region
    }

    pub fn cancel(&mut self) {
        self.state = SelectorState::Idle;
    }

    pub fn preview(&self) -> Option<GeoRegion> {
        match self.state {
            SelectorState::Dragging { anchor, live } => {
                clamp_region(anchor, live, self.max_side_m).ok()
            }
            SelectorState::Idle => None,
        }
    }

    /// Starts a drag at a pointer position. Returns `false` if the pointer
    /// does not resolve to a geographic point.
    pub fn drag_start(&mut self, resolver: &impl PointerResolver, pointer: Vec2) -> bool {
        match resolver.resolve(pointer) {
            Some(p) => {
                self.on_pointer_down(p);
                true
            }
            None => false,
        }
    }

    pub fn drag_move(
        &mut self,
        resolver: &impl PointerResolver,
        pointer: Vec2,
    ) -> Option<GeoRegion> {
        let p = resolver.resolve(pointer)?;
        self.on_pointer_move(p)
    }

    pub fn drag_end(&mut self, resolver: &impl PointerResolver, pointer: Vec2) -> Option<GeoRegion> {
        if let Some(p) = resolver.resolve(pointer) {
            self.on_pointer_move(p);
        }
        self.on_pointer_up()
    }
}

/// Rectangle spanned by `a` and `b`, with each side limited to
/// `max_side_m` meters of geodesic distance measured from `a`.
///
/// East-west distance is measured along `a`'s latitude, north-south along
/// `a`'s longitude. An axis over the limit has its offset from `a` scaled so
/// the side equals the limit; the other axis keeps `b`'s value.
pub fn clamp_region(a: GeoPoint, b: GeoPoint, max_side_m: f64) -> Result<GeoRegion, RegionError> {
    let east_west = |dlon: f64| geodesic_distance(a, GeoPoint::new(a.lon_deg + dlon, a.lat_deg));
    let north_south = |dlat: f64| geodesic_distance(a, GeoPoint::new(a.lon_deg, a.lat_deg + dlat));

    let dlon = limit_offset(b.lon_deg - a.lon_deg, max_side_m, east_west);
    let dlat = limit_offset(b.lat_deg - a.lat_deg, max_side_m, north_south);

    let (west, mut east) = ordered(a.lon_deg, a.lon_deg + dlon);
    let (south, mut north) = ordered(a.lat_deg, a.lat_deg + dlat);
    if east - west < MIN_SPAN_DEG {
        east = west + MIN_SPAN_DEG;
    }
    if north - south < MIN_SPAN_DEG {
        north = south + MIN_SPAN_DEG;
    }
    GeoRegion::new(west, south, east, north)
}

fn limit_offset(offset: f64, max_m: f64, distance: impl Fn(f64) -> f64) -> f64 {
    let d = distance(offset);
    if d.is_nan() || d <= max_m {
        return offset;
    }
    let mut scaled = offset * (max_m / d);
    for _ in 0..MAX_REFINE_STEPS {
        let d = distance(scaled);
        if (d - max_m).abs() <= SIDE_TOLERANCE_M || d <= 0.0 {
            break;
        }
        scaled *= max_m / d;
    }
    scaled
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
