use crate::math::GeoPoint;

/// A geographic bounding rectangle in degrees.
///
/// Construction normalizes the corners (min/max per axis) and rejects
/// zero-area rectangles, so every `GeoRegion` has `west < east` and
/// `south < north`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoRegion {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RegionError {
    Degenerate { width: f64, height: f64 },
    NonFinite,
}

impl std::fmt::Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionError::Degenerate { width, height } => {
                write!(f, "degenerate region: width={width} height={height}")
            }
            RegionError::NonFinite => write!(f, "region coordinates must be finite"),
        }
    }
}

impl std::error::Error for RegionError {}

impl GeoRegion {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, RegionError> {
        if ![west, south, east, north].iter().all(|v| v.is_finite()) {
            return Err(RegionError::NonFinite);
        }
        let (w, e) = (west.min(east), west.max(east));
        let (s, n) = (south.min(north), south.max(north));
        let width = e - w;
        let height = n - s;
        if width <= 0.0 || height <= 0.0 {
            return Err(RegionError::Degenerate { width, height });
        }
        Ok(Self {
            west: w,
            south: s,
            east: e,
            north: n,
        })
    }

    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Result<Self, RegionError> {
        Self::new(a.lon_deg, a.lat_deg, b.lon_deg, b.lat_deg)
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn width_deg(&self) -> f64 {
        self.east - self.west
    }

    pub fn height_deg(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.west + self.east) * 0.5,
            (self.south + self.north) * 0.5,
        )
    }

    pub fn south_west(&self) -> GeoPoint {
        GeoPoint::new(self.west, self.south)
    }

    pub fn north_east(&self) -> GeoPoint {
        GeoPoint::new(self.east, self.north)
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lon_deg >= self.west
            && p.lon_deg <= self.east
            && p.lat_deg >= self.south
            && p.lat_deg <= self.north
    }
}
