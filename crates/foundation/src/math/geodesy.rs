/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// Mean earth radius (meters), used by the spherical fallback.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_TOLERANCE: f64 = 1e-12;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// Geodesic distance on the WGS84 ellipsoid (meters).
///
/// Vincenty's inverse formula. Nearly antipodal pairs, where the iteration
/// does not converge, fall back to the great-circle distance.
pub fn geodesic_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    vincenty_inverse(a, b).unwrap_or_else(|| haversine_distance(a, b))
}

/// Great-circle distance on a sphere of `MEAN_EARTH_RADIUS` (meters).
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat_deg.to_radians();
    let phi2 = b.lat_deg.to_radians();
    let dphi = phi2 - phi1;
    let dlambda = (b.lon_deg - a.lon_deg).to_radians();
    let h = (dphi * 0.5).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda * 0.5).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS * h.sqrt().min(1.0).asin()
}

fn vincenty_inverse(a: GeoPoint, b: GeoPoint) -> Option<f64> {
    let f = WGS84_F;
    let l = (b.lon_deg - a.lon_deg).to_radians();
    let u1 = ((1.0 - f) * a.lat_deg.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * b.lat_deg.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sigma = (t1 * t1 + t2 * t2).sqrt();
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        if sin_sigma == 0.0 {
            // Coincident points resolve here; antipodal ones do not converge.
            return (cos_sigma > 0.0).then_some(0.0);
        }
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos2_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos2_alpha == 0.
        let cos_2sigma_m = if cos2_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos2_alpha
        } else {
            0.0
        };
        let c = f / 16.0 * cos2_alpha * (4.0 + f * (4.0 - 3.0 * cos2_alpha));
        let prev = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - prev).abs() < VINCENTY_TOLERANCE {
            let u_sq = cos2_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                                * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));
            return Some(WGS84_B * big_a * (sigma - delta_sigma));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, WGS84_A, geodesic_distance, haversine_distance};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn one_degree_along_equator() {
        let d = geodesic_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert_close(d, WGS84_A * 1f64.to_radians(), 1e-3);
    }

    #[test]
    fn one_degree_along_meridian() {
        // Meridian arc from the equator to 1°N on WGS84.
        let d = geodesic_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert_close(d, 110_574.4, 1.0);
    }

    #[test]
    fn coincident_points_are_zero() {
        let p = GeoPoint::new(13.4, 52.5);
        assert_eq!(geodesic_distance(p, p), 0.0);
    }

    #[test]
    fn antipodal_points_fall_back_to_sphere() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(180.0, 0.0);
        let d = geodesic_distance(a, b);
        assert!(d.is_finite());
        assert!(d > 19_900_000.0 && d < 20_100_000.0, "got {d}");
    }

    #[test]
    fn haversine_agrees_roughly_with_ellipsoid() {
        let a = GeoPoint::new(13.40, 52.52);
        let b = GeoPoint::new(13.45, 52.50);
        let e = geodesic_distance(a, b);
        let s = haversine_distance(a, b);
        assert!((e - s).abs() / e < 0.005);
    }
}
