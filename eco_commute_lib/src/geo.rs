use crate::coordinate::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance on a spherical earth (haversine).
/// This is straight-line distance, not road or transit distance.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();

    let h = f64::sin(d_lat / 2.).powi(2)
        + f64::cos(lat1) * f64::cos(lat2) * f64::sin(d_lon / 2.).powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    let c = 2. * f64::asin(f64::sqrt(h.clamp(0., 1.)));

    EARTH_RADIUS_KM * c
}
