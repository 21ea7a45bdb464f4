use geo::{Distance, Geodesic, Point};

/// A WGS84 coordinate. Latitude north-positive, longitude east-positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        LatLon { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    fn to_point(self) -> Point<f64> {
        // geo points are (x, y) = (lon, lat)
        Point::new(self.lon, self.lat)
    }
}

/// Geodesic distance in meters.
pub fn distance(a: LatLon, b: LatLon) -> f64 {
    Geodesic.distance(a.to_point(), b.to_point())
}

/// >= 1000m: show as km with 2 decimal places
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 { format!("{:.0} m", meters) } else { format!("{:.2} km", meters / 1000.0) }
}

/// Padding applied around a fitted set of points so markers and route ends
/// don't sit on the viewport edge.
const FIT_PADDING: f64 = 1.3;

/// Smallest span a fitted region may have, in degrees. Keeps a single-point
/// fit from collapsing to a zero-area region.
const MIN_SPAN: f64 = 0.01;

/// A lat/lon bounding box described by its center and axis spans, both in
/// degrees. Spans are full widths, not half-widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub center: LatLon,
    pub lat_span: f64,
    pub lon_span: f64,
}

impl Region {
    pub const fn new(center: LatLon, lat_span: f64, lon_span: f64) -> Self {
        Region { center, lat_span, lon_span }
    }

    /// Tight box around `points`, padded by `FIT_PADDING`. None for an
    /// empty slice.
    pub fn from_points(points: &[LatLon]) -> Option<Region> {
        let first = points.first()?;
        let mut south = first.lat;
        let mut north = first.lat;
        let mut west = first.lon;
        let mut east = first.lon;

        for p in &points[1..] {
            south = south.min(p.lat);
            north = north.max(p.lat);
            west = west.min(p.lon);
            east = east.max(p.lon);
        }

        let center = LatLon::new((south + north) / 2.0, (west + east) / 2.0);
        let lat_span = ((north - south) * FIT_PADDING).max(MIN_SPAN);
        let lon_span = ((east - west) * FIT_PADDING).max(MIN_SPAN);

        Some(Region { center, lat_span, lon_span })
    }

    pub fn contains(&self, p: LatLon) -> bool {
        let (south, west, north, east) = self.bounds();
        (south..=north).contains(&p.lat) && (west..=east).contains(&p.lon)
    }

    /// (south, west, north, east) corner coordinates.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (
            self.center.lat - self.lat_span / 2.0,
            self.center.lon - self.lon_span / 2.0,
            self.center.lat + self.lat_span / 2.0,
            self.center.lon + self.lon_span / 2.0,
        )
    }
}

impl Default for Region {
    fn default() -> Self {
        // Wide view over Europe, where all of the fixed capitals sit
        Region::new(LatLon::new(50.0, 10.0), 30.0, 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: LatLon = LatLon::new(51.507222, -0.1275);
    const PARIS: LatLon = LatLon::new(48.8567, 2.3508);

    #[test]
    fn test_distance_london_paris() {
        let d = distance(LONDON, PARIS);
        // Geodesic distance is ~344 km
        assert!((340_000.0..350_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_distance_zero() {
        assert!(distance(LONDON, LONDON) < 1e-6);
    }

    #[test]
    fn test_latlon_validity() {
        assert!(LONDON.is_valid());
        assert!(!LatLon::new(91.0, 0.0).is_valid());
        assert!(!LatLon::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(950.0), "950 m");
        assert_eq!(format_distance(1240.0), "1.24 km");
    }

    #[test]
    fn test_region_from_points_contains_all() {
        let region = Region::from_points(&[LONDON, PARIS]).unwrap();
        assert!(region.contains(LONDON));
        assert!(region.contains(PARIS));
    }

    #[test]
    fn test_region_from_points_is_padded() {
        let region = Region::from_points(&[LONDON, PARIS]).unwrap();
        let raw_lat = LONDON.lat - PARIS.lat;
        assert!(region.lat_span > raw_lat.abs());
    }

    #[test]
    fn test_region_from_single_point_has_min_span() {
        let region = Region::from_points(&[LONDON]).unwrap();
        assert!(region.lat_span >= MIN_SPAN);
        assert!(region.lon_span >= MIN_SPAN);
        assert!(region.contains(LONDON));
    }

    #[test]
    fn test_region_from_empty() {
        assert!(Region::from_points(&[]).is_none());
    }

    #[test]
    fn test_region_bounds_roundtrip() {
        let region = Region::new(LatLon::new(50.0, 10.0), 2.0, 4.0);
        let (south, west, north, east) = region.bounds();
        assert_eq!(south, 49.0);
        assert_eq!(north, 51.0);
        assert_eq!(west, 8.0);
        assert_eq!(east, 12.0);
    }
}
