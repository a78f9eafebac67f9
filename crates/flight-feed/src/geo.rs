// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Geodesy helpers for the flight search area.
//!
//! Provides the latitude/longitude bounding box that encloses a circular
//! search radius around the observer, and great-circle (haversine) distance
//! between two points. Everything here is pure and allocation-free apart from
//! [`distances_miles`].

/// Meters in one statute mile. Used for every mile conversion in the crate.
pub const METERS_PER_MILE: f64 = 1609.344;

/// WGS-84 equatorial radius, used to turn the search radius into an angle.
pub const WGS84_EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;

/// Mean Earth radius, used by the haversine distance.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_000.0;

/// `cos(latitude)` below this is treated as standing on a pole.
const POLE_EPSILON: f64 = 1e-12;

/// A position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Placeholder for a record that arrived without a position.
    ///
    /// NaN coordinates flow through [`distance_miles`] as NaN, which sorts the
    /// record to the end of a table instead of failing the fetch.
    pub const MISSING: Self = Self {
        latitude: f64::NAN,
        longitude: f64::NAN,
    };

    /// Create a point, normalising longitude to (-180, 180].
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude: normalize_longitude(longitude),
        }
    }

    /// Both coordinates are finite and latitude lies in [-90, 90].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.latitude.is_nan() || self.longitude.is_nan()
    }
}

/// Rectangular latitude/longitude region around a search circle.
///
/// `east` may be smaller than `west` when the box wraps across the
/// antimeridian; consumers that care must check [`Self::crosses_antimeridian`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Edges in the order the flight-position API expects:
    /// north, south, west, east.
    #[must_use]
    pub fn api_order(&self) -> [f64; 4] {
        [self.north, self.south, self.west, self.east]
    }

    /// Comma-joined `north,south,west,east` with three decimals per edge.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        let [north, south, west, east] = self.api_order();
        format!("{north:.3},{south:.3},{west:.3},{east:.3}")
    }

    #[must_use]
    pub fn crosses_antimeridian(&self) -> bool {
        self.east < self.west
    }

    /// Whether the box spans every longitude (polar search circle).
    #[must_use]
    pub fn is_full_longitude(&self) -> bool {
        self.west <= -180.0 && self.east >= 180.0
    }
}

/// Wrap an angle in degrees into (-180, 180].
#[must_use]
pub fn normalize_longitude(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Compute the bounding box of a circle of `radius_miles` around `center`.
///
/// North and south edges are a plain angular shift of the center latitude;
/// east and west use the spherical longitude delta
/// `asin(sin(d) / cos(lat))`. When the latitude is a pole, or the circle
/// reaches over one, the full longitude range is returned.
///
/// A radius of zero collapses the box to the center point. Negative radii
/// are not corrected.
#[must_use]
pub fn compute_bounding_box(center: GeoPoint, radius_miles: f64) -> BoundingBox {
    let angular_distance = radius_miles * METERS_PER_MILE / WGS84_EQUATORIAL_RADIUS_M;
    let lat_rad = center.latitude.to_radians();

    // Latitude edges are never wrapped; an edge past a pole means the circle contains it
    let north_raw = center.latitude + angular_distance.to_degrees();
    let south_raw = center.latitude - angular_distance.to_degrees();
    let covers_pole = north_raw >= 90.0 || south_raw <= -90.0;

    let cos_lat = lat_rad.cos();
    let ratio = angular_distance.sin() / cos_lat;

    let (west, east) = if covers_pole || cos_lat.abs() < POLE_EPSILON || ratio.abs() >= 1.0 {
        (-180.0, 180.0)
    } else {
        let delta = ratio.asin().to_degrees();
        (
            normalize_longitude(center.longitude - delta),
            normalize_longitude(center.longitude + delta),
        )
    };

    let north = clamp_latitude(north_raw);
    let south = clamp_latitude(south_raw);

    BoundingBox {
        north,
        south,
        east,
        west,
    }
}

fn clamp_latitude(degrees: f64) -> f64 {
    // clamp() would turn NaN into a bound
    if degrees > 90.0 {
        90.0
    } else if degrees < -90.0 {
        -90.0
    } else {
        degrees
    }
}

/// Great-circle distance in statute miles using the haversine formula.
///
/// NaN coordinates produce a NaN distance.
#[must_use]
pub fn distance_miles(observer: GeoPoint, target: GeoPoint) -> f64 {
    let phi1 = observer.latitude.to_radians();
    let phi2 = target.latitude.to_radians();
    let delta_phi = (target.latitude - observer.latitude).to_radians();
    let delta_lambda = (target.longitude - observer.longitude).to_radians();

    let mut a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push nearly antipodal points just past 1
    if a > 1.0 {
        a = 1.0;
    }
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    MEAN_EARTH_RADIUS_M * c / METERS_PER_MILE
}

/// Distance from one observer to each target, element-wise.
#[must_use]
pub fn distances_miles(observer: GeoPoint, targets: &[GeoPoint]) -> Vec<f64> {
    targets
        .iter()
        .map(|target| distance_miles(observer, *target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUE_OF_LIBERTY: GeoPoint = GeoPoint {
        latitude: 40.6892,
        longitude: -74.0445,
    };
    const EMPIRE_STATE: GeoPoint = GeoPoint {
        latitude: 40.7484,
        longitude: -73.9857,
    };

    fn in_degree_range(bbox: &BoundingBox) -> bool {
        (-90.0..=90.0).contains(&bbox.north)
            && (-90.0..=90.0).contains(&bbox.south)
            && (-180.0..=180.0).contains(&bbox.east)
            && (-180.0..=180.0).contains(&bbox.west)
    }

    #[test]
    fn test_normalize_longitude() {
        assert!((normalize_longitude(190.0) - -170.0).abs() < 1e-9);
        assert!((normalize_longitude(-190.0) - 170.0).abs() < 1e-9);
        assert!((normalize_longitude(180.0) - 180.0).abs() < 1e-9);
        assert!((normalize_longitude(-180.0) - 180.0).abs() < 1e-9);
        assert!((normalize_longitude(540.0) - 180.0).abs() < 1e-9);
        assert!((normalize_longitude(-74.0) - -74.0).abs() < 1e-9);
        assert!(normalize_longitude(f64::NAN).is_nan());
    }

    #[test]
    fn test_bounding_box_ordering_and_ranges() {
        let centers = [
            GeoPoint::new(40.7, -74.0),
            GeoPoint::new(-33.9, 151.2),
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(64.1, -21.9),
            GeoPoint::new(51.5, 179.9),
        ];

        for center in centers {
            for radius in [0.5, 5.0, 20.0, 150.0] {
                let bbox = compute_bounding_box(center, radius);
                assert!(bbox.north > bbox.south, "{center:?} r={radius}: {bbox:?}");
                assert!(in_degree_range(&bbox), "{center:?} r={radius}: {bbox:?}");
            }
        }
    }

    #[test]
    fn test_bounding_box_known_values() {
        // 20 miles is ~0.2891 degrees of arc on the equatorial radius
        let bbox = compute_bounding_box(GeoPoint::new(40.0, -74.0), 20.0);
        assert!((bbox.north - 40.2891).abs() < 1e-3);
        assert!((bbox.south - 39.7109).abs() < 1e-3);
        // cos(40) widens the east/west delta to ~0.3774 degrees
        assert!((bbox.east - -73.6226).abs() < 1e-3);
        assert!((bbox.west - -74.3774).abs() < 1e-3);
    }

    #[test]
    fn test_bounding_box_collapses_for_zero_radius() {
        let center = GeoPoint::new(48.85, 2.35);
        let bbox = compute_bounding_box(center, 0.0);
        assert!((bbox.north - bbox.south).abs() < 1e-9);
        assert!((bbox.east - bbox.west).abs() < 1e-9);
        assert!((bbox.north - 48.85).abs() < 1e-9);
        assert!((bbox.east - 2.35).abs() < 1e-9);

        let tiny = compute_bounding_box(center, 1e-9);
        assert!((tiny.north - tiny.south).abs() < 1e-9);
        assert!((tiny.east - tiny.west).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_at_poles_spans_all_longitudes() {
        for latitude in [90.0, -90.0, 89.9999, -89.99] {
            let bbox = compute_bounding_box(GeoPoint::new(latitude, 10.0), 20.0);
            assert!(bbox.is_full_longitude(), "lat {latitude}: {bbox:?}");
            assert!((bbox.west - -180.0).abs() < 1e-9);
            assert!((bbox.east - 180.0).abs() < 1e-9);
            assert!(bbox.north <= 90.0 && bbox.south >= -90.0);
            assert!(bbox.north > bbox.south);
        }
    }

    #[test]
    fn test_bounding_box_for_continental_radius() {
        for radius in [3000.0, 9000.0, 10_000.0, 20_000.0] {
            let bbox = compute_bounding_box(GeoPoint::new(40.0, -74.0), radius);
            assert!(bbox.north > bbox.south, "r={radius}: {bbox:?}");
            assert!(in_degree_range(&bbox), "r={radius}: {bbox:?}");
        }

        // 9000 miles reaches past both poles
        let bbox = compute_bounding_box(GeoPoint::new(40.0, -74.0), 9000.0);
        assert!((bbox.north - 90.0).abs() < 1e-9);
        assert!((bbox.south - -90.0).abs() < 1e-9);
        assert!(bbox.is_full_longitude(), "{bbox:?}");

        // 4000 miles reaches the north pole only
        let bbox = compute_bounding_box(GeoPoint::new(40.0, -74.0), 4000.0);
        assert!((bbox.north - 90.0).abs() < 1e-9);
        assert!(bbox.south > -90.0);
        assert!(bbox.is_full_longitude(), "{bbox:?}");
    }

    #[test]
    fn test_bounding_box_wraps_antimeridian() {
        let bbox = compute_bounding_box(GeoPoint::new(-17.0, 179.95), 20.0);
        assert!(bbox.crosses_antimeridian());
        assert!(bbox.east < -179.0);
        assert!(bbox.west > 179.0);
    }

    #[test]
    fn test_query_value_uses_api_order() {
        let bbox = BoundingBox {
            north: 41.0,
            south: 40.0,
            east: -73.5,
            west: -74.5,
        };
        assert_eq!(bbox.api_order(), [41.0, 40.0, -74.5, -73.5]);
        assert_eq!(bbox.to_query_value(), "41.000,40.000,-74.500,-73.500");
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for point in [STATUE_OF_LIBERTY, EMPIRE_STATE, GeoPoint::new(90.0, 0.0)] {
            assert!(distance_miles(point, point).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (STATUE_OF_LIBERTY, EMPIRE_STATE),
            (GeoPoint::new(33.9425, -118.4081), GeoPoint::new(40.6413, -73.7781)),
            (GeoPoint::new(-33.9, 151.2), GeoPoint::new(51.5, -0.1)),
        ];
        for (a, b) in pairs {
            assert!((distance_miles(a, b) - distance_miles(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distance_statue_of_liberty_to_empire_state() {
        let miles = distance_miles(STATUE_OF_LIBERTY, EMPIRE_STATE);
        assert!((miles - 5.0).abs() < 0.2, "got {miles}");
    }

    #[test]
    fn test_distance_lax_to_jfk() {
        // LAX to JFK is approximately 2,475 miles
        let miles = distance_miles(
            GeoPoint::new(33.9425, -118.4081),
            GeoPoint::new(40.6413, -73.7781),
        );
        assert!((miles - 2475.0).abs() < 10.0);
    }

    #[test]
    fn test_distance_propagates_nan() {
        assert!(distance_miles(STATUE_OF_LIBERTY, GeoPoint::MISSING).is_nan());
        assert!(distance_miles(GeoPoint::MISSING, EMPIRE_STATE).is_nan());
    }

    #[test]
    fn test_distances_element_wise() {
        let targets = [STATUE_OF_LIBERTY, EMPIRE_STATE, GeoPoint::MISSING];
        let distances = distances_miles(STATUE_OF_LIBERTY, &targets);
        assert_eq!(distances.len(), 3);
        assert!(distances[0].abs() < f64::EPSILON);
        assert!((distances[1] - distance_miles(STATUE_OF_LIBERTY, EMPIRE_STATE)).abs() < 1e-12);
        assert!(distances[2].is_nan());
    }
}
