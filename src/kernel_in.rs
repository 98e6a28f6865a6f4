// Internal Interface of the crate/lib between the input module and the solid builder

use serde::Serialize;
use std::fmt;
use std::ops::{Add, Sub};

use crate::config::ProjectionConfig;
use crate::tags::Tags;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeographicCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeographicCoordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Local meters of a point relative to self as region center.
    /// Equirectangular, good for a few kilometers only.
    pub fn coordinates_to_position(
        &self,
        point: &GeographicCoordinates,
        config: &ProjectionConfig,
    ) -> GroundPosition {
        // the closer to the pole, the shorter a degree of longitude gets
        let meters_per_degree = config.earth_radius * std::f64::consts::PI / 180.;
        let lon_fakt = meters_per_degree * self.latitude.to_radians().cos();

        GroundPosition {
            east: (point.longitude - self.longitude) * lon_fakt * config.scale_factor,
            north: (point.latitude - self.latitude) * meters_per_degree * config.scale_factor,
        }
    }
}

impl fmt::Display for GeographicCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(lon {}, lat {})", self.longitude, self.latitude)
    }
}

/// A point of the local plane: `east` is x, `north` is z, y stays free for up.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GroundPosition {
    pub east: f64,
    pub north: f64,
}

impl Add for GroundPosition {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            east: self.east + other.east,
            north: self.north + other.north,
        }
    }
}

impl Sub for GroundPosition {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            east: self.east - other.east,
            north: self.north - other.north,
        }
    }
}

impl GroundPosition {
    pub const ZERO: Self = Self {
        east: 0.0,
        north: 0.0,
    };

    pub fn new(east: f64, north: f64) -> Self {
        Self { east, north }
    }

    pub fn length(&self) -> f64 {
        f64::sqrt(self.east * self.east + self.north * self.north)
    }
}

impl fmt::Display for GroundPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.east, self.north)
    }
}

/// Extent on the local plane, in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox {
    pub fn new() -> Self {
        BoundingBox {
            north: f64::MIN,
            south: f64::MAX,
            east: f64::MIN,
            west: f64::MAX,
        }
    }

    pub fn include(&mut self, position: &GroundPosition) {
        self.north = self.north.max(position.north);
        self.south = self.south.min(position.north);
        self.east = self.east.max(position.east);
        self.west = self.west.min(position.east);
    }

    pub fn center(&self) -> GroundPosition {
        GroundPosition {
            east: (self.west + self.east) / 2.,
            north: (self.south + self.north) / 2.,
        }
    }
}

/// Geographic extent of a batch, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Default for GeoBoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoBoundingBox {
    pub fn new() -> Self {
        GeoBoundingBox {
            north: f64::NEG_INFINITY,
            south: f64::INFINITY,
            east: f64::NEG_INFINITY,
            west: f64::INFINITY,
        }
    }

    pub fn from_edges(south: f64, west: f64, north: f64, east: f64) -> Self {
        GeoBoundingBox {
            north,
            south,
            east,
            west,
        }
    }

    pub fn include(&mut self, coordinates: &GeographicCoordinates) {
        self.north = self.north.max(coordinates.latitude);
        self.south = self.south.min(coordinates.latitude);
        self.east = self.east.max(coordinates.longitude);
        self.west = self.west.min(coordinates.longitude);
    }

    pub fn is_empty(&self) -> bool {
        self.north < self.south || self.east < self.west
    }

    /// Midpoint of the extent. Not a centroid. Non-finite while empty.
    pub fn center_as_geo(&self) -> GeographicCoordinates {
        GeographicCoordinates {
            latitude: (self.south + self.north) / 2.,
            longitude: (self.west + self.east) / 2.,
        }
    }
}

// Overpass wants south,west,north,east
impl fmt::Display for GeoBoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

/// A closed building way as it comes from OSM: the ring repeats its first point at the end.
#[derive(Clone, Debug)]
pub struct GeoWay {
    pub id: u64,
    pub ring: Vec<GeographicCoordinates>,
    pub tags: Tags,
}

/// An open road way.
#[derive(Clone, Debug)]
pub struct RoadWay {
    pub id: u64,
    pub line: Vec<GeographicCoordinates>,
    pub tags: Tags,
}

/// Center shared by all conversions of one batch.
pub fn region_center<'a>(
    rings: impl IntoIterator<Item = &'a [GeographicCoordinates]>,
) -> GeographicCoordinates {
    let mut bounding_box = GeoBoundingBox::new();
    for ring in rings {
        for coordinates in ring {
            bounding_box.include(coordinates);
        }
    }
    bounding_box.center_as_geo()
}

#[derive(Clone, Copy, Debug)]
pub struct Projector {
    pub center: GeographicCoordinates,
    config: ProjectionConfig,
}

impl Projector {
    pub fn new(center: GeographicCoordinates, config: ProjectionConfig) -> Self {
        Self { center, config }
    }

    pub fn project(&self, point: &GeographicCoordinates) -> GroundPosition {
        self.center.coordinates_to_position(point, &self.config)
    }

    pub fn project_ring(&self, ring: &[GeographicCoordinates]) -> Vec<GroundPosition> {
        ring.iter().map(|point| self.project(point)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn calgary() -> GeographicCoordinates {
        GeographicCoordinates::new(-114.07, 51.046)
    }

    #[test]
    fn center_projects_to_zero() {
        let projector = Projector::new(calgary(), ProjectionConfig::default());
        let position = projector.project(&calgary());
        assert_eq!(position, GroundPosition::ZERO);
    }

    #[test]
    fn projection_is_deterministic() {
        let projector = Projector::new(calgary(), ProjectionConfig::default());
        let point = GeographicCoordinates::new(-114.065, 51.05);
        assert_eq!(projector.project(&point), projector.project(&point));
    }

    #[test]
    fn north_and_east_are_scaled_meters() {
        let config = ProjectionConfig::default();
        let center = GeographicCoordinates::new(0.0, 0.0);
        let projector = Projector::new(center, config);

        // One degree at the equator is 111319.49 meters, times the visual scale.
        let position = projector.project(&GeographicCoordinates::new(1.0, 1.0));
        assert_relative_eq!(position.east, 111_319.490_793_273_6 * 3.0, epsilon = 1e-6);
        assert_relative_eq!(position.north, 111_319.490_793_273_6 * 3.0, epsilon = 1e-6);
    }

    #[test]
    fn longitude_shrinks_with_latitude() {
        let config = ProjectionConfig::default();
        let center = GeographicCoordinates::new(10.0, 60.0);
        let projector = Projector::new(center, config);
        let position = projector.project(&GeographicCoordinates::new(10.001, 60.001));
        assert_relative_eq!(position.east, position.north * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn center_is_bounding_box_midpoint() {
        let ring_a = vec![
            GeographicCoordinates::new(10.0, 50.0),
            GeographicCoordinates::new(10.2, 50.1),
        ];
        let ring_b = vec![
            GeographicCoordinates::new(10.1, 50.4),
            GeographicCoordinates::new(10.05, 50.2),
            GeographicCoordinates::new(10.1, 50.4),
        ];
        let center = region_center([ring_a.as_slice(), ring_b.as_slice()]);
        assert_relative_eq!(center.longitude, 10.1, epsilon = 1e-12);
        assert_relative_eq!(center.latitude, 50.2, epsilon = 1e-12);
    }

    #[test]
    fn empty_batch_has_no_finite_center() {
        let center = region_center(std::iter::empty::<&[GeographicCoordinates]>());
        assert!(!center.is_finite());
        assert!(GeoBoundingBox::new().is_empty());
    }

    #[test]
    fn overpass_bbox_order() {
        let bounding_box = GeoBoundingBox::from_edges(51.04, -114.08, 51.052, -114.055);
        assert_eq!(bounding_box.to_string(), "51.04,-114.08,51.052,-114.055");
    }
}
