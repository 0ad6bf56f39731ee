//! Coordinates and search areas.
//!
//! BRO reports locations both in WGS84 (EPSG:4326, degrees) and in the
//! Dutch national grid RD New (EPSG:28992, metres). Reprojection between
//! the two is done with `proj4rs`.

use std::f64::consts::TAU;

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{BroError, Result};

/// EPSG:4326.
const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// EPSG:28992, Amersfoort / RD New.
const RD_NEW_PROJ: &str = concat!(
    "+proj=sterea +lat_0=52.15616055555555 +lon_0=5.38763888888889 +k=0.9999079",
    " +x_0=155000 +y_0=463000 +ellps=bessel",
    " +towgs84=565.417,50.3319,465.552,-0.398957,0.343988,-1.8774,4.0725",
    " +units=m +no_defs"
);

/// Number of segments used when approximating a circle as a polygon.
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 32;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Convert to RD New coordinates.
    ///
    /// # Examples
    /// ```
    /// use bro::geometry::Point;
    ///
    /// let rd = Point::new(51.998929, 4.375587).to_rd().unwrap();
    /// assert!((rd.x - 85530.2).abs() < 2.0);
    /// assert!((rd.y - 446100.2).abs() < 2.0);
    /// ```
    pub fn to_rd(&self) -> Result<RdPoint> {
        let mut point = (self.lon.to_radians(), self.lat.to_radians(), 0.0);
        transform(&wgs84()?, &rd_new()?, &mut point)?;
        Ok(RdPoint::new(point.0, point.1))
    }

    fn validate(&self) -> Result<()> {
        let in_range = (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon);
        if in_range {
            Ok(())
        } else {
            Err(BroError::InvalidArea(format!(
                "coordinate ({}, {}) is not a valid WGS84 position",
                self.lat, self.lon
            )))
        }
    }
}

/// An RD New coordinate in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RdPoint {
    pub x: f64,
    pub y: f64,
}

impl RdPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert to WGS84 coordinates.
    pub fn to_wgs84(&self) -> Result<Point> {
        let mut point = (self.x, self.y, 0.0);
        transform(&rd_new()?, &wgs84()?, &mut point)?;
        Ok(Point::new(point.1.to_degrees(), point.0.to_degrees()))
    }
}

fn wgs84() -> Result<Proj> {
    Ok(Proj::from_proj_string(WGS84_PROJ)?)
}

fn rd_new() -> Result<Proj> {
    Ok(Proj::from_proj_string(RD_NEW_PROJ)?)
}

/// A circular search area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    /// Radius in kilometres.
    pub radius_km: f64,
}

impl Circle {
    pub fn new(center: Point, radius_km: f64) -> Self {
        Self { center, radius_km }
    }

    /// Area definition in the format of the characteristics search.
    pub fn bro_json(&self) -> Value {
        json!({
            "enclosingCircle": {
                "center": {
                    "lat": self.center.lat,
                    "lon": self.center.lon,
                },
                "radius": self.radius_km,
            }
        })
    }

    /// The circle centre as a GeoJSON point feature.
    pub fn to_geojson_feature(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [self.center.lon, self.center.lat],
            },
            "properties": {
                "description": "Requested centroid",
            }
        })
    }

    /// Approximate the circle by a closed ring of WGS84 points.
    ///
    /// The ring is built in RD New so the radius is measured in metres on
    /// the ground; the first point is repeated at the end.
    pub fn to_polygon(&self, segments: usize) -> Result<Vec<Point>> {
        let segments = segments.max(3);
        let center = self.center.to_rd()?;
        let radius_m = self.radius_km * 1000.0;

        let mut ring = (0..segments)
            .map(|i| {
                let angle = TAU * i as f64 / segments as f64;
                RdPoint::new(
                    center.x + radius_m * angle.cos(),
                    center.y + radius_m * angle.sin(),
                )
                .to_wgs84()
            })
            .collect::<Result<Vec<_>>>()?;
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
        Ok(ring)
    }

    /// The circle outline as a GeoJSON polygon feature.
    pub fn to_geojson_polygon_feature(&self) -> Result<Value> {
        let ring: Vec<[f64; 2]> = self
            .to_polygon(DEFAULT_CIRCLE_SEGMENTS)?
            .iter()
            .map(|p| [p.lon, p.lat])
            .collect();
        Ok(json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [ring],
            },
            "properties": {
                "description": "Requested area",
            }
        }))
    }

    fn validate(&self) -> Result<()> {
        self.center.validate()?;
        if self.radius_km.is_finite() && self.radius_km > 0.0 {
            Ok(())
        } else {
            Err(BroError::InvalidArea(format!(
                "radius must be a positive number of kilometres, got {}",
                self.radius_km
            )))
        }
    }
}

/// A rectangular search area between two corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub lower_corner: Point,
    pub upper_corner: Point,
}

impl Envelope {
    pub fn new(lower_corner: Point, upper_corner: Point) -> Self {
        Self {
            lower_corner,
            upper_corner,
        }
    }

    /// Area definition in the format of the characteristics search.
    pub fn bro_json(&self) -> Value {
        json!({
            "boundingBox": {
                "lowerCorner": {
                    "lat": self.lower_corner.lat,
                    "lon": self.lower_corner.lon,
                },
                "upperCorner": {
                    "lat": self.upper_corner.lat,
                    "lon": self.upper_corner.lon,
                },
            }
        })
    }

    /// The envelope as a closed GeoJSON polygon feature.
    pub fn to_geojson_feature(&self) -> Value {
        let (lower, upper) = (self.lower_corner, self.upper_corner);
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [lower.lon, lower.lat],
                    [upper.lon, lower.lat],
                    [upper.lon, upper.lat],
                    [lower.lon, upper.lat],
                    [lower.lon, lower.lat],
                ]],
            },
            "properties": {
                "description": "Requested area",
            }
        })
    }

    fn validate(&self) -> Result<()> {
        self.lower_corner.validate()?;
        self.upper_corner.validate()?;
        if self.lower_corner.lat > self.upper_corner.lat
            || self.lower_corner.lon > self.upper_corner.lon
        {
            return Err(BroError::InvalidArea(format!(
                "lower corner ({}, {}) lies above or right of upper corner ({}, {})",
                self.lower_corner.lat,
                self.lower_corner.lon,
                self.upper_corner.lat,
                self.upper_corner.lon
            )));
        }
        Ok(())
    }
}

/// Area in which to search for CPT objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    Circle(Circle),
    Envelope(Envelope),
}

impl Area {
    /// Area definition in the format of the characteristics search.
    pub fn bro_json(&self) -> Value {
        match self {
            Self::Circle(circle) => circle.bro_json(),
            Self::Envelope(envelope) => envelope.bro_json(),
        }
    }

    /// The area as a GeoJSON feature, using the circle centre for circles.
    pub fn to_geojson_feature(&self) -> Value {
        match self {
            Self::Circle(circle) => circle.to_geojson_feature(),
            Self::Envelope(envelope) => envelope.to_geojson_feature(),
        }
    }

    /// Check coordinates, corner order and radius.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Circle(circle) => circle.validate(),
            Self::Envelope(envelope) => envelope.validate(),
        }
    }
}

impl From<Circle> for Area {
    fn from(circle: Circle) -> Self {
        Self::Circle(circle)
    }
}

impl From<Envelope> for Area {
    fn from(envelope: Envelope) -> Self {
        Self::Envelope(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WGS: Point = Point {
        lat: 51.998929,
        lon: 4.375587,
    };
    const RD: RdPoint = RdPoint {
        x: 85530.20712412785,
        y: 446100.1761217844,
    };

    #[test]
    fn test_wgs84_to_rd() {
        let rd = WGS.to_rd().unwrap();
        assert!((rd.x - RD.x).abs() < 2.0, "x = {}", rd.x);
        assert!((rd.y - RD.y).abs() < 2.0, "y = {}", rd.y);
    }

    #[test]
    fn test_rd_to_wgs84() {
        let wgs = RD.to_wgs84().unwrap();
        assert!((wgs.lat - WGS.lat).abs() < 2e-5, "lat = {}", wgs.lat);
        assert!((wgs.lon - WGS.lon).abs() < 2e-5, "lon = {}", wgs.lon);
    }

    #[test]
    fn test_round_trip() {
        let back = WGS.to_rd().unwrap().to_wgs84().unwrap();
        assert!((back.lat - WGS.lat).abs() < 1e-7);
        assert!((back.lon - WGS.lon).abs() < 1e-7);
    }

    #[test]
    fn test_amersfoort_origin() {
        // Projection origin of RD New
        let rd = RdPoint::new(155000.0, 463000.0).to_wgs84().unwrap();
        assert!((rd.lat - 52.155).abs() < 0.01);
        assert!((rd.lon - 5.387).abs() < 0.01);
    }

    #[test]
    fn test_circle_bro_json() {
        let circle = Circle::new(Point::new(52.038297852, 5.31447958948), 0.5);

        assert_eq!(
            circle.bro_json(),
            json!({
                "enclosingCircle": {
                    "center": {"lat": 52.038297852, "lon": 5.31447958948},
                    "radius": 0.5,
                }
            })
        );
    }

    #[test]
    fn test_circle_geojson_feature() {
        let circle = Circle::new(Point::new(52.038297852, 5.31447958948), 0.5);

        assert_eq!(
            circle.to_geojson_feature(),
            json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [5.31447958948, 52.038297852]},
                "properties": {"description": "Requested centroid"},
            })
        );
    }

    #[test]
    fn test_circle_polygon_is_closed_and_sized() {
        let circle = Circle::new(Point::new(52.038297852, 5.31447958948), 0.5);
        let ring = circle.to_polygon(16).unwrap();

        assert_eq!(ring.len(), 17);
        assert_eq!(ring.first(), ring.last());

        let center = circle.center.to_rd().unwrap();
        for point in &ring {
            let rd = point.to_rd().unwrap();
            let distance = (rd.x - center.x).hypot(rd.y - center.y);
            assert!((distance - 500.0).abs() < 0.01, "distance = {distance}");
        }
    }

    #[test]
    fn test_circle_polygon_feature() {
        let circle = Circle::new(Point::new(52.0, 5.0), 1.0);
        let feature = circle.to_geojson_polygon_feature().unwrap();

        assert_eq!(feature["geometry"]["type"], "Polygon");
        let ring = feature["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), DEFAULT_CIRCLE_SEGMENTS + 1);
    }

    #[test]
    fn test_envelope_bro_json() {
        let envelope = Envelope::new(
            Point::new(51.92269686635185, 4.469594207611851),
            Point::new(51.923034432171065, 4.470094707426648),
        );

        assert_eq!(
            envelope.bro_json(),
            json!({
                "boundingBox": {
                    "lowerCorner": {"lat": 51.92269686635185, "lon": 4.469594207611851},
                    "upperCorner": {"lat": 51.923034432171065, "lon": 4.470094707426648},
                }
            })
        );
    }

    #[test]
    fn test_envelope_geojson_feature() {
        let envelope = Envelope::new(
            Point::new(51.92269686635185, 4.469594207611851),
            Point::new(51.923034432171065, 4.470094707426648),
        );

        assert_eq!(
            envelope.to_geojson_feature(),
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [4.469594207611851, 51.92269686635185],
                        [4.470094707426648, 51.92269686635185],
                        [4.470094707426648, 51.923034432171065],
                        [4.469594207611851, 51.923034432171065],
                        [4.469594207611851, 51.92269686635185],
                    ]],
                },
                "properties": {"description": "Requested area"},
            })
        );
    }

    #[test]
    fn test_area_delegates() {
        let envelope = Envelope::new(Point::new(51.9, 4.4), Point::new(52.0, 4.5));
        let area = Area::from(envelope);

        assert_eq!(area.bro_json(), envelope.bro_json());
        assert_eq!(area.to_geojson_feature(), envelope.to_geojson_feature());
    }

    #[test]
    fn test_area_validation() {
        assert!(Area::from(Envelope::new(Point::new(51.9, 4.4), Point::new(52.0, 4.5)))
            .validate()
            .is_ok());
        assert!(Area::from(Envelope::new(Point::new(52.0, 4.4), Point::new(51.9, 4.5)))
            .validate()
            .is_err());
        assert!(Area::from(Circle::new(Point::new(52.0, 5.0), 0.0))
            .validate()
            .is_err());
        assert!(Area::from(Circle::new(Point::new(52.0, 5.0), f64::NAN))
            .validate()
            .is_err());
        assert!(Area::from(Circle::new(Point::new(95.0, 5.0), 1.0))
            .validate()
            .is_err());
    }
}
