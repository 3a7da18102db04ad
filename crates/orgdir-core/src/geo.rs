//! Radius search geometry.
//!
//! A circular search region is first turned into an axis-aligned box in
//! latitude/longitude space using the planar approximation of 111 km per
//! degree. The box always contains the circle; its corners reach further than
//! the radius. [`RadiusMode::Haversine`] adds an exact great-circle check on
//! the candidates the box lets through.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Kilometres spanned by one degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;

// ─── Points ──────────────────────────────────────────────────────────────────

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub latitude:  f64,
  pub longitude: f64,
}

impl GeoPoint {
  /// Build a point, rejecting coordinates outside their legal ranges (NaN
  /// included).
  pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
    if !(-90.0..=90.0).contains(&latitude) {
      return Err(Error::LatitudeOutOfRange(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
      return Err(Error::LongitudeOutOfRange(longitude));
    }
    Ok(Self { latitude, longitude })
  }

  fn to_point(self) -> Point<f64> { Point::new(self.longitude, self.latitude) }
}

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
  Haversine.distance(a.to_point(), b.to_point()) / 1000.0
}

// ─── Bounding box ────────────────────────────────────────────────────────────

/// An axis-aligned rectangle in latitude/longitude space. Derived per query;
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
  pub min_lat: f64,
  pub max_lat: f64,
  pub min_lon: f64,
  pub max_lon: f64,
}

impl BoundingBox {
  /// Whether `point` lies inside the box, edges included.
  pub fn contains(&self, point: GeoPoint) -> bool {
    point.latitude >= self.min_lat
      && point.latitude <= self.max_lat
      && point.longitude >= self.min_lon
      && point.longitude <= self.max_lon
  }

  pub fn lat_delta(&self) -> f64 { (self.max_lat - self.min_lat) / 2.0 }

  pub fn lon_delta(&self) -> f64 { (self.max_lon - self.min_lon) / 2.0 }
}

/// The box enclosing the circle of `radius_km` around `center`.
///
/// `radius_km` must be finite and strictly positive. Towards the poles
/// `cos(latitude)` approaches zero and the longitude span grows without
/// bound; that error is accepted.
pub fn bounding_box(center: GeoPoint, radius_km: f64) -> Result<BoundingBox> {
  if !(radius_km.is_finite() && radius_km > 0.0) {
    return Err(Error::InvalidRadius(radius_km));
  }

  let lat_delta = radius_km / KM_PER_DEGREE;
  let lon_delta = radius_km / (KM_PER_DEGREE * center.latitude.to_radians().cos());

  Ok(BoundingBox {
    min_lat: center.latitude - lat_delta,
    max_lat: center.latitude + lat_delta,
    min_lon: center.longitude - lon_delta,
    max_lon: center.longitude + lon_delta,
  })
}

// ─── Radius mode ─────────────────────────────────────────────────────────────

/// How radius queries treat candidates inside the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusMode {
  /// Everything inside the box matches.
  #[default]
  BoundingBox,
  /// Box candidates further than the radius (great-circle) are dropped.
  Haversine,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn moscow() -> GeoPoint { GeoPoint::new(55.7558, 37.6176).unwrap() }

  #[test]
  fn box_contains_its_center() {
    for &(lat, lon) in &[(0.0, 0.0), (55.7558, 37.6176), (-33.9, 151.2), (89.0, -179.0)] {
      let center = GeoPoint::new(lat, lon).unwrap();
      for &r in &[0.001, 1.0, 50.0, 2_000.0] {
        let bbox = bounding_box(center, r).unwrap();
        assert!(bbox.contains(center), "({lat}, {lon}) r={r}: {bbox:?}");
      }
    }
  }

  #[test]
  fn latitude_delta_is_radius_over_111() {
    let bbox = bounding_box(moscow(), 111.0).unwrap();
    assert!((bbox.lat_delta() - 1.0).abs() < 1e-9);
  }

  #[test]
  fn longitude_delta_equals_latitude_delta_at_equator() {
    let bbox = bounding_box(GeoPoint::new(0.0, 10.0).unwrap(), 5.0).unwrap();
    assert!((bbox.lon_delta() - bbox.lat_delta()).abs() < 1e-12);
  }

  #[test]
  fn longitude_delta_widens_towards_the_poles() {
    let low  = bounding_box(GeoPoint::new(10.0, 0.0).unwrap(), 10.0).unwrap();
    let high = bounding_box(GeoPoint::new(70.0, 0.0).unwrap(), 10.0).unwrap();
    assert!(high.lon_delta() > low.lon_delta());
  }

  #[test]
  fn deltas_strictly_increase_with_radius() {
    let center = moscow();
    let mut prev = bounding_box(center, 0.5).unwrap();
    for r in [1.0, 2.0, 10.0, 100.0, 1_000.0] {
      let next = bounding_box(center, r).unwrap();
      assert!(next.lat_delta() > prev.lat_delta());
      assert!(next.lon_delta() > prev.lon_delta());
      prev = next;
    }
  }

  #[test]
  fn non_positive_radius_is_rejected() {
    for r in [0.0, -1.0, -0.0001, f64::NAN, f64::INFINITY] {
      let err = bounding_box(moscow(), r).unwrap_err();
      assert!(matches!(err, Error::InvalidRadius(_)), "radius {r}: {err}");
      assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }
  }

  #[test]
  fn out_of_range_coordinates_are_rejected() {
    assert!(matches!(GeoPoint::new(90.5, 0.0), Err(Error::LatitudeOutOfRange(_))));
    assert!(matches!(GeoPoint::new(-91.0, 0.0), Err(Error::LatitudeOutOfRange(_))));
    assert!(matches!(GeoPoint::new(0.0, 180.1), Err(Error::LongitudeOutOfRange(_))));
    assert!(matches!(GeoPoint::new(f64::NAN, 0.0), Err(Error::LatitudeOutOfRange(_))));
    assert!(GeoPoint::new(-90.0, 180.0).is_ok());
  }

  #[test]
  fn box_corner_lies_outside_the_circle() {
    let center = moscow();
    let bbox   = bounding_box(center, 10.0).unwrap();
    let corner = GeoPoint { latitude: bbox.max_lat, longitude: bbox.max_lon };
    assert!(bbox.contains(corner));
    assert!(haversine_km(center, corner) > 10.0);
  }

  #[test]
  fn haversine_between_moscow_and_saint_petersburg() {
    let spb = GeoPoint::new(59.934280, 30.335099).unwrap();
    let d   = haversine_km(moscow(), spb);
    assert!(d > 620.0 && d < 650.0, "distance {d}");
  }
}
