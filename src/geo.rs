//! Latitude/longitude to Cartesian projection
//!
//! Y is up, the reference meridian (lng 0) at the equator lies on +X.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A 3D point on (or around) the globe. Always derived, never cached across radius changes.
pub type SpatialPoint = Vec3;

/// Latitude/longitude pair in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f32,
    pub lng: f32,
}

impl GeoPoint {
    pub const fn new(lat: f32, lng: f32) -> Self {
        Self { lat, lng }
    }

    /// Project this point onto a sphere of `radius`
    #[inline]
    pub fn at(&self, radius: f32) -> SpatialPoint {
        project(self.lat, self.lng, radius)
    }
}

/// Map (lat, lng, radius) to a right-handed Cartesian point.
///
/// Uses the polar angle `90° - lat` and azimuth `lng + 180°`. Total over all
/// real inputs: out-of-range angles wrap around like any other trig argument.
#[inline]
pub fn project(lat: f32, lng: f32, radius: f32) -> SpatialPoint {
    let polar = (90.0 - lat).to_radians();
    let azimuth = (lng + 180.0).to_radians();
    let (sin_p, cos_p) = polar.sin_cos();
    let (sin_a, cos_a) = azimuth.sin_cos();
    Vec3::new(
        -radius * sin_p * cos_a,
        radius * cos_p,
        radius * sin_p * sin_a,
    )
}

/// Rotate a point about the vertical (Y) axis by `angle` radians.
#[inline]
pub fn rotate_y(p: SpatialPoint, angle: f32) -> SpatialPoint {
    let (s, c) = angle.sin_cos();
    Vec3::new(p.x * c + p.z * s, p.y, -p.x * s + p.z * c)
}
