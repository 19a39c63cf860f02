//! Curved flow arcs between two cities
//!
//! A quadratic Bézier whose control point sits above the chord midpoint,
//! lifted in proportion to the chord length. Not a geodesic.

use crate::error::{GlobeError, Result};
use crate::geo::{GeoPoint, SpatialPoint};
use crate::geometry::Polyline;
use serde::Serialize;

/// Default number of segments a flow arc is sampled into
pub const ARC_SEGMENTS: usize = 80;

/// Chord-length factor for the control point lift
const LIFT_FACTOR: f32 = 0.5;

/// Midpoints closer to the origin than this fraction of the radius have no usable direction
const DEGENERATE_EPS: f32 = 1e-4;

#[derive(Clone, Debug, Serialize)]
pub struct FlowArc {
    pub start: SpatialPoint,
    pub control: SpatialPoint,
    pub end: SpatialPoint,
    /// `segments + 1` points from `start` to `end`
    pub points: Polyline,
}

impl FlowArc {
    /// Evaluate the curve at `t` in 0.0..=1.0
    pub fn point_at(&self, t: f32) -> SpatialPoint {
        quadratic_bezier(self.start, self.control, self.end, t)
    }
}

#[inline]
pub fn quadratic_bezier(p0: SpatialPoint, p1: SpatialPoint, p2: SpatialPoint, t: f32) -> SpatialPoint {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Build the arc from `from` to `to` on a sphere of `radius`, sampled into
/// `segments` straight pieces.
///
/// Fails only when the chord midpoint is the origin, i.e. the endpoints are
/// antipodal and the lift direction is undefined.
pub fn build_arc(from: GeoPoint, to: GeoPoint, radius: f32, segments: usize) -> Result<FlowArc> {
    let start = from.at(radius);
    let end = to.at(radius);

    let mid = (start + end) * 0.5;
    let lift = radius + start.distance(end) * LIFT_FACTOR;
    if mid.length() <= radius.abs() * DEGENERATE_EPS {
        return Err(GlobeError::DegenerateArc {
            from: format!("({:.2}, {:.2})", from.lat, from.lng),
            to: format!("({:.2}, {:.2})", to.lat, to.lng),
        });
    }
    let control = mid.normalize() * lift;

    let segments = segments.max(1);
    let mut points = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        points.push(quadratic_bezier(start, control, end, t));
    }

    Ok(FlowArc { start, control, end, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::CITIES;

    #[test]
    fn sampled_polyline_has_81_points_with_exact_ends() {
        let arc = build_arc(CITIES[0].geo, CITIES[5].geo, 2.02, ARC_SEGMENTS).unwrap();
        assert_eq!(arc.points.len(), 81);
        assert!((arc.points[0] - CITIES[0].geo.at(2.02)).length() < 1e-4);
        assert!((arc.points[80] - CITIES[5].geo.at(2.02)).length() < 1e-4);
    }

    #[test]
    fn control_point_is_lifted_by_half_the_chord() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 90.0);
        let arc = build_arc(a, b, 2.0, ARC_SEGMENTS).unwrap();
        let chord = arc.start.distance(arc.end);
        assert!((arc.control.length() - (2.0 + chord * 0.5)).abs() < 1e-4);
        // Apex rises above the surface
        assert!(arc.point_at(0.5).length() > 2.0);
    }

    #[test]
    fn same_city_collapses_to_a_point() {
        let arc = build_arc(CITIES[3].geo, CITIES[3].geo, 2.0, 10).unwrap();
        for p in &arc.points {
            assert!((*p - arc.start).length() < 1e-4);
        }
    }

    #[test]
    fn antipodal_endpoints_are_rejected() {
        let err = build_arc(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0), 2.0, 80);
        assert!(matches!(err, Err(GlobeError::DegenerateArc { .. })));
    }
}
