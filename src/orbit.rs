//! Satellites circling the globe, each dragging a short motion trail

use crate::colors::{Rgb, SATELLITE_PALETTE};
use crate::geo::SpatialPoint;
use crate::geometry::Polyline;
use glam::Vec3;
use rand::Rng;
use serde::Serialize;
use std::f32::consts::{FRAC_PI_4, TAU};

/// Trail samples kept per satellite
pub const TRAIL_LEN: usize = 30;

/// Vertical squash applied to the tilted component of the orbit
const TILT_SQUASH: f32 = 0.3;

/// Fixed-capacity FIFO of recent positions.
///
/// Storage is allocated once; pushing past capacity overwrites the oldest
/// slot, so each push is O(1).
#[derive(Clone, Debug)]
pub struct TrailBuffer {
    slots: Vec<SpatialPoint>,
    head: usize,
    len: usize,
}

impl TrailBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Vec3::ZERO; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, p: SpatialPoint) {
        let cap = self.slots.len();
        let tail = (self.head + self.len) % cap;
        self.slots[tail] = p;
        if self.len < cap {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % cap;
        }
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = SpatialPoint> + '_ {
        let cap = self.slots.len();
        (0..self.len).map(move |i| self.slots[(self.head + i) % cap])
    }

    pub fn newest(&self) -> Option<SpatialPoint> {
        if self.len == 0 {
            None
        } else {
            Some(self.slots[(self.head + self.len - 1) % self.slots.len()])
        }
    }

    pub fn to_polyline(&self) -> Polyline {
        self.iter().collect()
    }
}

/// One satellite. Parameters are fixed at creation; only the trail changes.
#[derive(Clone, Debug)]
pub struct OrbitBody {
    pub orbit_radius: f32,
    pub orbit_tilt: f32,
    pub angular_speed: f32,
    pub phase_offset: f32,
    pub size: f32,
    pub color: Rgb,
    pub trail: TrailBuffer,
}

impl OrbitBody {
    /// Draw randomized orbit parameters from `rng`
    pub fn random<R: Rng + ?Sized>(index: usize, trail_len: usize, rng: &mut R) -> Self {
        Self {
            orbit_radius: rng.gen_range(2.5..3.0),
            orbit_tilt: rng.gen_range(-FRAC_PI_4..FRAC_PI_4),
            angular_speed: rng.gen_range(0.1..0.2),
            phase_offset: rng.gen_range(0.0..TAU),
            size: rng.gen_range(0.008..0.014),
            color: SATELLITE_PALETTE[index % SATELLITE_PALETTE.len()],
            trail: TrailBuffer::new(trail_len),
        }
    }

    /// Position at `elapsed` seconds. Pure; does not touch the trail.
    pub fn position_at(&self, elapsed: f32) -> SpatialPoint {
        let angle = self.phase_offset + elapsed * self.angular_speed;
        let (sin_a, cos_a) = angle.sin_cos();
        Vec3::new(
            self.orbit_radius * cos_a,
            self.orbit_radius * sin_a * self.orbit_tilt.sin() * TILT_SQUASH,
            self.orbit_radius * sin_a,
        )
    }

    /// Advance to `elapsed`, recording the new position in the trail
    pub fn step(&mut self, elapsed: f32) -> SpatialPoint {
        let p = self.position_at(elapsed);
        self.trail.push(p);
        p
    }
}

/// Renderable state of one satellite for a frame
#[derive(Clone, Debug, Serialize)]
pub struct SatelliteFrame {
    pub position: SpatialPoint,
    pub size: f32,
    pub color: Rgb,
    /// Present once the trail holds more than two samples
    pub trail: Option<Polyline>,
}

/// All satellites, owned by the engine and stepped once per frame
pub struct OrbitSimulator {
    bodies: Vec<OrbitBody>,
}

impl OrbitSimulator {
    pub fn new<R: Rng + ?Sized>(count: usize, trail_len: usize, rng: &mut R) -> Self {
        let bodies = (0..count).map(|i| OrbitBody::random(i, trail_len, rng)).collect();
        Self { bodies }
    }

    pub fn bodies(&self) -> &[OrbitBody] {
        &self.bodies
    }

    pub fn step(&mut self, elapsed: f32) -> Vec<SatelliteFrame> {
        self.bodies
            .iter_mut()
            .map(|body| {
                let position = body.step(elapsed);
                let trail = (body.trail.len() > 2).then(|| body.trail.to_polyline());
                SatelliteFrame { position, size: body.size, color: body.color, trail }
            })
            .collect()
    }
}
