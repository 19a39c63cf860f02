//! Background star dust: a fixed point cloud spun as one rigid body

use crate::colors::{Rgb, DUST_FAR, DUST_NEAR};
use crate::geo::SpatialPoint;
use glam::Vec3;
use rand::Rng;
use serde::Serialize;
use std::f32::consts::TAU;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ParticlePoint {
    pub position: SpatialPoint,
    pub tint: Rgb,
}

pub struct ParticleField {
    points: Arc<[ParticlePoint]>,
    spin: f32,
    rotation: f32,
}

impl ParticleField {
    /// Scatter `count` points through the shell `inner..outer`.
    ///
    /// Polar angle is drawn as `acos(2u - 1)` so points do not bunch at the poles.
    pub fn generate<R: Rng + ?Sized>(count: usize, inner: f32, outer: f32, spin: f32, rng: &mut R) -> Self {
        let points: Vec<ParticlePoint> = (0..count)
            .map(|_| {
                let r = if outer > inner { rng.gen_range(inner..outer) } else { inner };
                let azimuth = rng.gen_range(0.0..TAU);
                let polar = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
                let (sin_p, cos_p) = polar.sin_cos();
                let position = Vec3::new(
                    r * sin_p * azimuth.cos(),
                    r * sin_p * azimuth.sin(),
                    r * cos_p,
                );
                let tint = DUST_NEAR.lerp(DUST_FAR, rng.gen::<f32>());
                ParticlePoint { position, tint }
            })
            .collect();
        Self { points: Arc::from(points), spin, rotation: 0.0 }
    }

    pub fn points(&self) -> &[ParticlePoint] {
        &self.points
    }

    /// Cheap handle to the point set for handing to a frame
    pub fn shared(&self) -> Arc<[ParticlePoint]> {
        Arc::clone(&self.points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Set the field's rotation about the vertical axis for `elapsed` seconds
    pub fn update(&mut self, elapsed: f32) -> f32 {
        self.rotation = elapsed * self.spin;
        self.rotation
    }
}
