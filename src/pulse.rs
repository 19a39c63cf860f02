//! Concentric expanding rings at a city marker
//!
//! Output is a pure function of elapsed time, so nothing accumulates between frames.

use crate::colors::Rgb;
use crate::geo::SpatialPoint;
use serde::Serialize;

/// Seconds for one ring to grow from scale 1 to 3 and fade out
pub const CYCLE_PERIOD: f32 = 1.5;

pub const LAYER_COUNT: usize = 3;

/// Per-layer head start in seconds
pub const LAYER_DELAY: [f32; LAYER_COUNT] = [0.0, 0.5, 1.0];

pub const LAYER_BASE_OPACITY: [f32; LAYER_COUNT] = [0.6, 0.5, 0.4];

pub const RING_INNER_RADIUS: f32 = 0.02;
pub const RING_OUTER_RADIUS: [f32; LAYER_COUNT] = [0.03, 0.028, 0.026];

/// Static parameters of one marker's pulse
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PulseRing {
    pub anchor: SpatialPoint,
    pub color: Rgb,
    pub phase_offset: f32,
}

/// One animated ring layer
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PulseLayer {
    pub scale: f32,
    pub opacity: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

/// Cycle position in 0.0..1.0 for a given time
#[inline]
pub fn cycle_position(time: f32) -> f32 {
    let t = time.rem_euclid(CYCLE_PERIOD) / CYCLE_PERIOD;
    // rem_euclid can round up to the period itself for tiny negative inputs
    if t >= 1.0 { 0.0 } else { t }
}

impl PulseRing {
    pub fn sample(&self, elapsed: f32) -> [PulseLayer; LAYER_COUNT] {
        std::array::from_fn(|layer| {
            let t = cycle_position(elapsed + self.phase_offset + LAYER_DELAY[layer]);
            PulseLayer {
                scale: 1.0 + 2.0 * t,
                opacity: LAYER_BASE_OPACITY[layer] * (1.0 - t),
                inner_radius: RING_INNER_RADIUS,
                outer_radius: RING_OUTER_RADIUS[layer],
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors;
    use glam::Vec3;

    fn ring(phase_offset: f32) -> PulseRing {
        PulseRing { anchor: Vec3::X * 2.02, color: colors::MARKER, phase_offset }
    }

    #[test]
    fn first_layer_starts_at_unit_scale() {
        let layers = ring(0.0).sample(0.0);
        assert!((layers[0].scale - 1.0).abs() < 1e-6);
        assert!((layers[0].opacity - 0.6).abs() < 1e-6);
    }

    #[test]
    fn opacity_fades_to_zero_at_cycle_end() {
        let layers = ring(0.0).sample(CYCLE_PERIOD - 1e-4);
        assert!(layers[0].opacity < 1e-3);
        assert!((layers[0].scale - 3.0).abs() < 1e-3);
    }

    #[test]
    fn layers_are_staggered() {
        let layers = ring(0.0).sample(0.0);
        // Layer 2 is 0.5s into a 1.5s cycle, layer 3 is 1.0s in
        assert!((layers[1].scale - (1.0 + 2.0 / 3.0)).abs() < 1e-5);
        assert!((layers[2].scale - (1.0 + 4.0 / 3.0)).abs() < 1e-5);
        assert!((layers[2].opacity - 0.4 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn output_depends_only_on_time() {
        let r = ring(0.45);
        let a = r.sample(12.3);
        let _ = r.sample(99.0);
        let b = r.sample(12.3);
        assert_eq!(a, b);
        let c = r.sample(12.3 + CYCLE_PERIOD * 4.0);
        for (x, y) in a.iter().zip(c.iter()) {
            assert!((x.scale - y.scale).abs() < 1e-3);
        }
    }

    #[test]
    fn wraps_without_overshoot() {
        for i in 0..1000 {
            let t = cycle_position(i as f32 * 0.0137 - 3.0);
            assert!((0.0..1.0).contains(&t));
        }
    }
}
