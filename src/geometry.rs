//! Static globe geometry: coastline outlines and the lat/lng grid
//!
//! Built once per radius and cached; never rebuilt per frame.

use crate::config::EngineConfig;
use crate::geo::{project, SpatialPoint};
use crate::tables::{outline_kind, OutlineKind, OUTLINES};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Sample spacing along grid lines, in degrees
pub const GRID_SAMPLE_DEG: f32 = 5.0;

pub type Polyline = Vec<SpatialPoint>;

#[derive(Clone, Debug, Serialize)]
pub struct Outline {
    pub kind: OutlineKind,
    pub points: Polyline,
}

/// Project (lng, lat) polygons to polylines at `radius`, one per polygon.
pub fn build_outline(polygons: &[&[(f32, f32)]], radius: f32) -> Vec<Polyline> {
    polygons
        .iter()
        .map(|poly| {
            poly.iter()
                .map(|&(lng, lat)| project(lat, lng, radius))
                .collect()
        })
        .collect()
}

/// Parallels and meridians at the given spacing, each sampled every 5°.
///
/// Parallels skip the poles (they would collapse to a point). Meridians start
/// at -180° and stop short of 180° since that line duplicates -180°.
pub fn build_grid(lat_step: f32, lng_step: f32, radius: f32) -> Vec<Polyline> {
    let mut lines = Vec::new();

    let lng_samples = (360.0 / GRID_SAMPLE_DEG).round() as usize;
    let half_parallels = (90.0 / lat_step).ceil() as i32 - 1;
    for k in -half_parallels..=half_parallels {
        let lat = k as f32 * lat_step;
        let line: Polyline = (0..=lng_samples)
            .map(|i| project(lat, -180.0 + i as f32 * GRID_SAMPLE_DEG, radius))
            .collect();
        lines.push(line);
    }

    let lat_samples = (180.0 / GRID_SAMPLE_DEG).round() as usize;
    let meridians = (360.0 / lng_step).ceil() as usize;
    for k in 0..meridians {
        let lng = -180.0 + k as f32 * lng_step;
        if lng >= 180.0 {
            break;
        }
        let line: Polyline = (0..=lat_samples)
            .map(|i| project(-90.0 + i as f32 * GRID_SAMPLE_DEG, lng, radius))
            .collect();
        lines.push(line);
    }

    lines
}

/// The static layers of the globe, projected at fixed radii
#[derive(Clone, Debug, Serialize)]
pub struct GlobeGeometry {
    pub outlines: Vec<Outline>,
    pub grid: Vec<Polyline>,
}

impl GlobeGeometry {
    pub fn build(config: &EngineConfig) -> Self {
        let outlines = build_outline(&OUTLINES, config.outline_radius)
            .into_iter()
            .enumerate()
            .map(|(i, points)| Outline { kind: outline_kind(i), points })
            .collect();
        let grid = build_grid(config.grid_lat_step, config.grid_lng_step, config.grid_radius);
        Self { outlines, grid }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct GeometryKey {
    outline_radius: f32,
    grid_radius: f32,
    lat_step: f32,
    lng_step: f32,
}

impl GeometryKey {
    fn of(config: &EngineConfig) -> Self {
        Self {
            outline_radius: config.outline_radius,
            grid_radius: config.grid_radius,
            lat_step: config.grid_lat_step,
            lng_step: config.grid_lng_step,
        }
    }
}

/// Rebuilds [`GlobeGeometry`] only when a radius or grid step changes
#[derive(Default)]
pub struct GeometryCache {
    key: Option<GeometryKey>,
    geometry: Option<Arc<GlobeGeometry>>,
}

impl GeometryCache {
    pub fn get(&mut self, config: &EngineConfig) -> Arc<GlobeGeometry> {
        let key = GeometryKey::of(config);
        match (&self.key, &self.geometry) {
            (Some(k), Some(g)) if *k == key => Arc::clone(g),
            _ => {
                debug!(outline_radius = key.outline_radius, grid_radius = key.grid_radius, "building globe geometry");
                let g = Arc::new(GlobeGeometry::build(config));
                self.key = Some(key);
                self.geometry = Some(Arc::clone(&g));
                g
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_keeps_point_count_and_radius() {
        let lines = build_outline(&OUTLINES, 2.01);
        assert_eq!(lines.len(), OUTLINES.len());
        for (line, poly) in lines.iter().zip(OUTLINES.iter()) {
            assert_eq!(line.len(), poly.len());
            for p in line {
                assert!((p.length() - 2.01).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn default_grid_has_five_parallels_and_twelve_meridians() {
        let grid = build_grid(30.0, 30.0, 2.005);
        assert_eq!(grid.len(), 17);
        for line in &grid[..5] {
            assert_eq!(line.len(), 73);
        }
        for line in &grid[5..] {
            assert_eq!(line.len(), 37);
        }
    }

    #[test]
    fn parallels_stay_at_constant_height() {
        let grid = build_grid(30.0, 30.0, 1.0);
        let equator = &grid[2];
        for p in equator {
            assert!(p.y.abs() < 1e-5);
        }
        let north = &grid[4];
        let expected = 60f32.to_radians().sin();
        for p in north {
            assert!((p.y - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn cache_reuses_until_radius_changes() {
        let mut cache = GeometryCache::default();
        let mut cfg = EngineConfig::default();
        let a = cache.get(&cfg);
        let b = cache.get(&cfg);
        assert!(Arc::ptr_eq(&a, &b));

        cfg.outline_radius = 3.0;
        let c = cache.get(&cfg);
        assert!(!Arc::ptr_eq(&a, &c));
        let p = c.outlines[0].points[0];
        assert!((p.length() - 3.0).abs() < 1e-4);
    }
}
