//! Per-frame driver for the globe scene
//!
//! An [`Engine`] owns every piece of mutable scene state. The caller invokes
//! [`Engine::tick`] once per display refresh with the elapsed time and gets
//! back a [`Frame`] describing everything to draw. Frames are strictly
//! sequential; nothing here blocks or spawns.

use crate::arc::{build_arc, FlowArc};
use crate::colors::{self, Rgb};
use crate::config::EngineConfig;
use crate::geo::SpatialPoint;
use crate::geometry::{GeometryCache, GlobeGeometry};
use crate::orbit::{OrbitSimulator, SatelliteFrame};
use crate::particles::{ParticleField, ParticlePoint};
use crate::pulse::{PulseLayer, PulseRing, LAYER_COUNT};
use crate::scene::{compose_capped, language_stats, Record, RecordSlot};
use crate::tables::{City, CITIES};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

const BREATH_BASE: f32 = 0.3;
const BREATH_AMPLITUDE: f32 = 0.15;
const BREATH_RATE: f32 = 1.5;

/// Flow line opacity at `elapsed`; a pure function of time and phase
#[inline]
pub fn breathing_opacity(elapsed: f32, phase_offset: f32) -> f32 {
    BREATH_BASE + BREATH_AMPLITUDE * (BREATH_RATE * elapsed + phase_offset).sin()
}

struct MarkerSlot {
    name: &'static str,
    activity: f32,
    repo_count: u32,
    label_anchor: SpatialPoint,
    ring: PulseRing,
}

struct FlowSlot {
    label: String,
    color: Rgb,
    phase_offset: f32,
    /// `None` when the arc could not be built; the flow is skipped
    arc: Option<Arc<FlowArc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MarkerFrame {
    pub name: &'static str,
    pub anchor: SpatialPoint,
    pub label_anchor: SpatialPoint,
    pub activity: f32,
    pub repo_count: u32,
    pub color: Rgb,
    pub layers: [PulseLayer; LAYER_COUNT],
}

#[derive(Clone, Debug, Serialize)]
pub struct FlowFrame {
    pub label: String,
    pub label_anchor: SpatialPoint,
    pub color: Rgb,
    pub opacity: f32,
    pub arc: Arc<FlowArc>,
}

/// Everything a display layer needs for one refresh.
///
/// Globe-attached geometry (outlines, grid, markers, flows) is expressed in
/// the globe's own frame; apply `globe_rotation` about +Y to place it. The
/// star dust likewise takes `dust_rotation`. Satellites are in world space.
#[derive(Clone, Debug, Serialize)]
pub struct Frame {
    pub elapsed: f32,
    pub globe_rotation: f32,
    pub cloud_rotation: f32,
    pub cloud_radius: f32,
    pub dust_rotation: f32,
    pub globe_radius: f32,
    pub geometry: Arc<GlobeGeometry>,
    pub markers: Vec<MarkerFrame>,
    pub flows: Vec<FlowFrame>,
    pub satellites: Vec<SatelliteFrame>,
    pub dust: Arc<[ParticlePoint]>,
}

/// The scene context. Independent instances never share state.
pub struct Engine {
    config: EngineConfig,
    cities: Vec<City>,
    geometry: GeometryCache,
    records: RecordSlot,
    composed: Option<u64>,
    markers: Vec<MarkerSlot>,
    flows: Vec<FlowSlot>,
    orbits: OrbitSimulator,
    dust: ParticleField,
    globe_rotation: f32,
    cloud_rotation: f32,
    last_elapsed: f32,
    frames: u64,
}

impl Engine {
    /// Create an engine over the stock city table.
    ///
    /// `rng` seeds the satellite orbits and star dust; pass a seeded generator
    /// for reproducible scenes.
    pub fn new<R: Rng + ?Sized>(config: EngineConfig, rng: &mut R) -> Self {
        Self::with_cities(config, CITIES.to_vec(), rng)
    }

    pub fn with_cities<R: Rng + ?Sized>(config: EngineConfig, cities: Vec<City>, rng: &mut R) -> Self {
        let config = config.sanitized();
        let orbits = OrbitSimulator::new(config.satellite_count, config.trail_len, rng);
        let dust = ParticleField::generate(
            config.dust_count,
            config.dust_inner_radius,
            config.dust_outer_radius,
            config.dust_spin,
            rng,
        );
        Self {
            config,
            cities,
            geometry: GeometryCache::default(),
            records: RecordSlot::default(),
            composed: None,
            markers: Vec::new(),
            flows: Vec::new(),
            orbits,
            dust,
            globe_rotation: 0.0,
            cloud_rotation: 0.0,
            last_elapsed: 0.0,
            frames: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Swap in a new record snapshot. Takes effect on the next tick; if
    /// several arrive between ticks only the last is composed.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.records.replace(records);
    }

    pub fn records(&self) -> Arc<[Record]> {
        self.records.snapshot()
    }

    /// Records per language in the current snapshot
    pub fn language_stats(&self) -> BTreeMap<String, usize> {
        language_stats(&self.records.snapshot())
    }

    pub fn orbits(&self) -> &OrbitSimulator {
        &self.orbits
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Recompose markers and flows if the snapshot changed since last time
    fn refresh(&mut self) {
        let generation = self.records.generation();
        if self.composed == Some(generation) {
            return;
        }
        let snapshot = self.records.snapshot();
        let composition = compose_capped(
            &snapshot,
            &self.cities,
            self.config.flow_cap,
            self.config.flow_phase_step,
        );

        let radius = self.config.marker_radius;
        self.markers = composition
            .markers
            .iter()
            .map(|m| MarkerSlot {
                name: m.city.name,
                activity: m.activity,
                repo_count: m.repo_count,
                label_anchor: m.city.geo.at(self.config.label_radius),
                ring: PulseRing {
                    anchor: m.city.geo.at(radius),
                    color: colors::MARKER,
                    phase_offset: m.rank as f32 * self.config.marker_phase_step,
                },
            })
            .collect();

        self.flows = composition
            .flows
            .iter()
            .map(|f| {
                let arc = match build_arc(f.start_city.geo, f.end_city.geo, radius, self.config.arc_segments) {
                    Ok(arc) => Some(Arc::new(arc)),
                    Err(e) => {
                        warn!(label = %f.label, error = %e, "skipping flow");
                        None
                    }
                };
                FlowSlot {
                    label: f.label.clone(),
                    color: f.color,
                    phase_offset: f.phase_offset,
                    arc,
                }
            })
            .collect();

        debug!(
            generation,
            records = snapshot.len(),
            markers = self.markers.len(),
            flows = self.flows.len(),
            "scene recomposed"
        );
        self.composed = Some(generation);
    }

    /// Advance the scene to `elapsed` seconds and describe it.
    ///
    /// Time never runs backwards: an `elapsed` earlier than the previous tick
    /// is treated as the previous tick's time.
    pub fn tick(&mut self, elapsed: f32) -> Frame {
        self.refresh();

        let elapsed = if elapsed.is_finite() { elapsed.max(self.last_elapsed) } else { self.last_elapsed };
        self.last_elapsed = elapsed;
        self.frames += 1;

        self.globe_rotation = elapsed * self.config.globe_spin;
        self.cloud_rotation = elapsed * self.config.cloud_spin;
        let dust_rotation = self.dust.update(elapsed);

        let markers = self
            .markers
            .iter()
            .filter(|m| m.activity > 0.0)
            .map(|m| MarkerFrame {
                name: m.name,
                anchor: m.ring.anchor,
                label_anchor: m.label_anchor,
                activity: m.activity,
                repo_count: m.repo_count,
                color: m.ring.color,
                layers: m.ring.sample(elapsed),
            })
            .collect();

        let flows = self
            .flows
            .iter()
            .filter_map(|f| {
                let arc = f.arc.as_ref()?;
                Some(FlowFrame {
                    label: f.label.clone(),
                    label_anchor: arc.point_at(0.5),
                    color: f.color,
                    opacity: breathing_opacity(elapsed, f.phase_offset),
                    arc: Arc::clone(arc),
                })
            })
            .collect();

        let satellites = self.orbits.step(elapsed);

        Frame {
            elapsed,
            globe_rotation: self.globe_rotation,
            cloud_rotation: self.cloud_rotation,
            cloud_radius: self.config.cloud_radius,
            dust_rotation,
            globe_radius: self.config.globe_radius,
            geometry: self.geometry.get(&self.config),
            markers,
            flows,
            satellites,
            dust: self.dust.shared(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default(), &mut StdRng::seed_from_u64(11))
    }

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record { name: format!("repo{i}"), star_delta: i as i64, ..Record::default() })
            .collect()
    }

    #[test]
    fn empty_engine_renders_inert_globe() {
        let mut e = engine();
        let f = e.tick(1.0);
        assert!(f.markers.is_empty());
        assert!(f.flows.is_empty());
        assert_eq!(f.satellites.len(), 4);
        assert_eq!(f.dust.len(), 300);
        assert_eq!(f.geometry.grid.len(), 17);
    }

    #[test]
    fn rotations_scale_with_time() {
        let mut e = engine();
        let f = e.tick(50.0);
        assert!((f.globe_rotation - 1.0).abs() < 1e-5);
        assert!((f.cloud_rotation - 0.15).abs() < 1e-5);
        assert!((f.dust_rotation - 0.25).abs() < 1e-5);
        assert!(f.cloud_rotation < f.globe_rotation);
    }

    #[test]
    fn records_light_markers_and_flows() {
        let mut e = engine();
        e.replace_records(records(3));
        let f = e.tick(0.0);
        assert_eq!(f.markers.len(), CITIES.len());
        assert_eq!(f.flows.len(), 3);
        assert_eq!(f.flows[0].arc.points.len(), 81);
        assert!((f.flows[0].opacity - 0.3).abs() < 1e-6);
    }

    #[test]
    fn last_snapshot_between_ticks_wins() {
        let mut e = engine();
        e.replace_records(records(7));
        e.replace_records(records(2));
        let f = e.tick(0.5);
        assert_eq!(f.flows.len(), 2);
        e.replace_records(Vec::new());
        assert!(e.tick(0.6).flows.is_empty());
    }

    #[test]
    fn degenerate_flow_is_skipped_without_dropping_others() {
        let cities = vec![
            City { name: "A", geo: GeoPoint::new(0.0, 0.0), country: "X" },
            City { name: "B", geo: GeoPoint::new(10.0, 20.0), country: "X" },
            City { name: "C", geo: GeoPoint::new(-5.0, 60.0), country: "X" },
            City { name: "D", geo: GeoPoint::new(30.0, -40.0), country: "X" },
            City { name: "E", geo: GeoPoint::new(45.0, 100.0), country: "X" },
            City { name: "F", geo: GeoPoint::new(0.0, 180.0), country: "X" },
        ];
        // Flow 0 runs A -> F, which are antipodal
        let mut e = Engine::with_cities(EngineConfig::default(), cities, &mut StdRng::seed_from_u64(2));
        e.replace_records(records(3));
        let f = e.tick(1.0);
        let labels: Vec<&str> = f.flows.iter().map(|fl| fl.label.as_str()).collect();
        assert_eq!(labels, vec!["repo1 +1★", "repo2 +2★"]);
        assert_eq!(f.markers.len(), 6);
    }

    #[test]
    fn cloud_shell_follows_config() {
        let cfg = EngineConfig { cloud_radius: 2.4, ..EngineConfig::default() };
        let mut e = Engine::new(cfg, &mut StdRng::seed_from_u64(1));
        let f = e.tick(10.0);
        assert!((f.cloud_radius - 2.4).abs() < f32::EPSILON);
        assert!((f.cloud_rotation - 0.03).abs() < 1e-5);
    }

    #[test]
    fn language_stats_track_current_snapshot() {
        let mut e = engine();
        let mut rs = records(3);
        rs[0].language = "Rust".into();
        rs[1].language = "Rust".into();
        rs[2].language = "Go".into();
        e.replace_records(rs);
        let stats = e.language_stats();
        assert_eq!(stats.get("Rust"), Some(&2));
        assert_eq!(stats.get("Go"), Some(&1));
        e.replace_records(Vec::new());
        assert!(e.language_stats().is_empty());
    }

    #[test]
    fn time_does_not_run_backwards() {
        let mut e = engine();
        e.tick(5.0);
        let f = e.tick(2.0);
        assert!((f.elapsed - 5.0).abs() < f32::EPSILON);
        assert_eq!(e.frame_count(), 2);
    }

    #[test]
    fn trails_grow_to_bound_over_frames() {
        let mut e = engine();
        for i in 0..40 {
            e.tick(i as f32 / 60.0);
        }
        for body in e.orbits().bodies() {
            assert_eq!(body.trail.len(), 30);
        }
    }

    #[test]
    fn static_geometry_is_shared_between_frames() {
        let mut e = engine();
        let a = e.tick(0.0);
        let b = e.tick(0.1);
        assert!(Arc::ptr_eq(&a.geometry, &b.geometry));
        assert!(Arc::ptr_eq(&a.dust, &b.dust));
    }

    #[test]
    fn breathing_stays_in_band() {
        for i in 0..500 {
            let o = breathing_opacity(i as f32 * 0.07, 0.8);
            assert!((0.15 - 1e-6..=0.45 + 1e-6).contains(&o));
        }
    }

    #[test]
    fn frame_serializes_to_json() {
        let mut e = engine();
        e.replace_records(records(2));
        let json = serde_json::to_string(&e.tick(1.0)).unwrap();
        assert!(json.contains("\"globe_rotation\""));
        assert!(json.contains("repo1 +1★"));
    }
}
