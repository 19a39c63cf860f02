use serde::Deserialize;

/// Upper bound on orbit bodies a settings file can request
pub const MAX_SATELLITES: usize = 64;

/// Tunables for scene construction and per-frame animation.
///
/// Every field has a default matching the stock globe; a settings file only
/// needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Radii of the globe layers
    pub globe_radius: f32,
    pub outline_radius: f32,
    pub grid_radius: f32,
    pub marker_radius: f32,
    pub label_radius: f32,
    pub cloud_radius: f32,

    // Grid spacing in degrees
    pub grid_lat_step: f32,
    pub grid_lng_step: f32,

    // Rotation rates in radians per second
    pub globe_spin: f32,
    pub cloud_spin: f32,
    pub dust_spin: f32,

    // Scene composition
    pub flow_cap: usize,
    pub arc_segments: usize,
    pub marker_phase_step: f32,
    pub flow_phase_step: f32,

    // Satellites
    pub satellite_count: usize,
    pub trail_len: usize,

    // Star dust
    pub dust_count: usize,
    pub dust_inner_radius: f32,
    pub dust_outer_radius: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            globe_radius: 2.0,
            outline_radius: 2.01,
            grid_radius: 2.005,
            marker_radius: 2.02,
            label_radius: 2.15,
            cloud_radius: 2.01,
            grid_lat_step: 30.0,
            grid_lng_step: 30.0,
            globe_spin: 0.02,
            cloud_spin: 0.003,
            dust_spin: 0.005,
            flow_cap: 10,
            arc_segments: 80,
            marker_phase_step: 0.15,
            flow_phase_step: 0.8,
            satellite_count: 4,
            trail_len: 30,
            dust_count: 300,
            dust_inner_radius: 5.0,
            dust_outer_radius: 13.0,
        }
    }
}

impl EngineConfig {
    /// Clamp values that would make geometry degenerate or allocation unbounded
    pub fn sanitized(mut self) -> Self {
        self.grid_lat_step = self.grid_lat_step.max(1.0);
        self.grid_lng_step = self.grid_lng_step.max(1.0);
        self.arc_segments = self.arc_segments.max(1);
        self.trail_len = self.trail_len.clamp(1, 1024);
        self.satellite_count = self.satellite_count.min(MAX_SATELLITES);
        self.dust_count = self.dust_count.min(100_000);
        if self.dust_outer_radius <= self.dust_inner_radius {
            self.dust_outer_radius = self.dust_inner_radius + 1.0;
        }
        self
    }
}
