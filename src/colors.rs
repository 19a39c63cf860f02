use crossterm::style::Color;
use serde::{Deserialize, Serialize};

/// Linear RGB colour with components in 0.0..=1.0
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from 8-bit channels (e.g. a `#00ffaa` hex literal split into bytes)
    pub const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Component-wise linear interpolation, `t` in 0.0..=1.0
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Scale brightness, used to fold opacity into terminal colours
    pub fn dim(self, factor: f32) -> Rgb {
        let f = factor.clamp(0.0, 1.0);
        Rgb { r: self.r * f, g: self.g * f, b: self.b * f }
    }

    pub fn to_terminal(self) -> Color {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::Rgb { r: q(self.r), g: q(self.g), b: q(self.b) }
    }
}

/// Flow arc palette: cyan-green, blue, purple, orange
pub const FLOW_PALETTE: [Rgb; 4] = [
    Rgb::from_u8(0x00, 0xff, 0xaa),
    Rgb::from_u8(0x4a, 0x9a, 0xff),
    Rgb::from_u8(0xa8, 0x55, 0xf7),
    Rgb::from_u8(0xf9, 0x73, 0x16),
];

pub const SATELLITE_PALETTE: [Rgb; 4] = [
    Rgb::from_u8(0x00, 0xff, 0xaa),
    Rgb::from_u8(0x4a, 0x9a, 0xff),
    Rgb::from_u8(0x1a, 0x5a, 0x9a),
    Rgb::from_u8(0xa3, 0x71, 0xf7),
];

pub const MARKER: Rgb = Rgb::from_u8(0x00, 0xff, 0xaa);
pub const CONTINENT: Rgb = Rgb::from_u8(0x2a, 0x7a, 0xcc);
pub const ISLAND: Rgb = Rgb::from_u8(0x5a, 0xba, 0xff);
pub const GRID: Rgb = Rgb::from_u8(0x1a, 0x4a, 0x6a);

/// Star dust tint endpoints, blended per particle
pub const DUST_NEAR: Rgb = Rgb::new(0.2, 0.5, 0.8);
pub const DUST_FAR: Rgb = Rgb::new(0.5, 0.8, 1.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_hits_endpoints() {
        assert_eq!(DUST_NEAR.lerp(DUST_FAR, 0.0), DUST_NEAR);
        let end = DUST_NEAR.lerp(DUST_FAR, 1.0);
        assert!((end.r - 0.5).abs() < 1e-6);
        assert!((end.g - 0.8).abs() < 1e-6);
        assert!((end.b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn from_u8_round_trips_through_terminal_colour() {
        assert_eq!(
            FLOW_PALETTE[3].to_terminal(),
            Color::Rgb { r: 0xf9, g: 0x73, b: 0x16 }
        );
    }

    #[test]
    fn dim_clamps_factor() {
        assert_eq!(MARKER.dim(2.0), MARKER);
        assert_eq!(MARKER.dim(-1.0), Rgb::new(0.0, 0.0, 0.0));
    }
}
