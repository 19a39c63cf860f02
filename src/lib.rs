//! Projection and animation engine for a rotating globe of trending repositories.
//!
//! [`Engine`] turns a snapshot of [`Record`]s plus elapsed time into a
//! [`Frame`]: globe geometry, pulsing city markers, arcs between cities,
//! orbiting satellites with trails and a shell of star dust. The terminal
//! front end in [`render`] is one consumer of those frames.

pub mod arc;
pub mod colors;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod geo;
pub mod geometry;
pub mod orbit;
pub mod particles;
pub mod pulse;
pub mod render;
pub mod scene;
pub mod settings;
pub mod tables;
pub mod terminal;

pub use config::EngineConfig;
pub use engine::{Engine, Frame};
pub use error::{GlobeError, Result};
pub use geo::{project, GeoPoint, SpatialPoint};
pub use scene::{compose, Record};
