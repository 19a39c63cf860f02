//! Error types for the globe engine and its input boundary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlobeError>;

#[derive(Error, Debug)]
pub enum GlobeError {
    /// The arc control point has no direction (endpoints are antipodal)
    #[error("degenerate arc from {from} to {to}")]
    DegenerateArc { from: String, to: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("settings error: {0}")]
    Settings(String),
}

impl From<ureq::Error> for GlobeError {
    fn from(e: ureq::Error) -> Self {
        GlobeError::Http(e.to_string())
    }
}

impl From<toml::de::Error> for GlobeError {
    fn from(e: toml::de::Error) -> Self {
        GlobeError::Settings(e.to_string())
    }
}
