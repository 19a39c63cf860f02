use crate::config::EngineConfig;
use crate::error::Result;
use crate::feed::Since;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub feed: FeedSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub language: Option<String>,
    pub since: Since,
    pub refresh_secs: u64,
    pub records_file: Option<PathBuf>,  // Local JSON snapshot used instead of the network
    pub token: Option<String>,          // GitHub token, raises the search rate limit
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            language: None,
            since: Since::Daily,
            refresh_secs: 300,
            records_file: None,
            token: None,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Read settings from `path`, falling back to defaults if it is missing or malformed
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                Self::default()
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read settings");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trendglobe")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let s = Settings::load_from(Path::new("/nonexistent/trendglobe/config.toml"));
        assert_eq!(s.engine, EngineConfig::default());
        assert_eq!(s.feed.refresh_secs, 300);
    }

    #[test]
    fn parses_both_tables() {
        let s = Settings::parse(
            "[engine]\nsatellite_count = 2\n\n[feed]\nlanguage = \"rust\"\nsince = \"weekly\"\n",
        )
        .unwrap();
        assert_eq!(s.engine.satellite_count, 2);
        assert_eq!(s.engine.dust_count, 300);
        assert_eq!(s.feed.language.as_deref(), Some("rust"));
        assert_eq!(s.feed.since, Since::Weekly);
    }

    #[test]
    fn parse_reports_settings_error() {
        let err = Settings::parse("[feed]\nsince = \"hourly\"").unwrap_err();
        assert!(matches!(err, crate::error::GlobeError::Settings(_)));
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = std::env::temp_dir().join(format!("trendglobe-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[engine\nnot toml").unwrap();
        let s = Settings::load_from(&path);
        assert_eq!(s.engine, EngineConfig::default());
        let _ = fs::remove_dir_all(&dir);
    }
}
