//! Mapping trending-repository records onto city markers and flow arcs
//!
//! The assignment is stylistic: records carry no geography, so cities are
//! picked by rank and record position alone.

use crate::colors::{Rgb, FLOW_PALETTE};
use crate::tables::City;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of records turned into flows
pub const FLOW_CAP: usize = 10;

/// Seconds between successive flows' breathing phases
pub const FLOW_PHASE_STEP: f32 = 0.8;

/// Lowest activity a ranked city can drop to while any records exist
const ACTIVITY_FLOOR: f32 = 0.3;
const ACTIVITY_FALLOFF: f32 = 0.02;
const REPO_SHARE: f32 = 0.3;

/// Offset between a flow's start city and end city in the table
const FLOW_CITY_STRIDE: usize = 5;

const LABEL_NAME_CHARS: usize = 12;

/// One trending repository as delivered by the feed
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub rank: u32,
    #[serde(alias = "username")]
    pub owner: String,
    #[serde(alias = "repositoryName")]
    pub name: String,
    pub url: String,
    pub description: String,
    pub language: String,
    #[serde(alias = "totalStars")]
    pub total_stars: u64,
    pub forks: u64,
    #[serde(alias = "starsSince")]
    pub star_delta: i64,
    pub since: String,
}

impl Record {
    pub fn identifier(&self) -> String {
        if self.owner.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.owner, self.name)
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MarkerEntity {
    pub city: City,
    /// Rank index of the city in the reference table
    pub rank: usize,
    pub activity: f32,
    pub repo_count: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct FlowEntity {
    pub start_city: City,
    pub end_city: City,
    pub color_index: usize,
    pub color: Rgb,
    pub magnitude: i64,
    pub label: String,
    pub phase_offset: f32,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Composition {
    pub markers: Vec<MarkerEntity>,
    pub flows: Vec<FlowEntity>,
}

/// Activity of the city at `rank`; monotonically non-increasing in rank
pub fn rank_activity(rank: usize) -> f32 {
    (1.0 - rank as f32 * ACTIVITY_FALLOFF).max(ACTIVITY_FLOOR)
}

pub fn flow_label(name: &str, magnitude: i64) -> String {
    let short: String = name.chars().take(LABEL_NAME_CHARS).collect();
    format!("{short} +{magnitude}★")
}

/// Compose markers and flows with the default flow cap
pub fn compose(records: &[Record], cities: &[City]) -> Composition {
    compose_capped(records, cities, FLOW_CAP, FLOW_PHASE_STEP)
}

/// Derive one marker per city and one flow per leading record.
///
/// Markers depend only on city rank and the record count. Flow `idx` runs from
/// `cities[idx % n]` to `cities[(idx + 5) % n]` with colour `idx % 4`.
pub fn compose_capped(records: &[Record], cities: &[City], flow_cap: usize, flow_phase_step: f32) -> Composition {
    let total = records.len();
    let markers = cities
        .iter()
        .enumerate()
        .map(|(rank, city)| {
            let base = rank_activity(rank);
            MarkerEntity {
                city: *city,
                rank,
                activity: if total > 0 { base } else { 0.0 },
                repo_count: (total as f32 * base * REPO_SHARE).floor() as u32,
            }
        })
        .collect();

    let flows = if cities.is_empty() {
        Vec::new()
    } else {
        records
            .iter()
            .take(flow_cap)
            .enumerate()
            .map(|(idx, record)| {
                let color_index = idx % FLOW_PALETTE.len();
                FlowEntity {
                    start_city: cities[idx % cities.len()],
                    end_city: cities[(idx + FLOW_CITY_STRIDE) % cities.len()],
                    color_index,
                    color: FLOW_PALETTE[color_index],
                    magnitude: record.star_delta,
                    label: flow_label(&record.name, record.star_delta),
                    phase_offset: idx as f32 * flow_phase_step,
                }
            })
            .collect()
    };

    Composition { markers, flows }
}

/// Count of records per non-empty language
pub fn language_stats(records: &[Record]) -> BTreeMap<String, usize> {
    let mut stats = BTreeMap::new();
    for r in records.iter().filter(|r| !r.language.is_empty()) {
        *stats.entry(r.language.clone()).or_insert(0) += 1;
    }
    stats
}

/// The current record snapshot.
///
/// Snapshots are replaced whole; a reader holding the previous `Arc` keeps a
/// consistent view. The generation counter tells the engine when to recompose.
#[derive(Clone, Debug)]
pub struct RecordSlot {
    records: Arc<[Record]>,
    generation: u64,
}

impl Default for RecordSlot {
    fn default() -> Self {
        Self { records: Arc::from(Vec::new()), generation: 0 }
    }
}

impl RecordSlot {
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = Arc::from(records);
        self.generation += 1;
        debug!(generation = self.generation, count = self.records.len(), "record snapshot replaced");
    }

    pub fn snapshot(&self) -> Arc<[Record]> {
        Arc::clone(&self.records)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
