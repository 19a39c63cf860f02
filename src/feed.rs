//! Record input: local JSON snapshots and the GitHub search API
//!
//! Fetches run on a background thread. Results come back over a channel and
//! the newest request always wins; anything it superseded is dropped.

use crate::error::{GlobeError, Result};
use crate::scene::Record;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

const SEARCH_URL: &str = "https://api.github.com/search/repositories";
const PER_PAGE: u32 = 30;
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Share of total stars credited as recent growth; the search API has no trend data
const STAR_DELTA_SHARE: f64 = 0.1;

/// Trending window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Since {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Since {
    pub fn days(self) -> i64 {
        match self {
            Since::Daily => 1,
            Since::Weekly => 7,
            Since::Monthly => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Since::Daily => "daily",
            Since::Weekly => "weekly",
            Since::Monthly => "monthly",
        }
    }

    /// First day of the window ending `today`
    pub fn window_start(self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.days())
    }
}

#[derive(Clone, Debug, Default)]
pub struct FeedQuery {
    pub language: Option<String>,
    pub since: Since,
    pub token: Option<String>,
}

impl FeedQuery {
    /// GitHub search expression for repositories created inside the window
    pub fn search_expression(&self, today: NaiveDate) -> String {
        let mut q = format!("created:>{}", self.since.window_start(today).format("%Y-%m-%d"));
        if let Some(lang) = self.language.as_deref().filter(|l| !l.is_empty()) {
            q.push_str(" language:");
            q.push_str(lang);
        }
        q
    }

    pub fn url(&self, today: NaiveDate) -> String {
        format!(
            "{}?q={}&sort=stars&order=desc&per_page={}",
            SEARCH_URL,
            urlencoding::encode(&self.search_expression(today)),
            PER_PAGE
        )
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    name: String,
    html_url: String,
    description: Option<String>,
    language: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
    owner: SearchOwner,
}

#[derive(Deserialize)]
struct SearchOwner {
    login: String,
}

fn into_records(items: Vec<SearchItem>, since: Since) -> Vec<Record> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| Record {
            rank: i as u32 + 1,
            owner: item.owner.login,
            name: item.name,
            url: item.html_url,
            description: item.description.unwrap_or_default(),
            language: item.language.unwrap_or_default(),
            total_stars: item.stargazers_count,
            forks: item.forks_count,
            star_delta: (item.stargazers_count as f64 * STAR_DELTA_SHARE).floor() as i64,
            since: since.label().to_string(),
        })
        .collect()
}

/// Parse a GitHub search response body into records
pub fn parse_search_response(body: &str, since: Since) -> Result<Vec<Record>> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    Ok(into_records(resp.items, since))
}

/// Query GitHub for the most-starred repositories created in the window
pub fn fetch_trending(query: &FeedQuery) -> Result<Vec<Record>> {
    let url = query.url(Utc::now().date_naive());
    debug!(%url, "fetching trending repositories");

    let mut req = ureq::get(&url)
        .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
        .set("Accept", "application/vnd.github+json")
        .set("User-Agent", concat!("trendglobe/", env!("CARGO_PKG_VERSION")));
    if let Some(token) = query.token.as_deref() {
        req = req.set("Authorization", &format!("Bearer {token}"));
    }

    let resp: SearchResponse = req
        .call()?
        .into_json()
        .map_err(|e| GlobeError::Http(e.to_string()))?;
    Ok(into_records(resp.items, query.since))
}

/// Load a JSON array of records
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[derive(Clone, Debug)]
pub enum FeedSource {
    File(PathBuf),
    GitHub(FeedQuery),
}

impl FeedSource {
    pub fn load(&self) -> Result<Vec<Record>> {
        match self {
            FeedSource::File(path) => load_records(path),
            FeedSource::GitHub(query) => fetch_trending(query),
        }
    }
}

/// Background loader delivering whole record snapshots.
///
/// Each [`request`](RecordFeed::request) cancels the one before it, and
/// [`poll`](RecordFeed::poll) only ever hands back the newest result.
pub struct RecordFeed {
    source: FeedSource,
    cancel_flag: Arc<AtomicBool>,
    next_seq: u64,
    delivered_seq: u64,
    receiver: Receiver<(u64, Vec<Record>)>,
    sender: Sender<(u64, Vec<Record>)>,
}

impl RecordFeed {
    pub fn new(source: FeedSource) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            cancel_flag: Arc::new(AtomicBool::new(false)),
            next_seq: 0,
            delivered_seq: 0,
            receiver: rx,
            sender: tx,
        }
    }

    /// Start a fetch (non-blocking)
    pub fn request(&mut self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
        self.cancel_flag = Arc::new(AtomicBool::new(false));

        self.next_seq += 1;
        let seq = self.next_seq;
        let source = self.source.clone();
        let tx = self.sender.clone();
        let cancel = self.cancel_flag.clone();

        thread::spawn(move || match source.load() {
            Ok(records) => {
                if !cancel.load(Ordering::Relaxed) {
                    info!(count = records.len(), "records loaded");
                    let _ = tx.send((seq, records));
                }
            }
            Err(e) => warn!(error = %e, "record fetch failed, keeping previous snapshot"),
        });
    }

    /// Newest completed snapshot since the last poll, if any
    pub fn poll(&mut self) -> Option<Vec<Record>> {
        let mut newest: Option<(u64, Vec<Record>)> = None;
        loop {
            match self.receiver.try_recv() {
                Ok((seq, records)) => {
                    if seq > self.delivered_seq && newest.as_ref().map_or(true, |(s, _)| seq > *s) {
                        newest = Some((seq, records));
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        let (seq, records) = newest?;
        self.delivered_seq = seq;
        Some(records)
    }

    /// Push a snapshot as if it had been fetched
    #[cfg(test)]
    fn inject(&mut self, records: Vec<Record>) {
        self.next_seq += 1;
        let _ = self.sender.send((self.next_seq, records));
    }
}
