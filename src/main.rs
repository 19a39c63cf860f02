use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{KeyCode, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trendglobe::feed::{self, FeedQuery, FeedSource, RecordFeed, Since};
use trendglobe::render::{self, View};
use trendglobe::settings::Settings;
use trendglobe::tables::CITIES;
use trendglobe::terminal::Terminal;
use trendglobe::Engine;

#[derive(Parser)]
#[command(name = "trendglobe")]
#[command(version)]
#[command(about = "Rotating terminal globe of trending GitHub repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive globe
    View {
        /// JSON file of records to show instead of fetching
        #[arg(short, long)]
        records: Option<PathBuf>,

        /// Fetch trending repositories from GitHub
        #[arg(short, long)]
        fetch: bool,

        /// Restrict fetched repositories to one language
        #[arg(short, long)]
        language: Option<String>,

        /// Trending window for fetches
        #[arg(long, value_enum)]
        since: Option<Since>,

        /// Random seed for satellites and star dust
        #[arg(short, long)]
        seed: Option<u64>,

        /// Target frames per second
        #[arg(long, default_value = "30")]
        fps: u32,
    },

    /// Print a single frame as JSON
    Dump {
        /// JSON file of records
        #[arg(short, long)]
        records: Option<PathBuf>,

        /// Elapsed seconds at which to sample the frame
        #[arg(short, long, default_value = "0")]
        time: f32,

        /// Random seed for satellites and star dust
        #[arg(short, long, default_value = "0")]
        seed: u64,
    },

    /// List the city table
    Cities,
}

const HELP: &str = "q quit | space pause | +/- zoom | up/down tilt | l labels | r refresh";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Commands::View { records, fetch, language, since, seed, fps } => {
            let source = if fetch {
                FeedSource::GitHub(FeedQuery {
                    language: language.or(settings.feed.language.clone()),
                    since: since.unwrap_or(settings.feed.since),
                    token: settings.feed.token.clone(),
                })
            } else if let Some(path) = records.or(settings.feed.records_file.clone()) {
                FeedSource::File(path)
            } else {
                anyhow::bail!("nothing to show: pass --records <file> or --fetch");
            };
            let rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            run_view(settings, source, rng, fps)?;
        }
        Commands::Dump { records, time, seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut engine = Engine::new(settings.engine, &mut rng);
            if let Some(path) = records {
                let loaded = feed::load_records(&path)
                    .with_context(|| format!("loading records from {}", path.display()))?;
                engine.replace_records(loaded);
            }
            let frame = engine.tick(time);
            let mut out = io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, &frame).context("serializing frame")?;
            writeln!(out)?;
        }
        Commands::Cities => {
            for city in CITIES.iter() {
                println!("{:<14} {:>8.2} {:>8.2}  {}", city.name, city.geo.lat, city.geo.lng, city.country);
            }
        }
    }

    Ok(())
}

/// Most common languages as `Rust 4, Go 2 | `, empty when there are none
fn language_summary(stats: &BTreeMap<String, usize>, top: usize) -> String {
    let mut ranked: Vec<(&String, &usize)> = stats.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let parts: Vec<String> = ranked
        .into_iter()
        .take(top)
        .map(|(lang, n)| format!("{lang} {n}"))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("{} | ", parts.join(", "))
    }
}

fn run_view(settings: Settings, source: FeedSource, mut rng: StdRng, fps: u32) -> Result<()> {
    let frame_time = 1.0 / fps.clamp(1, 120) as f32;
    let refresh = Duration::from_secs(settings.feed.refresh_secs.max(10));

    let mut engine = Engine::new(settings.engine, &mut rng);
    let mut feed = RecordFeed::new(source);
    feed.request();
    let mut last_request = Instant::now();

    let mut term = Terminal::new(true).context("initializing terminal")?;
    term.clear_screen()?;

    let mut languages = String::new();
    let mut view = View::default();
    let mut paused = false;
    let started = Instant::now();
    let mut paused_for = Duration::ZERO;
    let mut paused_at: Option<Instant> = None;

    loop {
        if let Some((code, mods)) = term.check_key()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('c') if mods.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char(' ') => {
                    paused = !paused;
                    match paused_at.take() {
                        Some(at) => paused_for += at.elapsed(),
                        None => paused_at = Some(Instant::now()),
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    view.tilt = (view.tilt + 0.05).min(std::f32::consts::FRAC_PI_2);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    view.tilt = (view.tilt - 0.05).max(-std::f32::consts::FRAC_PI_2);
                }
                KeyCode::Char('+') | KeyCode::Char('=') => view.zoom = (view.zoom * 1.2).min(3.0),
                KeyCode::Char('-') | KeyCode::Char('_') => view.zoom = (view.zoom / 1.2).max(0.3),
                KeyCode::Char('0') => view.zoom = 1.0,
                KeyCode::Char('l') => view.labels = !view.labels,
                KeyCode::Char('r') => {
                    feed.request();
                    last_request = Instant::now();
                }
                _ => {}
            }
        }

        if last_request.elapsed() >= refresh {
            feed.request();
            last_request = Instant::now();
        }
        if let Some(records) = feed.poll() {
            info!(count = records.len(), "new record snapshot");
            engine.replace_records(records);
            languages = language_summary(&engine.language_stats(), 3);
        }

        if paused {
            term.sleep(0.1);
            continue;
        }

        let (w, h) = crossterm::terminal::size().unwrap_or(term.size());
        if (w, h) != term.size() {
            term.resize(w, h);
            term.clear_screen()?;
        }

        let elapsed = (started.elapsed() - paused_for).as_secs_f32();
        let frame = engine.tick(elapsed);
        let status = format!(
            " {} repos | {} flows | {}{}",
            engine.records().len(),
            frame.flows.len(),
            languages,
            HELP
        );
        render::draw(&frame, &view, &mut term, &status);
        term.present()?;
        term.sleep(frame_time);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_summary_ranks_by_count() {
        let mut stats = BTreeMap::new();
        stats.insert("Go".to_string(), 2);
        stats.insert("Rust".to_string(), 4);
        stats.insert("C".to_string(), 2);
        stats.insert("Zig".to_string(), 1);
        assert_eq!(language_summary(&stats, 3), "Rust 4, C 2, Go 2 | ");
        assert_eq!(language_summary(&BTreeMap::new(), 3), "");
    }
}
