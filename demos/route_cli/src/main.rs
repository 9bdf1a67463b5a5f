//! route_cli — query the hazard-aware road router from the command line.
//!
//! Loads a GeoJSON road file once, answers one query, and prints the result
//! as JSON on stdout.  Logs go to stderr; set `RUST_LOG=debug` to see snapping
//! and hazard details.
//!
//! ```text
//! route_cli --roads roads.geojson route   --from -88.04,30.69 --to -88.03,30.70
//! route_cli --roads roads.geojson route-k --from -88.04,30.69 --to -88.03,30.70 \
//!           --hazard fire.geojson --k 3 --hard-block
//! ```
//!
//! When `route-k` finds no route the output carries
//! `"fallback_required": true` so the caller can switch to its own detour
//! strategy.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use ev_core::{LngLat, RouterConfig};
use ev_engine::{Hazard, RoadRouter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Hazard-aware road routing over a GeoJSON network")]
struct Cli {
    /// GeoJSON file of road line features.
    #[arg(long)]
    roads: PathBuf,

    /// JSON router configuration; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Best single route (hazard applied as a soft penalty).
    Route {
        #[command(flatten)]
        ends: Endpoints,
    },
    /// Up to k distinct routes, cheapest first.
    RouteK {
        #[command(flatten)]
        ends: Endpoints,
        /// Number of routes to return.
        #[arg(long, default_value_t = 3)]
        k: usize,
        /// Remove roads crossing the hazard instead of penalizing them.
        #[arg(long)]
        hard_block: bool,
    },
}

#[derive(clap::Args, Debug)]
struct Endpoints {
    /// Start as `lng,lat`.
    #[arg(long, value_parser = parse_lnglat, allow_hyphen_values = true)]
    from: LngLat,
    /// Destination as `lng,lat`.
    #[arg(long, value_parser = parse_lnglat, allow_hyphen_values = true)]
    to: LngLat,
    /// GeoJSON file whose first Polygon/MultiPolygon is the hazard.
    #[arg(long)]
    hazard: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => read_config(path)?,
        None => RouterConfig::default(),
    };
    let router = RoadRouter::new(&cli.roads, config).context("invalid router configuration")?;

    let t0 = Instant::now();
    router
        .load()
        .with_context(|| format!("failed to load roads from {}", cli.roads.display()))?;
    eprintln!("network loaded in {:.2?}", t0.elapsed());

    let output = match cli.command {
        Command::Route { ends } => {
            let hazard = read_hazard(ends.hazard.as_deref())?;
            let response = router.route(ends.from, ends.to, hazard.as_ref())?;
            serde_json::to_value(&response)?
        }
        Command::RouteK { ends, k, hard_block } => {
            let hazard = read_hazard(ends.hazard.as_deref())?;
            let set = router.route_k(ends.from, ends.to, hazard.as_ref(), k, hard_block)?;
            let mut value = serde_json::to_value(&set)?;
            value["fallback_required"] = json!(set.is_empty());
            value
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // `init` also forwards `log` records from the library crates.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_lnglat(s: &str) -> Result<LngLat, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("expected lng,lat: {e}"))?;
    LngLat::try_from_slice(&values).map_err(|e| e.to_string())
}

fn read_config(path: &Path) -> Result<RouterConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

fn read_hazard(path: Option<&Path>) -> Result<Option<Hazard>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read hazard {}", path.display()))?;
    let hazard = Hazard::from_geojson_str(&text)
        .with_context(|| format!("failed to parse hazard {}", path.display()))?
        .with_context(|| format!("{} contains no Polygon or MultiPolygon", path.display()))?;
    Ok(Some(hazard))
}
