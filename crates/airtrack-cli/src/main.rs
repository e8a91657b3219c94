// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Airtrack contributors

use airtrack_core::{
    flight_arc, geodesic_circle, haversine_km, Airport, AirportApi, AppConfig,
    AutocompleteSession, HttpAirportApi, Point, RadiusSearch,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the airport API (overrides the config file)
    #[arg(long, env = "AIRTRACK_API", global = true)]
    api: Option<String>,

    /// Path to config.json (defaults to the platform config directory)
    #[arg(long, env = "AIRTRACK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up airports by name, city or code
    Search { query: String },
    /// List airports within a radius of an airport or coordinate
    Nearby {
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        icao: Option<String>,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Radius in km (clamped to the configured bounds)
        #[arg(short, long)]
        radius: Option<f64>,
    },
    /// Print the radius ring around a coordinate
    Circle {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(short, long)]
        radius: f64,
    },
    /// Print the curved display line between two coordinates
    Arc {
        /// Start as LAT,LON
        #[arg(allow_hyphen_values = true)]
        from: Point,
        /// End as LAT,LON
        #[arg(allow_hyphen_values = true)]
        to: Point,
    },
    /// Build the map scene around an airport and print it as GeoJSON
    Scene {
        icao: String,
        #[arg(short, long)]
        radius: Option<f64>,
    },
    /// Interactive autocomplete: each stdin line replaces the query, `:N` picks item N
    Live,
    /// Show the effective configuration
    Config {
        /// Write it to the config path
        #[arg(long)]
        write: bool,
    },
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<(AppConfig, PathBuf)> {
    let (mut config, path) = match &cli.config {
        Some(path) => (AppConfig::load_from(path)?, path.clone()),
        None => (AppConfig::load()?, AppConfig::default_path()),
    };
    if let Some(api) = &cli.api {
        config.api_base_url = api.clone();
    }
    Ok((config, path))
}

fn print_airport(airport: &Airport, distance_km: Option<f64>) {
    let place = match (airport.city.is_empty(), airport.country.is_empty()) {
        (false, false) => format!("{}, {}", airport.city, airport.country),
        (false, true) => airport.city.clone(),
        (true, false) => airport.country.clone(),
        (true, true) => String::new(),
    };
    match distance_km {
        Some(d) => println!("{:<6} {:<40} {:<30} {:>8.1} km", airport.icao, airport.name, place, d),
        None => println!("{:<6} {:<40} {}", airport.icao, airport.name, place),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let (config, config_path) = load_config(&cli)?;
    debug!(
        "Using config; path={} api={}",
        config_path.display(),
        config.api_base_url
    );

    let api = || -> Result<Arc<HttpAirportApi>> {
        let api = HttpAirportApi::new(&config.api_base_url, config.request_timeout())
            .context("Failed to build HTTP client")?;
        Ok(Arc::new(api))
    };

    match &cli.command {
        Commands::Search { query } => {
            let query = query.trim();
            if query.chars().count() < config.min_query_len {
                debug!("Query shorter than {} characters; skipping lookup", config.min_query_len);
                return Ok(());
            }
            let results = api()?.autocomplete(query).await?;
            if results.is_empty() {
                println!("No airports matching '{}'", query);
            }
            for airport in &results {
                print_airport(airport, None);
            }
        }
        Commands::Nearby {
            icao,
            lat,
            lon,
            radius,
        } => {
            let api = api()?;
            let center = match (icao, lat, lon) {
                (Some(icao), _, _) => {
                    let airport = api.airport(icao).await?;
                    airport
                        .point()
                        .with_context(|| format!("{} has no valid coordinates", airport.icao))?
                }
                (None, Some(lat), Some(lon)) => Point::new_checked(*lat, *lon)
                    .with_context(|| format!("invalid coordinate {},{}", lat, lon))?,
                _ => bail!("either --icao or --lat/--lon is required"),
            };
            let radius = config
                .radius
                .clamp(radius.unwrap_or(config.radius.default_km))
                .context("radius must be a finite number")?;

            let mut airports: Vec<(f64, Airport)> = api
                .airports_in_radius(center, radius)
                .await?
                .into_iter()
                .filter_map(|a| {
                    let d = a.distance.or_else(|| a.point().map(|p| haversine_km(center, p)))?;
                    Some((d, a))
                })
                .collect();
            airports.sort_by(|a, b| a.0.total_cmp(&b.0));

            println!("{} airports within {} km of {}", airports.len(), radius, center);
            for (d, airport) in &airports {
                print_airport(airport, Some(*d));
            }
        }
        Commands::Circle { lat, lon, radius } => {
            let center = Point::new_checked(*lat, *lon)
                .with_context(|| format!("invalid coordinate {},{}", lat, lon))?;
            if !radius.is_finite() {
                bail!("radius must be a finite number");
            }
            for p in geodesic_circle(center, *radius) {
                println!("{}", p);
            }
        }
        Commands::Arc { from, to } => {
            for p in flight_arc(*from, *to) {
                println!("{}", p);
            }
        }
        Commands::Scene { icao, radius } => {
            let api = api()?;
            let center = api.airport(icao).await?;
            if center.point().is_none() {
                bail!("{} has no valid coordinates", center.icao);
            }

            let search = RadiusSearch::new(api, config.radius);
            search.set_center(Some(center));
            if let Some(radius) = radius {
                search.set_radius(*radius);
            }
            search.refresh().await;
            println!("{}", serde_json::to_string_pretty(&search.scene().to_geojson())?);
        }
        Commands::Live => run_live(api()?, &config).await?,
        Commands::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if *write {
                config.save_to(&config_path)?;
                println!("Saved to {}", config_path.display());
            }
        }
    }

    Ok(())
}

async fn run_live(api: Arc<HttpAirportApi>, config: &AppConfig) -> Result<()> {
    let settings = config.search_settings();
    let session = AutocompleteSession::spawn(api, settings);

    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        let mut shown: Vec<Airport> = Vec::new();
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.loading || snapshot.suggestions == shown {
                continue;
            }
            for (i, airport) in snapshot.suggestions.iter().enumerate() {
                println!("{:>3}. {}", i + 1, airport.label());
            }
            shown = snapshot.suggestions;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(n) = line.trim().strip_prefix(':') {
            let picked = n
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| session.select(i));
            match picked {
                Some(airport) => println!("Selected {}", airport.label()),
                None => println!("No suggestion {}", n),
            }
            continue;
        }
        session.input(&line);
    }

    // let the last query settle before exiting
    tokio::time::sleep(settings.debounce + Duration::from_millis(50)).await;
    let deadline = tokio::time::Instant::now() + config.request_timeout();
    while session.snapshot().loading && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;

    drop(session);
    printer.abort();
    Ok(())
}
