use std::time::Duration;

use anyhow::{anyhow, Context};
use breeze_server::{
    dashboard::{fetch_ticker, render_ticker, DashboardReport, TOP_CITIES},
    open_meteo::{AirQualityClient, GeocodingClient, DEFAULT_AIR_QUALITY_BASE, DEFAULT_GEOCODING_BASE},
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "breeze-dashboard")]
#[command(about = "Air quality lookups and health tips from the terminal")]
struct Args {
    // Print the view model as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true, default_value = DEFAULT_AIR_QUALITY_BASE)]
    air_quality_base: String,

    #[arg(long, global = true, default_value = DEFAULT_GEOCODING_BASE)]
    geocoding_base: String,

    // Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List up to five places matching a name
    Search { query: String },
    /// Air quality report for a place name or explicit coordinates
    Report {
        place: Option<String>,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        #[arg(long)]
        name: Option<String>,
        // Append a shareable summary pointing at this URL
        #[arg(long)]
        share_url: Option<String>,
    },
    /// Current AQI for the ten most populated cities
    Ticker,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    let timeout = Duration::from_secs(args.timeout_secs.max(1));
    let air_quality = AirQualityClient::new(&args.air_quality_base, timeout)?;
    let geocoding = GeocodingClient::new(&args.geocoding_base, timeout)?;

    match args.command {
        Command::Search { query } => {
            let places = geocoding.search(&query).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&places)?);
            } else if places.is_empty() {
                println!("No places found for {query:?}");
            } else {
                for place in &places {
                    println!(
                        "{}  ({:.4}, {:.4})",
                        place.display_name(),
                        place.latitude,
                        place.longitude
                    );
                }
            }
        }
        Command::Report {
            place,
            lat,
            lon,
            name,
            share_url,
        } => {
            let (latitude, longitude, location) = match (lat, lon, place) {
                (Some(lat), Some(lon), _) => {
                    (lat, lon, name.unwrap_or_else(|| "Your Location".to_string()))
                }
                (_, _, Some(query)) => {
                    let place = geocoding
                        .search(&query)
                        .await?
                        .into_iter()
                        .next()
                        .ok_or_else(|| anyhow!("No places found for {query:?}"))?;
                    let label = name.unwrap_or_else(|| place.short_label());
                    (place.latitude, place.longitude, label)
                }
                _ => return Err(anyhow!("Pass a place name or both --lat and --lon")),
            };

            let reading = air_quality
                .current(latitude, longitude)
                .await
                .context("Failed to fetch air quality data.")?;
            let report = DashboardReport::build(location, &reading, chrono::Local::now())?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
            if let Some(url) = share_url {
                println!();
                println!("{}", report.share_text(&url));
            }
        }
        Command::Ticker => {
            let entries = fetch_ticker(&air_quality, &TOP_CITIES).await;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("{}", render_ticker(&entries));
            }
        }
    }

    Ok(())
}
