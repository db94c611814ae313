use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use roadshare_common::AppConfig;
use roadshare_geo::{rank_by_distance, DistanceUnit, GoogleGeocoder};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use roadshare_migrate::{
    FixedDelayPacer, GeocodeRunner, MigrationOptions, PgVehicleStore, VehicleStore,
};

#[derive(Parser)]
#[command(
    name = "roadshare-migrate",
    about = "Back-fill coordinates onto vehicle listing addresses"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Geocode every vehicle whose address lacks coordinates
    All {
        #[arg(long, env = "GEOCODE_BATCH_SIZE", default_value_t = 10)]
        batch_size: usize,

        #[arg(long, env = "GEOCODE_LIMIT", default_value_t = 100)]
        limit: usize,

        /// Pause between records within a batch
        #[arg(long, env = "GEOCODE_RECORD_DELAY_MS", default_value_t = 100)]
        record_delay_ms: u64,

        /// Pause between batches
        #[arg(long, env = "GEOCODE_BATCH_DELAY_MS", default_value_t = 500)]
        batch_delay_ms: u64,

        /// List the vehicles that would be processed and exit
        #[arg(long)]
        dry_run: bool,
    },

    /// Geocode a single vehicle
    Vehicle { id: Uuid },

    /// List geocoded vehicles nearest to a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Only include vehicles within this distance
        #[arg(long)]
        radius: Option<f64>,

        #[arg(long, default_value = "miles")]
        unit: DistanceUnit,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Connected to database, migrations complete");

    let store = Arc::new(PgVehicleStore::new(pool));

    match cli.command {
        Command::All {
            batch_size,
            limit,
            record_delay_ms,
            batch_delay_ms,
            dry_run,
        } => {
            let pacer = FixedDelayPacer::new(
                Duration::from_millis(record_delay_ms),
                Duration::from_millis(batch_delay_ms),
            );
            let runner = GeocodeRunner::new(store, build_geocoder(&config)?, Arc::new(pacer));

            if dry_run {
                let pending = runner.pending(limit).await?;
                tracing::info!(count = pending.len(), "Vehicles without coordinates");
                for vehicle in &pending {
                    let address = vehicle
                        .address
                        .as_ref()
                        .map(|a| a.one_line())
                        .unwrap_or_else(|| "<no address>".to_string());
                    println!("{}\t{}\t{}", vehicle.id, vehicle.title, address);
                }
                return Ok(());
            }

            let result = runner
                .geocode_all_vehicles(MigrationOptions { batch_size, limit })
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Vehicle { id } => {
            let runner = GeocodeRunner::new(
                store,
                build_geocoder(&config)?,
                Arc::new(FixedDelayPacer::default()),
            );
            let outcome = runner.geocode_vehicle(id).await?;
            println!("{}", serde_json::to_string_pretty(&outcome.response())?);
        }

        Command::Nearby {
            lat,
            lng,
            radius,
            unit,
            limit,
        } => {
            let vehicles = store.vehicles_with_coordinates().await?;
            let ranked = rank_by_distance((lat, lng), vehicles, unit, radius);
            tracing::info!(matches = ranked.len(), "Ranked vehicles by distance");

            for r in ranked.into_iter().take(limit) {
                println!(
                    "{:>10.2} {}\t{}\t{}",
                    r.distance,
                    unit.abbreviation(),
                    r.item.id,
                    r.item.title
                );
            }
        }
    }

    Ok(())
}

fn build_geocoder(config: &AppConfig) -> Result<Arc<GoogleGeocoder>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let mut geocoder =
        GoogleGeocoder::new(config.google_maps_api_key.clone()).with_http_client(http_client);
    if let Some(base_url) = &config.geocoding_base_url {
        geocoder = geocoder.with_base_url(base_url.clone());
    }
    Ok(Arc::new(geocoder))
}
