mod api;
mod catalog;
mod commands;
mod config;
mod prefetch;
mod session;
mod storage;

use coastle_engine::models::Location;
use coastle_engine::storage::KeyValueStore;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use commands::Command;
use config::{Config, LocationSource, Mode};
use prefetch::Prefetcher;
use session::{Reply, Session};

/// Fetch the locations the current mode needs from the configured source.
async fn load_locations(
    config: &Config,
    client: &reqwest::Client,
) -> Result<Vec<Location>, String> {
    match (&config.source, config.mode) {
        (LocationSource::Api(url), Mode::Daily) => Ok(vec![api::fetch_daily(client, url).await?]),
        (LocationSource::Api(url), Mode::Infinite) => api::fetch_infinite(client, url).await,
        (LocationSource::File(path), Mode::Daily) => {
            let catalog = catalog::Catalog::load(path)?;
            let key = catalog::today_key();
            let location = catalog
                .find_daily(&key)
                .cloned()
                .ok_or_else(|| format!("No location scheduled for {}", key))?;
            Ok(vec![location])
        }
        (LocationSource::File(path), Mode::Infinite) => Ok(catalog::Catalog::load(path)?.locations),
    }
}

async fn deliver_locations<S: KeyValueStore, R: Rng>(
    session: &mut Session<S, R>,
    config: &Config,
    client: &reqwest::Client,
) {
    let loaded = match load_locations(config, client).await {
        Ok(locations) => session.load_locations(locations),
        Err(e) => Err(e),
    };
    match loaded {
        Ok(()) => match session.tile_url() {
            Some(url) => println!("Turn {}: {}", session.round().turn(), url),
            None => println!("Location is still loading"),
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to load locations");
            println!("Failed to load locations ({e}). Type `reload` to try again.");
        }
    }
}

async fn run<S: KeyValueStore, R: Rng>(
    mut session: Session<S, R>,
    config: &Config,
    client: reqwest::Client,
) -> Result<(), String> {
    let mut prefetcher = Prefetcher::new(client.clone(), config.prefetch);

    deliver_locations(&mut session, config, &client).await;
    prefetcher.request(session.prefetch_url());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(|e| e.to_string())? {
        let cmd = match Command::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match session.apply(cmd) {
            Reply::Text(text) => println!("{text}"),
            Reply::Quiet => {}
            Reply::Reload => deliver_locations(&mut session, config, &client).await,
            Reply::Quit => break,
        }
        prefetcher.request(session.prefetch_url());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().unwrap_or_else(|e| panic!("Invalid configuration: {}", e));
    let projector = config
        .projector()
        .unwrap_or_else(|e| panic!("Invalid calibration: {}", e));
    let client = reqwest::Client::new();

    tracing::info!(mode = ?config.mode, source = ?config.source, "Starting Coastle");
    println!("{}", commands::HELP);

    let result = match config.mode {
        Mode::Daily => {
            let session: Session<storage::RedbStore, rand::rngs::ThreadRng> =
                Session::daily(config.widget, projector, config.tile_base_url.clone());
            run(session, &config, client).await
        }
        Mode::Infinite => {
            if let Some(parent) = config.state_path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create state directory");
            }
            let store = storage::RedbStore::open(&config.state_path)
                .unwrap_or_else(|e| panic!("{}", e));
            tracing::info!(path = %store.path().display(), "Opened state database");
            let session = Session::infinite(
                store,
                rand::thread_rng(),
                config.widget,
                projector,
                config.tile_base_url.clone(),
            );
            run(session, &config, client).await
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Input loop failed");
        std::process::exit(1);
    }
}
