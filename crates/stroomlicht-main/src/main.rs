// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Stroomlicht.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

mod cli;
mod config;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stroomlicht_core::poller::{SharedPrices, spawn_price_poller};
use stroomlicht_core::preferences::PreferenceStore;
use stroomlicht_core::sources::{FallbackPriceSource, PriceDataSource, SyntheticPriceSource};
use stroomlicht_frank::{FrankEnergieClient, FrankEnergiePriceSource};
use stroomlicht_web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Initialize tracing with env filter support
    // Respects RUST_LOG environment variable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut config = config::AppConfig::load(&args.config)?;
    config.apply_overrides(&args);
    config.validate()?;

    info!("🚀 Starting Stroomlicht - Electricity Price Traffic Light");
    info!("📋 Configuration Summary:");
    info!("   Port: {}", config.server.port);
    info!("   Data dir: {}", config.storage.data_dir);
    info!(
        "   Fetch interval: {}s",
        config.pricing.fetch_interval_secs
    );
    info!("   Synthetic only: {}", config.pricing.synthetic_only);

    let source: Arc<dyn PriceDataSource> = if config.pricing.synthetic_only {
        info!("🎲 Running offline with synthetic prices");
        Arc::new(SyntheticPriceSource)
    } else {
        let client = FrankEnergieClient::production()?;
        Arc::new(FallbackPriceSource::new(Arc::new(
            FrankEnergiePriceSource::new(Arc::new(client)),
        )))
    };
    info!("💰 Price data source: {}", source.name());

    let shared = Arc::new(SharedPrices::new());
    let poller = spawn_price_poller(source, shared.clone(), config.fetch_interval());

    let store = PreferenceStore::in_dir(&config.storage.data_dir);
    let state = AppState::new(shared, poller, store);

    let port = config.server.port;
    let server = tokio::spawn(async move {
        if let Err(e) = stroomlicht_web::start_web_server(state, port).await {
            error!("❌ Web server failed: {e}");
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = server => {
            error!("Web server exited unexpectedly");
        }
    }

    info!("Shutting down");
    Ok(())
}
