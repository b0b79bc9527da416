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

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::Cli;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Price fetching configuration
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Preference storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port for the JSON API and SSE stream
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8099 }
    }
}

/// Price fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Seconds between scheduled price fetches
    pub fetch_interval_secs: u64,

    /// Serve synthetic prices only, never contacting the upstream API
    pub synthetic_only: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fetch_interval_secs: 60,
            synthetic_only: false,
        }
    }
}

/// Preference storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the persisted preference files
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the given file, or defaults when absent
    pub fn load(path: &str) -> Result<Self> {
        if let Ok(contents) = std::fs::read_to_string(path) {
            let config: AppConfig =
                toml::from_str(&contents).with_context(|| format!("Failed to parse {path}"))?;
            info!("✅ Loaded configuration from {path}");
            return Ok(config);
        }

        warn!("No configuration file at {path}, using defaults");
        Ok(Self::default())
    }

    /// Fold CLI overrides into the loaded configuration
    pub fn apply_overrides(&mut self, args: &Cli) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(data_dir) = &args.data_dir {
            self.storage.data_dir = data_dir.clone();
        }
        if args.synthetic {
            self.pricing.synthetic_only = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pricing.fetch_interval_secs < 5 {
            bail!("pricing.fetch_interval_secs must be at least 5 seconds");
        }
        if self.storage.data_dir.is_empty() {
            bail!("storage.data_dir cannot be empty");
        }
        Ok(())
    }

    /// Fetch interval as a Duration
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.pricing.fetch_interval_secs)
    }
}
