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

//! CLI argument definitions using clap.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "stroomlicht")]
#[command(author, version, about = "Electricity price traffic light service")]
#[command(
    long_about = "Fetches Dutch day-ahead electricity prices, classifies them against\n\
    configurable thresholds, and serves the resulting traffic light state over a JSON API\n\
    with a live SSE stream.\n\
    \nExamples:\n  \
    stroomlicht                            # Run with stroomlicht.toml or defaults\n  \
    stroomlicht --synthetic                # Develop offline with generated prices\n  \
    stroomlicht --port 9000 --data-dir /tmp/tl"
)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(
        long,
        default_value = "stroomlicht.toml",
        value_name = "PATH",
        help = "Configuration file (defaults apply when the file is absent)"
    )]
    pub config: String,

    /// Web server port
    #[arg(long, value_name = "PORT", help = "Override the configured web server port")]
    pub port: Option<u16>,

    /// Directory for persisted preferences
    #[arg(
        long,
        value_name = "PATH",
        help = "Override the configured preference data directory"
    )]
    pub data_dir: Option<String>,

    /// Serve generated prices without touching the network
    #[arg(
        long,
        default_value_t = false,
        help = "Run offline with synthetic prices only",
        long_help = "Skip the upstream pricing API entirely and serve the synthetic\n\
          generator's data. Useful for development without network access; the\n\
          /health endpoint reports DEGRADED in this mode."
    )]
    pub synthetic: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info",
          value_parser = ["trace", "debug", "info", "warn", "error"],
          help = "Log level (RUST_LOG takes precedence)")]
    pub log_level: String,
}
