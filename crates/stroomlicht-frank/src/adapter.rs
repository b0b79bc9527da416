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

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Europe::Amsterdam;
use std::sync::Arc;
use tracing::{debug, info};

use crate::client::FrankEnergieClient;
use stroomlicht_core::model::PriceSnapshot;
use stroomlicht_core::sources::PriceDataSource;

/// Frank Energie adapter implementing PriceDataSource.
/// Fetches the current calendar date's day-ahead prices.
pub struct FrankEnergiePriceSource {
    client: Arc<FrankEnergieClient>,
}

impl FrankEnergiePriceSource {
    /// Create a new Frank Energie price source
    pub fn new(client: Arc<FrankEnergieClient>) -> Self {
        Self { client }
    }

    /// Get reference to the underlying client (for direct queries)
    pub fn client(&self) -> &Arc<FrankEnergieClient> {
        &self.client
    }

    /// The Dutch market publishes prices per local calendar date, so
    /// "today" must be Amsterdam's today, not UTC's.
    fn market_date(now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&Amsterdam).date_naive()
    }
}

#[async_trait]
impl PriceDataSource for FrankEnergiePriceSource {
    async fn read_prices(&self) -> Result<PriceSnapshot> {
        let date = Self::market_date(Utc::now());
        info!("💰 [ADAPTER] Reading Frank Energie prices for {}", date);

        let records = self
            .client
            .market_prices(date)
            .await
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Failed to fetch market prices for {}", date))?;

        info!("✅ [ADAPTER] Parsed {} hourly price slots", records.len());
        if let (Some(first), Some(last)) = (records.first(), records.last()) {
            debug!(
                "   First slot: {} at {:.4} EUR/kWh",
                first.from.format("%Y-%m-%d %H:%M"),
                first.total_price
            );
            debug!(
                "   Last slot:  {} at {:.4} EUR/kWh",
                last.from.format("%Y-%m-%d %H:%M"),
                last.total_price
            );
        }

        // An empty day is not an error: early-morning fetches can land
        // before publication and downstream falls back to defaults.
        Ok(PriceSnapshot::live(records))
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.ping().await.map_err(|e| anyhow::anyhow!(e))
    }

    fn name(&self) -> &str {
        "FrankEnergie"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use stroomlicht_core::model::SnapshotSource;

    #[test]
    fn test_market_date_uses_amsterdam_calendar() {
        // 23:30 UTC on Jan 14 is already 00:30 on Jan 15 in Amsterdam
        let now = Utc.with_ymd_and_hms(2025, 1, 14, 23, 30, 0).unwrap();
        assert_eq!(
            FrankEnergiePriceSource::market_date(now),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );

        // Midday is the same date in both zones
        let noon = Utc.with_ymd_and_hms(2025, 1, 14, 12, 0, 0).unwrap();
        assert_eq!(
            FrankEnergiePriceSource::market_date(noon),
            NaiveDate::from_ymd_opt(2025, 1, 14).unwrap()
        );
    }

    #[tokio::test]
    async fn test_read_prices_builds_live_snapshot() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::Regex("marketPrices".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": {
                        "marketPrices": {
                            "electricityPrices": [{
                                "from": "2025-01-15T09:00:00Z",
                                "till": "2025-01-15T10:00:00Z",
                                "marketPrice": 0.18,
                                "marketPriceTax": 0.04,
                                "sourcingMarkupPrice": 0.02,
                                "energyTaxPrice": 0.11,
                                "perUnit": "kWh"
                            }]
                        }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = Arc::new(FrankEnergieClient::new(server.url()).unwrap());
        let source = FrankEnergiePriceSource::new(client);
        let snapshot = source.read_prices().await.unwrap();

        assert_eq!(snapshot.source, SnapshotSource::Live);
        assert_eq!(snapshot.records.len(), 1);
        assert!((snapshot.records[0].total_price - 0.35).abs() < 1e-6);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_prices_propagates_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(500)
            .create_async()
            .await;

        let client = Arc::new(FrankEnergieClient::new(server.url()).unwrap());
        let source = FrankEnergiePriceSource::new(client);

        // The adapter itself surfaces errors; swallowing them is the
        // fallback decorator's job.
        assert!(source.read_prices().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_day_is_not_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": { "marketPrices": { "electricityPrices": [] } }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = Arc::new(FrankEnergieClient::new(server.url()).unwrap());
        let source = FrankEnergiePriceSource::new(client);
        let snapshot = source.read_prices().await.unwrap();

        assert_eq!(snapshot.source, SnapshotSource::Live);
        assert!(snapshot.records.is_empty());
    }

    #[tokio::test]
    async fn test_name() {
        let client = Arc::new(FrankEnergieClient::new("http://localhost").unwrap());
        let source = FrankEnergiePriceSource::new(client);
        assert_eq!(source.name(), "FrankEnergie");
    }
}
