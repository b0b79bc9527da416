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

use crate::errors::{FrankError, FrankResult};
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use stroomlicht_core::model::PriceRecord;
use tracing::{debug, error, warn};

/// Public Frank Energie GraphQL endpoint (no authentication required)
pub const DEFAULT_ENDPOINT: &str = "https://graphql.frankenergie.nl";

/// Frank Energie GraphQL API client
#[derive(Clone)]
pub struct FrankEnergieClient {
    endpoint: String,
    client: Client,
}

impl FrankEnergieClient {
    /// Create a client against a custom endpoint (tests, proxies)
    pub fn new(endpoint: impl Into<String>) -> FrankResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FrankError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Create a client against the public production endpoint
    pub fn production() -> FrankResult<Self> {
        Self::new(DEFAULT_ENDPOINT)
    }

    /// Fetch all hourly market prices for one calendar date.
    ///
    /// Single attempt, no retries. Upstream publishes day-ahead prices
    /// once per day, so a failed fetch is not worth hammering; the
    /// caller decides whether to fall back.
    pub async fn market_prices(&self, date: NaiveDate) -> FrankResult<Vec<PriceRecord>> {
        debug!("🔍 [FRANK QUERY] Fetching market prices for {}", date);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": market_prices_query(date) }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.json::<GraphQlResponse>().await?;

                if let Some(errors) = body.errors
                    && !errors.is_empty()
                {
                    let joined = errors
                        .iter()
                        .map(|e| e.message.as_str())
                        .collect::<Vec<_>>()
                        .join("; ");
                    error!("❌ [FRANK ERROR] GraphQL errors: {}", joined);
                    return Err(FrankError::GraphQl(joined));
                }

                let wire_prices = body
                    .data
                    .and_then(|data| data.market_prices)
                    .map(|market| market.electricity_prices)
                    .ok_or(FrankError::MissingData)?;

                let records: Vec<PriceRecord> = wire_prices
                    .into_iter()
                    .map(|price| {
                        PriceRecord::new(
                            price.from,
                            price.till,
                            price.market_price,
                            price.market_price_tax,
                            price.sourcing_markup_price,
                            price.energy_tax_price,
                        )
                    })
                    .collect();

                debug!(
                    "✅ [FRANK RESULT] {} price records for {}",
                    records.len(),
                    date
                );
                Ok(records)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [FRANK ERROR] Status {}: {}", status, error_text);
                Err(FrankError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Check if the GraphQL endpoint answers at all
    pub async fn ping(&self) -> FrankResult<bool> {
        debug!("Pinging Frank Energie endpoint");

        let result = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": "query { __typename }" }))
            .send()
            .await;

        match result {
            Ok(response) => {
                let is_ok = response.status().is_success();
                if is_ok {
                    debug!("Ping passed");
                } else {
                    warn!("Ping failed: status {}", response.status());
                }
                Ok(is_ok)
            }
            Err(e) => {
                warn!("Ping failed: {}", e);
                Ok(false) // Don't error on health check failure
            }
        }
    }
}

/// The upstream schema takes the date inlined, not as a variable
fn market_prices_query(date: NaiveDate) -> String {
    format!(
        "query MarketPrices {{ marketPrices(date: \"{}\") {{ electricityPrices {{ from till marketPrice marketPriceTax sourcingMarkupPrice energyTaxPrice perUnit }} }} }}",
        date
    )
}

// ============= Wire Types =============

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<MarketPricesData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketPricesData {
    market_prices: Option<MarketPrices>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketPrices {
    electricity_prices: Vec<WirePrice>,
}

/// Raw hourly slot as the API serves it. Totals are derived locally
/// because the schema only exposes the components.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePrice {
    from: chrono::DateTime<chrono::Utc>,
    till: chrono::DateTime<chrono::Utc>,
    market_price: f32,
    market_price_tax: f32,
    sourcing_markup_price: f32,
    energy_tax_price: f32,
}
