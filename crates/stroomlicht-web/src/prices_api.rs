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

//! Price data endpoints: snapshot, analysis, the legacy current-price
//! POST, and the manual refresh trigger.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;
use stroomlicht_core::analysis::PriceAnalysis;
use stroomlicht_core::model::PriceSnapshot;
use tracing::{debug, info};

use crate::AppState;

/// Raw price snapshot as last fetched
pub async fn get_prices_handler(State(state): State<AppState>) -> Json<PriceSnapshot> {
    let snapshot = state.prices.snapshot();
    debug!(
        "Serving price snapshot: {} records ({})",
        snapshot.records.len(),
        snapshot.source
    );
    Json(snapshot)
}

/// Full traffic-light analysis for the current moment
pub async fn get_status_handler(State(state): State<AppState>) -> Json<PriceAnalysis> {
    Json(state.analyze_now())
}

/// Response for the legacy current-price endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPriceResponse {
    pub current_price: f32,
    pub timestamp: String,
}

/// Current price lookup. The request body names the operation but
/// carries no parameters, so it is not parsed.
pub async fn current_price_handler(State(state): State<AppState>) -> Json<CurrentPriceResponse> {
    let analysis = state.analyze_now();
    Json(CurrentPriceResponse {
        current_price: analysis.current_price,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Queue an out-of-cycle price fetch. The fetch runs in the background;
/// 202 only acknowledges the request.
pub async fn refresh_handler(State(state): State<AppState>) -> StatusCode {
    info!("🔄 Refresh requested via API");
    state.poller.trigger_refresh();
    StatusCode::ACCEPTED
}
