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

//! Bridge between the axum router and the mock device gateway. The
//! gateway speaks its own tiny request/response model so it can be
//! exercised without a network; this handler adapts real HTTP onto it.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, header},
};
use chrono::Utc;
use serde_json::Value;
use stroomlicht_gateway::GatewayRequest;

use crate::AppState;

/// All device traffic arrives from the in-process firmware simulation,
/// so the rate limiter sees one client.
const SIMULATED_CLIENT_KEY: &str = "127.0.0.1";

/// Forward /api/trafficlight/{*endpoint} to the device gateway
pub async fn trafficlight_handler(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    // Unparseable bodies are forwarded as absent; the gateway's own
    // missing-field answers stay authoritative.
    let body_json = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<Value>(&body).ok()
    };

    let path = format!("/{endpoint}");
    let response = state.gateway.lock().handle(
        GatewayRequest {
            method: method.as_str(),
            path: &path,
            authorization,
            body: body_json.as_ref(),
            client_key: SIMULATED_CLIENT_KEY,
        },
        Utc::now(),
    );

    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body))
}
