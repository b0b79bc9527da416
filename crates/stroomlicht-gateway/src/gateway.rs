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

//! In-memory mock of the traffic-light device API.
//!
//! Simulates the cloud endpoint ESP32 units talk to, so firmware and
//! dashboard can be developed without real devices. All state lives in
//! one `DeviceGateway` instance: thresholds, last-seen device statuses,
//! rate-limit windows and the token allow-list. Nothing survives a
//! restart.

use crate::rate_limit::RateLimiter;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use stroomlicht_core::device::DeviceStatus;
use stroomlicht_core::model::{LightColor, ThresholdSettings};
use tracing::{debug, warn};

/// Keys issued to devices. The first is the "production" key baked into
/// firmware, the second is for local development.
pub const DEFAULT_API_KEYS: [&str; 2] = ["tl_sk_e7a2f15b8d6c93741f0", "tl_dev_key_for_testing"];

/// Status and JSON body of a simulated HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Value,
}

impl GatewayResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }
}

/// One simulated request. `client_key` identifies the caller for rate
/// limiting (an IP address in a real deployment).
#[derive(Debug, Clone, Copy)]
pub struct GatewayRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub authorization: Option<&'a str>,
    pub body: Option<&'a Value>,
    pub client_key: &'a str,
}

/// The mock device API. One instance owns all gateway state; handlers
/// take `&mut self` and callers provide the clock.
#[derive(Debug)]
pub struct DeviceGateway {
    api_keys: Vec<String>,
    thresholds: ThresholdSettings,
    device_statuses: HashMap<String, DeviceStatus>,
    rate_limiter: RateLimiter,
}

impl DeviceGateway {
    /// Gateway with the stock key allow-list and default thresholds
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_API_KEYS.iter().map(ToString::to_string).collect(),
            ThresholdSettings::default(),
            RateLimiter::default(),
        )
    }

    /// Fully injected construction, mainly for tests
    pub fn with_config(
        api_keys: Vec<String>,
        thresholds: ThresholdSettings,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            api_keys,
            thresholds,
            device_statuses: HashMap::new(),
            rate_limiter,
        }
    }

    /// Handle one request. Checks run in a fixed order: rate limit,
    /// then authentication, then routing.
    pub fn handle(&mut self, request: GatewayRequest<'_>, now: DateTime<Utc>) -> GatewayResponse {
        if !self.rate_limiter.check(request.client_key, now) {
            warn!(
                "🚦 Rate limit exceeded for client {} ({} {})",
                request.client_key, request.method, request.path
            );
            return GatewayResponse::error(429, "Too many requests");
        }

        let Some(api_key) = extract_api_key(request.authorization) else {
            warn!("🔑 Missing or malformed Authorization header");
            return GatewayResponse::error(401, "Invalid or missing API key");
        };
        if !self.api_keys.iter().any(|known| known == api_key) {
            warn!("🔑 Unknown API key presented");
            return GatewayResponse::error(401, "Invalid or missing API key");
        }

        debug!("🚥 Gateway request: {} {}", request.method, request.path);

        match (request.method, request.path) {
            ("POST", "/status") => self.handle_status_update(request.body),
            ("GET", "/thresholds") => self.handle_get_thresholds(),
            ("PUT", "/thresholds") => self.handle_update_thresholds(request.body),
            ("POST", path) => match path.strip_prefix("/command/") {
                Some(device_id) => self.handle_command(device_id, request.body),
                None => GatewayResponse::error(404, "Not found"),
            },
            _ => GatewayResponse::error(404, "Not found"),
        }
    }

    fn handle_status_update(&mut self, body: Option<&Value>) -> GatewayResponse {
        // Malformed bodies get the same answer as absent fields
        let Some(update) = body.and_then(parse_status_update) else {
            return GatewayResponse::error(400, "Missing required fields");
        };

        debug!(
            "📟 Status from {}: {} (battery: {:?}, rssi: {:?})",
            update.device_id, update.status, update.battery_level, update.wifi_strength
        );
        self.device_statuses
            .insert(update.device_id.clone(), update);

        GatewayResponse::ok(json!({ "success": true }))
    }

    fn handle_get_thresholds(&self) -> GatewayResponse {
        match serde_json::to_value(self.thresholds) {
            Ok(body) => GatewayResponse::ok(body),
            Err(e) => {
                warn!("Failed to serialize thresholds: {}", e);
                GatewayResponse::error(500, "Internal error")
            }
        }
    }

    fn handle_update_thresholds(&mut self, body: Option<&Value>) -> GatewayResponse {
        // Presence check treats zero and NaN as missing; real boundaries
        // are always positive prices.
        let Some(thresholds) = body.and_then(parse_thresholds) else {
            return GatewayResponse::error(400, "Missing threshold values");
        };

        debug!(
            "🎚️ Thresholds updated: high={} medium={} low={}",
            thresholds.high, thresholds.medium, thresholds.low
        );
        self.thresholds = thresholds;

        GatewayResponse::ok(json!({ "success": true }))
    }

    fn handle_command(&self, device_id: &str, body: Option<&Value>) -> GatewayResponse {
        let Some(command) = body
            .and_then(|value| value.get("command"))
            .and_then(Value::as_str)
            .filter(|cmd| !cmd.is_empty())
        else {
            return GatewayResponse::error(400, "Invalid command");
        };
        if device_id.is_empty() {
            return GatewayResponse::error(400, "Invalid command");
        }

        // No device connection in the mock; acknowledge and move on
        debug!("📡 Command '{}' for device {}", command, device_id);
        GatewayResponse::ok(json!({
            "success": true,
            "message": format!("Command {} sent to device {}", command, device_id),
        }))
    }

    // ============= Debug Accessors =============

    /// Last status reported by one device
    pub fn device_status(&self, device_id: &str) -> Option<&DeviceStatus> {
        self.device_statuses.get(device_id)
    }

    /// All device statuses, keyed by device id
    pub fn all_device_statuses(&self) -> &HashMap<String, DeviceStatus> {
        &self.device_statuses
    }

    /// Thresholds the gateway currently serves
    pub fn current_thresholds(&self) -> ThresholdSettings {
        self.thresholds
    }
}

impl Default for DeviceGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
/// Scheme match is case-insensitive; the token is everything after the
/// first run of whitespace.
fn extract_api_key(authorization: Option<&str>) -> Option<&str> {
    let header = authorization?;
    let (scheme, rest) = header.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = rest.trim_start();
    (!token.is_empty()).then_some(token)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdateBody {
    device_id: Option<String>,
    status: Option<LightColor>,
    price: Option<f32>,
    timestamp: Option<String>,
    battery_level: Option<u8>,
    wifi_strength: Option<i16>,
}

/// Validate presence of the required status fields. Empty strings count
/// as missing, the way the firmware treats unset config values.
fn parse_status_update(body: &Value) -> Option<DeviceStatus> {
    let parsed: StatusUpdateBody = serde_json::from_value(body.clone()).ok()?;

    let device_id = parsed.device_id.filter(|id| !id.is_empty())?;
    let status = parsed.status?;
    let timestamp = parsed.timestamp.filter(|ts| !ts.is_empty())?;

    Some(DeviceStatus {
        device_id,
        status,
        price: parsed.price,
        timestamp,
        battery_level: parsed.battery_level,
        wifi_strength: parsed.wifi_strength,
    })
}

#[derive(Debug, Deserialize)]
struct ThresholdsBody {
    high: Option<f64>,
    medium: Option<f64>,
    low: Option<f64>,
}

fn parse_thresholds(body: &Value) -> Option<ThresholdSettings> {
    let parsed: ThresholdsBody = serde_json::from_value(body.clone()).ok()?;

    let present = |value: Option<f64>| value.filter(|v| *v != 0.0 && !v.is_nan());

    Some(ThresholdSettings {
        high: present(parsed.high)?,
        medium: present(parsed.medium)?,
        low: present(parsed.low)?,
    })
}
