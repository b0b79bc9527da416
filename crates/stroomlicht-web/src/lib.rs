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

mod prices_api;
mod settings_api;
mod trafficlight_api;
mod validation;

pub use settings_api::{SettingsUpdateResponse, ValidationIssue, ValidationReport};

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, Sse},
    },
    routing::{any, get, post},
};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use stroomlicht_core::analysis::{PriceAnalysis, analyze_prices};
use stroomlicht_core::model::{NotificationPreferences, ThresholdSettings};
use stroomlicht_core::poller::{PollerHandle, SharedPrices};
use stroomlicht_core::preferences::PreferenceStore;
use stroomlicht_gateway::DeviceGateway;
use tokio_stream::{StreamExt, wrappers::IntervalStream};
use tower_http::cors::CorsLayer;
use tracing::{info, trace};

/// How often the SSE stream pushes a fresh analysis
const STREAM_PUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Application state for web handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Shared price snapshot fed by the poller
    pub prices: Arc<SharedPrices>,
    /// Handle for requesting out-of-cycle fetches
    pub poller: PollerHandle,
    /// Persistence for user preferences
    pub store: Arc<PreferenceStore>,
    /// Live threshold settings
    pub thresholds: Arc<RwLock<ThresholdSettings>>,
    /// Live notification preferences
    pub notifications: Arc<RwLock<NotificationPreferences>>,
    /// The simulated device API
    pub gateway: Arc<Mutex<DeviceGateway>>,
}

impl AppState {
    /// Build state from the shared price handle and the preference
    /// store, loading persisted settings into live state.
    pub fn new(prices: Arc<SharedPrices>, poller: PollerHandle, store: PreferenceStore) -> Self {
        let thresholds = store.load_thresholds();
        let notifications = store.load_notifications();

        Self {
            prices,
            poller,
            store: Arc::new(store),
            thresholds: Arc::new(RwLock::new(thresholds)),
            notifications: Arc::new(RwLock::new(notifications)),
            gateway: Arc::new(Mutex::new(DeviceGateway::new())),
        }
    }

    /// Full price analysis against the current shared state
    pub(crate) fn analyze_now(&self) -> PriceAnalysis {
        let snapshot = self.prices.snapshot();
        let thresholds = *self.thresholds.read();
        let notifications = *self.notifications.read();
        analyze_prices(&snapshot, &thresholds, &notifications, Utc::now())
    }
}

/// Assemble the API router. Separate from serving so tests can drive
/// the router directly.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stream", get(stream_handler))
        .route("/api/prices", get(prices_api::get_prices_handler))
        .route("/api/status", get(prices_api::get_status_handler))
        .route("/api/current-price", post(prices_api::current_price_handler))
        .route("/api/refresh", post(prices_api::refresh_handler))
        .route(
            "/api/thresholds",
            get(settings_api::get_thresholds_handler).put(settings_api::update_thresholds_handler),
        )
        .route(
            "/api/notifications",
            get(settings_api::get_notifications_handler)
                .put(settings_api::update_notifications_handler),
        )
        // The mock device API the ESP32 firmware targets
        .route(
            "/api/trafficlight/{*endpoint}",
            any(trafficlight_api::trafficlight_handler),
        )
        .layer(CorsLayer::permissive()) // The dashboard SPA is served from its own origin
        .with_state(state)
}

/// Start the web server
///
/// # Errors
/// Returns error if server fails to bind or serve
pub async fn start_web_server(
    state: AppState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    info!("🌐 Starting web server on {addr}");
    info!("📱 Dashboard API: http://localhost:{}/api/status", port);
    info!("🚦 Device API: http://localhost:{}/api/trafficlight/", port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint. Degraded means the synthetic fallback is
/// serving instead of live upstream prices.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.prices.snapshot().is_degraded() {
        (StatusCode::SERVICE_UNAVAILABLE, "DEGRADED")
    } else {
        (StatusCode::OK, "OK")
    }
}

/// SSE stream handler for live updates. Pushes the serialized analysis
/// on a fixed cadence; clients re-render from each event.
async fn stream_handler(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    trace!("SSE stream connected");

    let interval = tokio::time::interval(STREAM_PUSH_INTERVAL);
    let stream = IntervalStream::new(interval).map(move |_| {
        let analysis = state.analyze_now();
        let payload = serde_json::to_string(&analysis)
            .unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"));
        Ok::<_, Infallible>(Event::default().event("update").data(payload))
    });

    Sse::new(stream)
}
