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

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use stroomlicht_core::model::{NotificationPreferences, ThresholdSettings};
use tracing::info;

use crate::AppState;
use crate::validation::{validate_notifications, validate_thresholds};

/// A validation issue
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    /// Field name (e.g., "medium" or "thresholdPrice")
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// Severity (error or warning)
    pub severity: String,
}

/// Validation outcome attached to settings responses
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    /// Whether the submitted settings are acceptable
    pub valid: bool,
    /// Validation errors
    pub errors: Vec<ValidationIssue>,
    /// Validation warnings
    pub warnings: Vec<ValidationIssue>,
}

/// Response for PUT settings endpoints
#[derive(Debug, Serialize)]
pub struct SettingsUpdateResponse {
    /// Whether the update was applied
    pub success: bool,
    /// Validation result
    pub validation: ValidationReport,
}

fn rejected(
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
) -> (StatusCode, Json<SettingsUpdateResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(SettingsUpdateResponse {
            success: false,
            validation: ValidationReport {
                valid: false,
                errors,
                warnings,
            },
        }),
    )
}

fn applied(warnings: Vec<ValidationIssue>) -> (StatusCode, Json<SettingsUpdateResponse>) {
    (
        StatusCode::OK,
        Json(SettingsUpdateResponse {
            success: true,
            validation: ValidationReport {
                valid: true,
                errors: Vec::new(),
                warnings,
            },
        }),
    )
}

/// GET /api/thresholds - Current threshold settings
pub async fn get_thresholds_handler(State(state): State<AppState>) -> Json<ThresholdSettings> {
    Json(*state.thresholds.read())
}

/// PUT /api/thresholds - Replace threshold settings
///
/// A rejected update leaves both the live settings and the persisted
/// file untouched.
pub async fn update_thresholds_handler(
    State(state): State<AppState>,
    Json(request): Json<ThresholdSettings>,
) -> (StatusCode, Json<SettingsUpdateResponse>) {
    let (errors, warnings) = validate_thresholds(&request);
    if !errors.is_empty() {
        return rejected(errors, warnings);
    }

    *state.thresholds.write() = request;
    info!(
        "🎚️ Thresholds updated: high={:.2}, medium={:.2}, low={:.2}",
        request.high, request.medium, request.low
    );

    if let Err(e) = state.store.save_thresholds(&request) {
        // Read-only data dirs happen in development; live state already
        // carries the update.
        info!("Thresholds updated in memory only (persistence skipped: {e})");
    }

    applied(warnings)
}

/// GET /api/notifications - Current notification preferences
pub async fn get_notifications_handler(
    State(state): State<AppState>,
) -> Json<NotificationPreferences> {
    Json(*state.notifications.read())
}

/// PUT /api/notifications - Replace notification preferences
pub async fn update_notifications_handler(
    State(state): State<AppState>,
    Json(request): Json<NotificationPreferences>,
) -> (StatusCode, Json<SettingsUpdateResponse>) {
    let (errors, warnings) = validate_notifications(&request);
    if !errors.is_empty() {
        return rejected(errors, warnings);
    }

    let mut prefs = request;
    // The slider range in the UI is 0-100
    prefs.volume = prefs.volume.min(100);

    *state.notifications.write() = prefs;
    info!(
        "🔔 Notification preferences updated: enabled={}, volume={}, threshold={:.2}",
        prefs.enabled, prefs.volume, prefs.threshold_price
    );

    if let Err(e) = state.store.save_notifications(&prefs) {
        info!("Notification preferences updated in memory only (persistence skipped: {e})");
    }

    applied(warnings)
}
