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

use crate::settings_api::ValidationIssue;
use stroomlicht_core::model::{NotificationPreferences, ThresholdSettings};

/// Validate threshold settings
/// Returns a tuple of (errors, warnings)
pub fn validate_thresholds(
    settings: &ThresholdSettings,
) -> (Vec<ValidationIssue>, Vec<ValidationIssue>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // ============= Well-formedness =============
    for (field, value) in [
        ("high", settings.high),
        ("medium", settings.medium),
        ("low", settings.low),
    ] {
        if !value.is_finite() {
            errors.push(ValidationIssue {
                field: field.to_owned(),
                message: "Threshold must be a finite number".to_owned(),
                severity: "error".to_owned(),
            });
        }
    }
    // Ordering checks are meaningless against NaN or infinity
    if !errors.is_empty() {
        return (errors, warnings);
    }

    // ============= Ordering =============
    if settings.low < 0.0 {
        errors.push(ValidationIssue {
            field: "low".to_owned(),
            message: "Thresholds cannot be negative".to_owned(),
            severity: "error".to_owned(),
        });
    }

    if settings.medium <= settings.low {
        errors.push(ValidationIssue {
            field: "medium".to_owned(),
            message: "Medium threshold must be above the low threshold".to_owned(),
            severity: "error".to_owned(),
        });
    }

    if settings.high <= settings.medium {
        errors.push(ValidationIssue {
            field: "high".to_owned(),
            message: "High threshold must be above the medium threshold".to_owned(),
            severity: "error".to_owned(),
        });
    }

    // ============= Plausibility =============
    if settings.high > 1.0 {
        warnings.push(ValidationIssue {
            field: "high".to_owned(),
            message: "Unusually high boundary for consumer prices (EUR/kWh)".to_owned(),
            severity: "warning".to_owned(),
        });
    }

    if errors.is_empty() && settings.high - settings.low < 0.05 {
        warnings.push(ValidationIssue {
            field: "high".to_owned(),
            message: "Narrow band between low and high may cause frequent light changes"
                .to_owned(),
            severity: "warning".to_owned(),
        });
    }

    (errors, warnings)
}

/// Validate notification preferences
/// Returns a tuple of (errors, warnings)
pub fn validate_notifications(
    prefs: &NotificationPreferences,
) -> (Vec<ValidationIssue>, Vec<ValidationIssue>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !prefs.threshold_price.is_finite() {
        errors.push(ValidationIssue {
            field: "thresholdPrice".to_owned(),
            message: "Alert threshold must be a finite number".to_owned(),
            severity: "error".to_owned(),
        });
        return (errors, warnings);
    }

    if prefs.threshold_price < 0.0 {
        errors.push(ValidationIssue {
            field: "thresholdPrice".to_owned(),
            message: "Alert threshold cannot be negative".to_owned(),
            severity: "error".to_owned(),
        });
    } else if !(0.15..=0.40).contains(&prefs.threshold_price) {
        warnings.push(ValidationIssue {
            field: "thresholdPrice".to_owned(),
            message: "Alert threshold outside the usual 0.15-0.40 EUR/kWh range".to_owned(),
            severity: "warning".to_owned(),
        });
    }

    if prefs.volume > 100 {
        warnings.push(ValidationIssue {
            field: "volume".to_owned(),
            message: "Volume above 100 is clamped".to_owned(),
            severity: "warning".to_owned(),
        });
    }

    (errors, warnings)
}
