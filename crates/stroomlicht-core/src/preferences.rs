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

//! Persistence layer for user preferences.
//!
//! Thresholds and notification settings each live in their own JSON
//! file under the data directory. Loading never fails: a missing or
//! malformed file yields the hardcoded defaults, so the service always
//! starts with something sensible. Saving is atomic (temp file +
//! rename) to prevent corruption.

use crate::model::{NotificationPreferences, ThresholdSettings};
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default path for persisted threshold settings.
/// Uses relative paths for portability (works in both dev and container).
pub const DEFAULT_THRESHOLDS_PATH: &str = "./data/thresholds.json";

/// Default path for persisted notification preferences.
pub const DEFAULT_NOTIFICATIONS_PATH: &str = "./data/notifications.json";

/// Preference persistence manager.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    thresholds_path: PathBuf,
    notifications_path: PathBuf,
}

impl PreferenceStore {
    /// Create a store with explicit file paths.
    pub fn new(thresholds_path: impl Into<PathBuf>, notifications_path: impl Into<PathBuf>) -> Self {
        Self {
            thresholds_path: thresholds_path.into(),
            notifications_path: notifications_path.into(),
        }
    }

    /// Create a store with both files under the given directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join("thresholds.json"), dir.join("notifications.json"))
    }

    /// Create a store using the default production paths.
    pub fn default_production() -> Self {
        Self::new(DEFAULT_THRESHOLDS_PATH, DEFAULT_NOTIFICATIONS_PATH)
    }

    /// Get the path of the thresholds file.
    pub fn thresholds_path(&self) -> &Path {
        &self.thresholds_path
    }

    /// Get the path of the notifications file.
    pub fn notifications_path(&self) -> &Path {
        &self.notifications_path
    }

    /// Load threshold settings, defaulting when absent or malformed.
    pub fn load_thresholds(&self) -> ThresholdSettings {
        let settings: ThresholdSettings =
            load_or_default(&self.thresholds_path, "threshold settings");
        info!(
            "Loaded thresholds: high={}, medium={}, low={}",
            settings.high, settings.medium, settings.low
        );
        settings
    }

    /// Save threshold settings to disk.
    pub fn save_thresholds(&self, settings: &ThresholdSettings) -> Result<()> {
        save_atomic(&self.thresholds_path, settings)?;
        info!(
            "Saved thresholds to {} (high={}, medium={}, low={})",
            self.thresholds_path.display(),
            settings.high,
            settings.medium,
            settings.low
        );
        Ok(())
    }

    /// Load notification preferences, defaulting when absent or malformed.
    pub fn load_notifications(&self) -> NotificationPreferences {
        let prefs: NotificationPreferences =
            load_or_default(&self.notifications_path, "notification preferences");
        info!(
            "Loaded notification preferences: enabled={}, threshold={}",
            prefs.enabled, prefs.threshold_price
        );
        prefs
    }

    /// Save notification preferences to disk.
    pub fn save_notifications(&self, prefs: &NotificationPreferences) -> Result<()> {
        save_atomic(&self.notifications_path, prefs)?;
        info!(
            "Saved notification preferences to {} (enabled={})",
            self.notifications_path.display(),
            prefs.enabled
        );
        Ok(())
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::default_production()
    }
}

/// Read and parse a JSON file, treating any failure as "absent".
fn load_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    if !path.exists() {
        info!("No {} file at {}, using defaults", what, path.display());
        return T::default();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(
                "⚠️ Could not read {} from {}: {e}. Using defaults",
                what,
                path.display()
            );
            return T::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            warn!(
                "⚠️ Malformed {} in {}: {e}. Using defaults",
                what,
                path.display()
            );
            T::default()
        }
    }
}

/// Atomic write using a temp file next to the target.
fn save_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(value).context("Failed to serialize preferences")?;

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &json)
        .with_context(|| format!("Failed to write temp file {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to {}", path.display()))?;

    Ok(())
}
