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

pub mod analysis;
pub mod device;
pub mod model;
pub mod poller;
pub mod preferences;
pub mod sources;

pub use analysis::{
    DEFAULT_PRICE_EUR_PER_KWH, LevelCounts, PriceAnalysis, PriceRange, UsageAdvice, analyze_prices,
    best_upcoming, current_price, current_record, estimate_trend, usage_advice,
};
pub use device::{CommandKind, DeviceCommand, DeviceStatus, WifiConfig, WifiSecurity};
pub use model::{
    LightColor, NotificationPreferences, PriceLevel, PriceRecord, PriceSnapshot, PriceTrend,
    SnapshotSource, ThresholdSettings, TrendReading,
};
pub use poller::{PollerHandle, SharedPrices, spawn_price_poller};
pub use preferences::{
    DEFAULT_NOTIFICATIONS_PATH, DEFAULT_THRESHOLDS_PATH, PreferenceStore,
};
pub use sources::{
    FallbackPriceSource, PriceDataSource, SYNTHETIC_HOURS, SyntheticPriceSource,
    generate_synthetic_prices,
};
