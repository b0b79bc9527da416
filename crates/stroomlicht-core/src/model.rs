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

//! Core price data model shared across the workspace.
//!
//! Field names serialize in camelCase to stay wire-compatible with the
//! Frank Energie payload and the frontend that consumes our API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============= Price Data =============

/// One hourly price slot with its cost components (EUR/kWh)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    /// Start of the slot (inclusive)
    pub from: DateTime<Utc>,

    /// End of the slot (exclusive)
    pub till: DateTime<Utc>,

    /// Raw day-ahead market price
    pub market_price: f32,

    /// Tax levied on the market price
    pub market_price_tax: f32,

    /// Supplier sourcing markup
    pub sourcing_markup_price: f32,

    /// Fixed energy tax component
    pub energy_tax_price: f32,

    /// Sum of the four components above
    pub total_price: f32,
}

impl PriceRecord {
    /// Build a record from its components, deriving `total_price`
    pub fn new(
        from: DateTime<Utc>,
        till: DateTime<Utc>,
        market_price: f32,
        market_price_tax: f32,
        sourcing_markup_price: f32,
        energy_tax_price: f32,
    ) -> Self {
        Self {
            from,
            till,
            market_price,
            market_price_tax,
            sourcing_markup_price,
            energy_tax_price,
            total_price: market_price + market_price_tax + sourcing_markup_price + energy_tax_price,
        }
    }

    /// Does this slot contain the given instant? `[from, till)`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && instant < self.till
    }
}

/// Where a snapshot's records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    /// Fetched from the upstream pricing API
    Live,
    /// Generated by the diurnal fallback heuristic
    Synthetic,
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// One complete fetch result. A new fetch replaces the whole set;
/// records are never merged or patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    /// Hourly records ordered by `from` ascending
    pub records: Vec<PriceRecord>,

    /// When this snapshot was produced
    pub fetched_at: DateTime<Utc>,

    /// Live upstream data or synthetic fallback
    pub source: SnapshotSource,
}

impl Default for PriceSnapshot {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            fetched_at: Utc::now(),
            source: SnapshotSource::Synthetic,
        }
    }
}

impl PriceSnapshot {
    /// Snapshot of live upstream records, stamped now
    pub fn live(records: Vec<PriceRecord>) -> Self {
        Self {
            records,
            fetched_at: Utc::now(),
            source: SnapshotSource::Live,
        }
    }

    /// Snapshot of generated records, stamped now
    pub fn synthetic(records: Vec<PriceRecord>) -> Self {
        Self {
            records,
            fetched_at: Utc::now(),
            source: SnapshotSource::Synthetic,
        }
    }

    /// The record whose slot contains the given instant
    pub fn record_at(&self, now: DateTime<Utc>) -> Option<&PriceRecord> {
        self.records.iter().find(|record| record.contains(now))
    }

    /// Serving fallback data rather than upstream prices?
    pub fn is_degraded(&self) -> bool {
        self.source == SnapshotSource::Synthetic
    }
}

// ============= Thresholds & Classification =============

/// The three price boundaries that drive the traffic light (EUR/kWh).
///
/// Invariant `high > medium > low >= 0` is enforced at the point of user
/// edit (the settings API), not here. Boundaries are `f64`: they travel
/// through `serde_json::Value` on the device API, and an `f32` widened
/// into a `Value` serializes as `0.4000000059604645` instead of `0.4`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdSettings {
    /// Prices at or above this are "high" (red)
    pub high: f64,

    /// Prices at or above this (but below `high`) are "medium" (yellow)
    pub medium: f64,

    /// Informational lower band, used for usage advice
    pub low: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            high: 0.40,
            medium: 0.25,
            low: 0.15,
        }
    }
}

impl ThresholdSettings {
    /// Classify a price into its tier.
    ///
    /// Total over all finite inputs. NaN fails both `>=` comparisons and
    /// lands in `Low`; infinities order normally.
    pub fn classify(&self, price: f32) -> PriceLevel {
        let price = f64::from(price);
        if price >= self.high {
            PriceLevel::High
        } else if price >= self.medium {
            PriceLevel::Medium
        } else {
            PriceLevel::Low
        }
    }
}

/// Price tier. Ordering follows price rank: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceLevel {
    Low,
    Medium,
    High,
}

impl PriceLevel {
    /// Traffic light color for this tier
    pub fn color(&self) -> LightColor {
        match self {
            Self::Low => LightColor::Green,
            Self::Medium => LightColor::Yellow,
            Self::High => LightColor::Red,
        }
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// The lamp an ESP32 device shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for LightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Green => write!(f, "green"),
            Self::Yellow => write!(f, "yellow"),
            Self::Red => write!(f, "red"),
        }
    }
}

// ============= Trend =============

/// Qualitative short-term price movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceTrend {
    StrongIncrease,
    SlightIncrease,
    Stable,
    SlightDecrease,
    StrongDecrease,
}

impl fmt::Display for PriceTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrongIncrease => write!(f, "strong-increase"),
            Self::SlightIncrease => write!(f, "slight-increase"),
            Self::Stable => write!(f, "stable"),
            Self::SlightDecrease => write!(f, "slight-decrease"),
            Self::StrongDecrease => write!(f, "strong-decrease"),
        }
    }
}

/// Trend label plus the signed percentage it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReading {
    pub trend: PriceTrend,
    pub percent_change: f32,
}

impl TrendReading {
    /// Sentinel for the cases where no trend can be computed
    /// (no trailing records, or a zero trailing average).
    pub fn stable() -> Self {
        Self {
            trend: PriceTrend::Stable,
            percent_change: 0.0,
        }
    }
}

// ============= Notification Preferences =============

/// User-facing alert settings. Delivery is out of scope; the model and
/// the "should notify" decision live here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    /// Master switch, off until the user opts in
    pub enabled: bool,

    /// Alert volume, 0-100
    pub volume: u8,

    /// Alert when the price drops strictly below this (EUR/kWh)
    pub threshold_price: f32,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: false,
            volume: 50,
            threshold_price: 0.20,
        }
    }
}

impl NotificationPreferences {
    /// Should an alert fire for this price?
    pub fn should_notify(&self, price: f32) -> bool {
        self.enabled && price < self.threshold_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(from_hour: u32, total: f32) -> PriceRecord {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, from_hour, 0, 0).unwrap();
        PriceRecord {
            from,
            till: from + chrono::Duration::hours(1),
            market_price: total,
            market_price_tax: 0.0,
            sourcing_markup_price: 0.0,
            energy_tax_price: 0.0,
            total_price: total,
        }
    }

    #[test]
    fn test_new_record_derives_total() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let rec = PriceRecord::new(from, from + chrono::Duration::hours(1), 0.18, 0.045, 0.045, 0.03);
        assert!((rec.total_price - 0.30).abs() < 1e-6);
    }

    #[test]
    fn test_record_containment_is_half_open() {
        let rec = record(10, 0.30);
        assert!(rec.contains(rec.from));
        assert!(rec.contains(rec.till - chrono::Duration::seconds(1)));
        assert!(!rec.contains(rec.till));
    }

    #[test]
    fn test_classify_boundaries() {
        let thresholds = ThresholdSettings::default();
        assert_eq!(thresholds.classify(0.40), PriceLevel::High);
        assert_eq!(thresholds.classify(0.55), PriceLevel::High);
        assert_eq!(thresholds.classify(0.25), PriceLevel::Medium);
        assert_eq!(thresholds.classify(0.399), PriceLevel::Medium);
        assert_eq!(thresholds.classify(0.249), PriceLevel::Low);
        assert_eq!(thresholds.classify(0.0), PriceLevel::Low);
        assert_eq!(thresholds.classify(-0.05), PriceLevel::Low);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let thresholds = ThresholdSettings::default();
        let mut prices: Vec<f32> = vec![-0.1, 0.0, 0.14, 0.15, 0.24, 0.25, 0.30, 0.39, 0.40, 0.80];
        prices.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let mut previous = PriceLevel::Low;
        for price in prices {
            let level = thresholds.classify(price);
            assert!(level >= previous, "rank dropped at price {price}");
            previous = level;
        }
    }

    #[test]
    fn test_classify_non_finite() {
        let thresholds = ThresholdSettings::default();
        assert_eq!(thresholds.classify(f32::NAN), PriceLevel::Low);
        assert_eq!(thresholds.classify(f32::INFINITY), PriceLevel::High);
        assert_eq!(thresholds.classify(f32::NEG_INFINITY), PriceLevel::Low);
    }

    #[test]
    fn test_level_color_mapping() {
        assert_eq!(PriceLevel::Low.color(), LightColor::Green);
        assert_eq!(PriceLevel::Medium.color(), LightColor::Yellow);
        assert_eq!(PriceLevel::High.color(), LightColor::Red);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(record(10, 0.30)).unwrap();
        assert!(json.get("totalPrice").is_some());
        assert!(json.get("marketPriceTax").is_some());
        assert!(json.get("total_price").is_none());
    }

    #[test]
    fn test_thresholds_to_value_keeps_exact_decimals() {
        // The device API serves thresholds through serde_json::Value, which
        // stores every number as f64. The boundaries must come out as the
        // decimals the firmware expects, not a widened 0.4000000059604645.
        let json = serde_json::to_value(ThresholdSettings::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "high": 0.4, "medium": 0.25, "low": 0.15 })
        );
    }

    #[test]
    fn test_snapshot_record_at() {
        let snapshot = PriceSnapshot::live(vec![record(9, 0.20), record(10, 0.30)]);
        let inside = Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap();
        let outside = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        assert_eq!(snapshot.record_at(inside).unwrap().total_price, 0.30);
        assert!(snapshot.record_at(outside).is_none());
    }

    #[test]
    fn test_notification_decision() {
        let prefs = NotificationPreferences {
            enabled: true,
            volume: 50,
            threshold_price: 0.20,
        };
        assert!(prefs.should_notify(0.19));
        assert!(!prefs.should_notify(0.20));
        assert!(!NotificationPreferences::default().should_notify(0.05));
    }
}
