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

//! Pure price analysis: current slot selection, trend estimation,
//! per-tier counts, usage advice and the aggregate served by the API.

use crate::model::{
    LightColor, NotificationPreferences, PriceLevel, PriceRecord, PriceSnapshot, PriceTrend,
    ThresholdSettings, TrendReading,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price assumed when no records are available at all (EUR/kWh)
pub const DEFAULT_PRICE_EUR_PER_KWH: f32 = 0.25;

/// How many trailing records feed the trend average
const TREND_WINDOW: usize = 3;

/// Percent-change cut points for the five trend buckets
const STRONG_CHANGE_PERCENT: f32 = 10.0;
const SLIGHT_CHANGE_PERCENT: f32 = 2.0;

// ============= Current Slot =============

/// The record relevant "now": the slot containing `now`, else the most
/// recent record (prices for the evening keep showing after midnight
/// until the next fetch lands).
pub fn current_record(records: &[PriceRecord], now: DateTime<Utc>) -> Option<&PriceRecord> {
    records
        .iter()
        .find(|record| record.contains(now))
        .or_else(|| records.last())
}

/// Current price with the hardcoded default for an empty series
pub fn current_price(records: &[PriceRecord], now: DateTime<Utc>) -> f32 {
    current_record(records, now).map_or(DEFAULT_PRICE_EUR_PER_KWH, |record| record.total_price)
}

// ============= Trend =============

/// Compare the current price to the mean of the up-to-three records
/// immediately preceding the most recent one.
///
/// Degrades to `stable`/0% when there are no trailing records, and to the
/// same sentinel when the trailing average is zero (the division would be
/// undefined).
pub fn estimate_trend(records: &[PriceRecord], current: f32) -> TrendReading {
    let end = records.len().saturating_sub(1);
    let start = records.len().saturating_sub(TREND_WINDOW + 1);
    let trailing = &records[start..end];

    if trailing.is_empty() {
        return TrendReading::stable();
    }

    #[expect(clippy::cast_precision_loss, reason = "window is at most 3 records")]
    let recent_average =
        trailing.iter().map(|r| r.total_price).sum::<f32>() / trailing.len() as f32;

    if recent_average == 0.0 {
        return TrendReading::stable();
    }

    let percent_change = (current - recent_average) / recent_average * 100.0;

    let trend = if percent_change > STRONG_CHANGE_PERCENT {
        PriceTrend::StrongIncrease
    } else if percent_change > SLIGHT_CHANGE_PERCENT {
        PriceTrend::SlightIncrease
    } else if percent_change < -STRONG_CHANGE_PERCENT {
        PriceTrend::StrongDecrease
    } else if percent_change < -SLIGHT_CHANGE_PERCENT {
        PriceTrend::SlightDecrease
    } else {
        PriceTrend::Stable
    };

    TrendReading {
        trend,
        percent_change,
    }
}

// ============= Aggregates =============

/// Cheapest slot that still lies ahead
pub fn best_upcoming(records: &[PriceRecord], now: DateTime<Utc>) -> Option<&PriceRecord> {
    records
        .iter()
        .filter(|record| record.from > now)
        .min_by(|a, b| a.total_price.total_cmp(&b.total_price))
}

/// Per-tier slot counts over the whole series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

pub fn level_counts(records: &[PriceRecord], thresholds: &ThresholdSettings) -> LevelCounts {
    let mut counts = LevelCounts::default();
    for record in records {
        match thresholds.classify(record.total_price) {
            PriceLevel::Low => counts.low += 1,
            PriceLevel::Medium => counts.medium += 1,
            PriceLevel::High => counts.high += 1,
        }
    }
    counts
}

/// Household usage recommendation derived from the tier mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UsageAdvice {
    /// Plenty of cheap slots: run the heavy appliances
    HeavyUseOk,
    /// Mixed picture: normal usage, shift what is easy to shift
    NormalUse,
    /// Expensive day: postpone what can wait
    RestrictUse,
}

impl UsageAdvice {
    pub fn color(&self) -> LightColor {
        match self {
            Self::HeavyUseOk => LightColor::Green,
            Self::NormalUse => LightColor::Yellow,
            Self::RestrictUse => LightColor::Red,
        }
    }
}

impl fmt::Display for UsageAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeavyUseOk => write!(f, "heavy-use-ok"),
            Self::NormalUse => write!(f, "normal-use"),
            Self::RestrictUse => write!(f, "restrict-use"),
        }
    }
}

/// More than five cheap slots wins outright; otherwise the medium/high
/// balance decides.
pub fn usage_advice(counts: LevelCounts) -> UsageAdvice {
    if counts.low > 5 {
        UsageAdvice::HeavyUseOk
    } else if counts.medium > counts.high {
        UsageAdvice::NormalUse
    } else {
        UsageAdvice::RestrictUse
    }
}

/// Min/max/avg of `total_price` over the series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_eur_per_kwh: f32,
    pub max_eur_per_kwh: f32,
    pub avg_eur_per_kwh: f32,
}

pub fn price_range(records: &[PriceRecord]) -> PriceRange {
    if records.is_empty() {
        return PriceRange::default();
    }

    let mut min = f32::MAX;
    let mut max = f32::MIN;
    let mut sum = 0.0;
    for record in records {
        min = min.min(record.total_price);
        max = max.max(record.total_price);
        sum += record.total_price;
    }

    #[expect(clippy::cast_precision_loss, reason = "record counts stay far below 2^24")]
    let avg = sum / records.len() as f32;

    PriceRange {
        min_eur_per_kwh: min,
        max_eur_per_kwh: max,
        avg_eur_per_kwh: avg,
    }
}

// ============= Composed Analysis =============

/// Everything the status API serves in one struct
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAnalysis {
    /// Price for the current slot (or the documented fallbacks)
    pub current_price: f32,

    /// Tier of the current price
    pub level: PriceLevel,

    /// Traffic light color for the tier
    pub color: LightColor,

    /// Short-term movement
    pub trend: TrendReading,

    /// Tier mix over the whole series
    pub level_counts: LevelCounts,

    /// Recommendation derived from the tier mix
    pub advice: UsageAdvice,

    /// Cheapest future slot, if any remain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_upcoming: Option<PriceRecord>,

    /// Series statistics
    pub price_range: PriceRange,

    /// Should a low-price alert fire for the current price?
    pub notify: bool,

    /// True while serving synthetic fallback data
    pub degraded: bool,

    /// When this analysis was generated
    pub analyzed_at: DateTime<Utc>,
}

/// Run the full analysis for one snapshot at one instant
pub fn analyze_prices(
    snapshot: &PriceSnapshot,
    thresholds: &ThresholdSettings,
    notifications: &NotificationPreferences,
    now: DateTime<Utc>,
) -> PriceAnalysis {
    let current = current_price(&snapshot.records, now);
    let level = thresholds.classify(current);
    let counts = level_counts(&snapshot.records, thresholds);

    PriceAnalysis {
        current_price: current,
        level,
        color: level.color(),
        trend: estimate_trend(&snapshot.records, current),
        level_counts: counts,
        advice: usage_advice(counts),
        best_upcoming: best_upcoming(&snapshot.records, now).cloned(),
        price_range: price_range(&snapshot.records),
        notify: notifications.should_notify(current),
        degraded: snapshot.is_degraded(),
        analyzed_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series(totals: &[f32]) -> Vec<PriceRecord> {
        totals
            .iter()
            .enumerate()
            .map(|(i, &total)| {
                let from = Utc
                    .with_ymd_and_hms(2024, 1, 1, u32::try_from(i).unwrap(), 0, 0)
                    .unwrap();
                PriceRecord {
                    from,
                    till: from + chrono::Duration::hours(1),
                    market_price: total,
                    market_price_tax: 0.0,
                    sourcing_markup_price: 0.0,
                    energy_tax_price: 0.0,
                    total_price: total,
                }
            })
            .collect()
    }

    #[test]
    fn test_current_record_prefers_containing_slot() {
        let records = series(&[0.10, 0.20, 0.30]);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 1, 30, 0).unwrap();
        assert_eq!(current_record(&records, now).unwrap().total_price, 0.20);
    }

    #[test]
    fn test_current_record_falls_back_to_last() {
        let records = series(&[0.10, 0.20, 0.30]);
        let later = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        assert_eq!(current_record(&records, later).unwrap().total_price, 0.30);
    }

    #[test]
    fn test_current_price_default_for_empty_series() {
        let now = Utc::now();
        assert!((current_price(&[], now) - DEFAULT_PRICE_EUR_PER_KWH).abs() < f32::EPSILON);
    }

    #[test]
    fn test_flat_series_is_stable_zero_percent() {
        let records = series(&[0.25; 10]);
        let reading = estimate_trend(&records, 0.25);
        assert_eq!(reading.trend, PriceTrend::Stable);
        assert!(reading.percent_change.abs() < f32::EPSILON);
    }

    #[test]
    fn test_trend_uses_three_records_before_last() {
        // Trailing window is [0.10, 0.20, 0.30] (mean 0.20); the last
        // record and anything older are excluded.
        let records = series(&[0.90, 0.10, 0.20, 0.30, 0.50]);
        let reading = estimate_trend(&records, 0.25);
        assert_eq!(reading.trend, PriceTrend::StrongIncrease);
        assert!((reading.percent_change - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_trend_buckets() {
        let records = series(&[0.20, 0.20, 0.20, 0.99]);
        // trailing mean is 0.20
        assert_eq!(
            estimate_trend(&records, 0.2221).trend,
            PriceTrend::StrongIncrease
        );
        assert_eq!(
            estimate_trend(&records, 0.2100).trend,
            PriceTrend::SlightIncrease
        );
        assert_eq!(estimate_trend(&records, 0.2020).trend, PriceTrend::Stable);
        assert_eq!(
            estimate_trend(&records, 0.1900).trend,
            PriceTrend::SlightDecrease
        );
        assert_eq!(
            estimate_trend(&records, 0.1500).trend,
            PriceTrend::StrongDecrease
        );
    }

    #[test]
    fn test_trend_single_record_degrades_to_stable() {
        let records = series(&[0.30]);
        let reading = estimate_trend(&records, 0.30);
        assert_eq!(reading.trend, PriceTrend::Stable);
        assert!(reading.percent_change.abs() < f32::EPSILON);
    }

    #[test]
    fn test_trend_zero_average_sentinel() {
        let records = series(&[0.0, 0.0, 0.0, 0.50]);
        let reading = estimate_trend(&records, 0.50);
        assert_eq!(reading.trend, PriceTrend::Stable);
        assert!(reading.percent_change.abs() < f32::EPSILON);
    }

    #[test]
    fn test_best_upcoming_strictly_future() {
        let records = series(&[0.05, 0.40, 0.10, 0.30]);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 1, 15, 0).unwrap();
        // 0.05 lies in the past, 0.40 is the current slot; cheapest ahead is 0.10
        let best = best_upcoming(&records, now).unwrap();
        assert!((best.total_price - 0.10).abs() < f32::EPSILON);
    }

    #[test]
    fn test_best_upcoming_none_when_series_exhausted() {
        let records = series(&[0.05, 0.40]);
        let later = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert!(best_upcoming(&records, later).is_none());
    }

    #[test]
    fn test_usage_advice_rules() {
        assert_eq!(
            usage_advice(LevelCounts {
                low: 6,
                medium: 0,
                high: 18
            }),
            UsageAdvice::HeavyUseOk
        );
        assert_eq!(
            usage_advice(LevelCounts {
                low: 2,
                medium: 10,
                high: 4
            }),
            UsageAdvice::NormalUse
        );
        assert_eq!(
            usage_advice(LevelCounts {
                low: 2,
                medium: 4,
                high: 10
            }),
            UsageAdvice::RestrictUse
        );
        // ties between medium and high restrict
        assert_eq!(
            usage_advice(LevelCounts {
                low: 0,
                medium: 3,
                high: 3
            }),
            UsageAdvice::RestrictUse
        );
    }

    #[test]
    fn test_price_range() {
        let records = series(&[0.10, 0.20, 0.60]);
        let range = price_range(&records);
        assert!((range.min_eur_per_kwh - 0.10).abs() < f32::EPSILON);
        assert!((range.max_eur_per_kwh - 0.60).abs() < f32::EPSILON);
        assert!((range.avg_eur_per_kwh - 0.30).abs() < 1e-6);
    }

    #[test]
    fn test_analysis_medium_scenario() {
        // One known slot at 0.30 under default thresholds classifies medium.
        let records = series(&[0.30]);
        let now = records[0].from + chrono::Duration::minutes(30);
        let snapshot = PriceSnapshot::live(records);

        let analysis = analyze_prices(
            &snapshot,
            &ThresholdSettings::default(),
            &NotificationPreferences::default(),
            now,
        );

        assert!((analysis.current_price - 0.30).abs() < f32::EPSILON);
        assert_eq!(analysis.level, PriceLevel::Medium);
        assert_eq!(analysis.color, LightColor::Yellow);
        assert!(!analysis.degraded);
        assert!(!analysis.notify);
    }

    #[test]
    fn test_analysis_flags_synthetic_snapshot() {
        let snapshot = PriceSnapshot::synthetic(series(&[0.18]));
        let analysis = analyze_prices(
            &snapshot,
            &ThresholdSettings::default(),
            &NotificationPreferences {
                enabled: true,
                volume: 50,
                threshold_price: 0.20,
            },
            snapshot.records[0].from,
        );

        assert!(analysis.degraded);
        assert!(analysis.notify);
    }
}
