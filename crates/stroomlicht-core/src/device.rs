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

//! Types exchanged with ESP32 traffic-light devices.

use crate::model::{LightColor, ThresholdSettings};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Last reported state of one device, keyed by `device_id`.
/// Last write wins; entries never expire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    /// Firmware-configured identifier, e.g. "ESP32-TL-001"
    pub device_id: String,

    /// Lamp the device is currently showing
    pub status: LightColor,

    /// Price the device based its lamp on, if it reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f32>,

    /// Device-side report time. Kept as the raw string the firmware
    /// sends (typically `millis()` uptime, not a wall clock).
    pub timestamp: String,

    /// Battery charge percentage, absent on mains-powered units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<u8>,

    /// WiFi RSSI in dBm, typically -30 (excellent) to -90 (unusable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wifi_strength: Option<i16>,
}

/// Command verbs the firmware understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Reset,
    UpdateThreshold,
    ChangeStatus,
    WifiConfig,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => write!(f, "reset"),
            Self::UpdateThreshold => write!(f, "update_threshold"),
            Self::ChangeStatus => write!(f, "change_status"),
            Self::WifiConfig => write!(f, "wifi_config"),
        }
    }
}

/// A command addressed to one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCommand {
    pub command: CommandKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl DeviceCommand {
    /// Reboot the device
    pub fn reset() -> Self {
        Self {
            command: CommandKind::Reset,
            params: None,
        }
    }

    /// Push new threshold boundaries to the device
    pub fn update_threshold(thresholds: ThresholdSettings) -> Self {
        Self {
            command: CommandKind::UpdateThreshold,
            params: Some(json!({
                "high": thresholds.high,
                "medium": thresholds.medium,
                "low": thresholds.low,
            })),
        }
    }

    /// Force a specific lamp, overriding price-driven state
    pub fn change_status(color: LightColor) -> Self {
        Self {
            command: CommandKind::ChangeStatus,
            params: Some(json!({ "status": color })),
        }
    }

    /// Reconfigure the device's WiFi credentials
    pub fn wifi_config(config: &WifiConfig) -> Self {
        Self {
            command: CommandKind::WifiConfig,
            params: Some(json!({
                "ssid": config.ssid,
                "password": config.password,
                "securityType": config.security_type,
            })),
        }
    }
}

/// WiFi credentials for the `wifi_config` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
    pub security_type: WifiSecurity,
}

/// Security modes the firmware's WiFi stack supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WifiSecurity {
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WPA2")]
    Wpa2,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "OPEN")]
    Open,
}
